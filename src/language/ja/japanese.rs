use std::collections::HashMap;
use std::sync::LazyLock;

use wana_kana::ConvertJapanese;

use crate::language::cjk_utils::{
    is_code_point_in_range, is_code_point_in_ranges, CodepointRange, CJK_IDEOGRAPH_RANGES,
    CJK_PUNCTUATION_RANGE, FULLWIDTH_CHARACTER_RANGES,
};

pub const HIRAGANA_SMALL_TSU_CODE_POINT: u32 = 0x3063;
pub const KATAKANA_SMALL_TSU_CODE_POINT: u32 = 0x30c3;
pub const KATAKANA_SMALL_KA_CODE_POINT: u32 = 0x30f5;
pub const KATAKANA_SMALL_KE_CODE_POINT: u32 = 0x30f6;
pub const KANA_PROLONGED_SOUND_MARK_CODE_POINT: u32 = 0x30fc;

pub const HIRAGANA_CONVERSION_RANGE: CodepointRange = (0x3041, 0x3096);
pub const KATAKANA_CONVERSION_RANGE: CodepointRange = (0x30a1, 0x30f6);

pub const HIRAGANA_RANGE: CodepointRange = (0x3040, 0x309f);
pub const KATAKANA_RANGE: CodepointRange = (0x30a0, 0x30ff);

pub const KANA_RANGES: [CodepointRange; 2] = [HIRAGANA_RANGE, KATAKANA_RANGE];

const JAPANESE_BASE_RANGES: [CodepointRange; 5] = [
    HIRAGANA_RANGE,
    KATAKANA_RANGE,
    (0xff66, 0xff9f), // Halfwidth katakana
    (0x30fb, 0x30fc), // Katakana punctuation
    (0xff61, 0xff65), // Kana punctuation
];

#[rustfmt::skip]
static HALFWIDTH_KATAKANA_MAP: LazyLock<HashMap<char, [char; 3]>> = LazyLock::new(|| {
    // [plain, with dakuten, with handakuten]; '-' marks an invalid combination
    const TABLE: &str = "ｦヲヺ-ｧァ--ｨィ--ｩゥ--ｪェ--ｫォ--ｬャ--ｭュ--ｮョ--ｯッ--ｰー--ｱア--ｲイ--ｳウヴ-\
        ｴエ--ｵオ--ｶカガ-ｷキギ-ｸクグ-ｹケゲ-ｺコゴ-ｻサザ-ｼシジ-ｽスズ-ｾセゼ-ｿソゾ-ﾀタダ-ﾁチヂ-\
        ﾂツヅ-ﾃテデ-ﾄトド-ﾅナ--ﾆニ--ﾇヌ--ﾈネ--ﾉノ--ﾊハバパﾋヒビピﾌフブプﾍヘベペﾎホボポ\
        ﾏマ--ﾐミ--ﾑム--ﾒメ--ﾓモ--ﾔヤ--ﾕユ--ﾖヨ--ﾗラ--ﾘリ--ﾙル--ﾚレ--ﾛロ--ﾜワ--ﾝン--";
    let chars: Vec<char> = TABLE.chars().collect();
    chars
        .chunks_exact(4)
        .map(|chunk| (chunk[0], [chunk[1], chunk[2], chunk[3]]))
        .collect()
});

#[rustfmt::skip]
static VOWEL_TO_KANA_MAPPING: [(char, &str); 5] = [
    ('a', "ぁあかがさざただなはばぱまゃやらゎわヵァアカガサザタダナハバパマャヤラヮワヵヷ"),
    ('i', "ぃいきぎしじちぢにひびぴみりゐィイキギシジチヂニヒビピミリヰヸ"),
    ('u', "ぅうくぐすずっつづぬふぶぷむゅゆるゥウクグスズッツヅヌフブプムュユルヴ"),
    ('e', "ぇえけげせぜてでねへべぺめれゑヶェエケゲセゼテデネヘベペメレヱヶヹ"),
    ('o', "ぉおこごそぞとどのほぼぽもょよろをォオコゴソゾトドノホボポモョヨロヲヺ"),
];

static KANA_TO_VOWEL_MAPPING: LazyLock<HashMap<char, char>> = LazyLock::new(|| {
    VOWEL_TO_KANA_MAPPING
        .iter()
        .flat_map(|&(vowel, characters)| characters.chars().map(move |c| (c, vowel)))
        .collect()
});

fn get_prolonged_hiragana(previous_character: char) -> Option<char> {
    match KANA_TO_VOWEL_MAPPING.get(&previous_character)? {
        'a' => Some('あ'),
        'i' => Some('い'),
        'u' => Some('う'),
        'e' => Some('え'),
        'o' => Some('う'),
        _ => None,
    }
}

pub fn is_code_point_kana(code_point: u32) -> bool {
    is_code_point_in_ranges(code_point, &KANA_RANGES)
}

pub fn is_code_point_japanese(code_point: u32) -> bool {
    is_code_point_in_ranges(code_point, &JAPANESE_BASE_RANGES)
        || is_code_point_in_range(code_point, CJK_PUNCTUATION_RANGE)
        || is_code_point_in_ranges(code_point, &FULLWIDTH_CHARACTER_RANGES)
        || is_code_point_in_ranges(code_point, &CJK_IDEOGRAPH_RANGES)
}

pub fn is_string_entirely_kana(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| is_code_point_kana(c as u32))
}

pub fn is_string_partially_japanese(text: &str) -> bool {
    text.chars().any(|c| is_code_point_japanese(c as u32))
}

pub fn convert_katakana_to_hiragana(text: &str, keep_prolonged_sound_marks: bool) -> String {
    let offset = KATAKANA_CONVERSION_RANGE.0 - HIRAGANA_CONVERSION_RANGE.0;
    let mut result = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    for c in text.chars() {
        let code_point = c as u32;
        let converted = match code_point {
            KATAKANA_SMALL_KA_CODE_POINT | KATAKANA_SMALL_KE_CODE_POINT => c,
            KANA_PROLONGED_SOUND_MARK_CODE_POINT if !keep_prolonged_sound_marks => previous
                .and_then(get_prolonged_hiragana)
                .unwrap_or(c),
            _ if is_code_point_in_range(code_point, KATAKANA_CONVERSION_RANGE) => {
                char::from_u32(code_point - offset).unwrap_or(c)
            }
            _ => c,
        };
        result.push(converted);
        previous = Some(converted);
    }
    result
}

pub fn convert_hiragana_to_katakana(text: &str) -> String {
    let offset = KATAKANA_CONVERSION_RANGE.0 - HIRAGANA_CONVERSION_RANGE.0;
    text.chars()
        .map(|c| {
            let code_point = c as u32;
            if is_code_point_in_range(code_point, HIRAGANA_CONVERSION_RANGE) {
                char::from_u32(code_point + offset).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

pub fn convert_alphanumeric_to_fullwidth(text: &str) -> String {
    text.chars()
        .map(|c| {
            let code_point = c as u32;
            let shifted = match code_point {
                0x30..=0x39 => code_point + (0xff10 - 0x30), // ['0', '9']
                0x41..=0x5a => code_point + (0xff21 - 0x41), // ['A', 'Z']
                0x61..=0x7a => code_point + (0xff41 - 0x61), // ['a', 'z']
                _ => code_point,
            };
            char::from_u32(shifted).unwrap_or(c)
        })
        .collect()
}

pub fn convert_fullwidth_alphanumeric_to_normal(text: &str) -> String {
    text.chars()
        .map(|c| {
            let code_point = c as u32;
            let shifted = match code_point {
                0xff10..=0xff19 => code_point - (0xff10 - 0x30), // ['０', '９']
                0xff21..=0xff3a => code_point - (0xff21 - 0x41), // ['Ａ', 'Ｚ']
                0xff41..=0xff5a => code_point - (0xff41 - 0x61), // ['ａ', 'ｚ']
                _ => code_point,
            };
            char::from_u32(shifted).unwrap_or(c)
        })
        .collect()
}

/// Romaji runs (ASCII or full width, any case, plus `-`) are rewritten as
/// hiragana; everything else is copied through.
pub fn convert_alphabetic_to_kana(text: &str) -> String {
    let mut part = String::new();
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        let code_point = c as u32;
        let normalized = match code_point {
            0x41..=0x5a => c.to_ascii_lowercase(), // ['A', 'Z']
            0x61..=0x7a => c,                      // ['a', 'z']
            0xff21..=0xff3a => char::from_u32(code_point - 0xff21 + 0x61).unwrap_or(c),
            0xff41..=0xff5a => char::from_u32(code_point - 0xff41 + 0x61).unwrap_or(c),
            0x2d | 0xff0d => '-',
            _ => {
                if !part.is_empty() {
                    result.push_str(&part.to_hiragana());
                    part.clear();
                }
                result.push(c);
                continue;
            }
        };
        part.push(normalized);
    }
    if !part.is_empty() {
        result.push_str(&part.to_hiragana());
    }
    result
}

pub fn convert_halfwidth_kana_to_fullwidth(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let Some(mapping) = HALFWIDTH_KATAKANA_MAP.get(&c) else {
            result.push(c);
            i += 1;
            continue;
        };
        let index = match chars.get(i + 1).map(|&next| next as u32) {
            Some(0xff9e) => 1, // dakuten
            Some(0xff9f) => 2, // handakuten
            _ => 0,
        };
        let mut c2 = mapping[index];
        if index > 0 {
            if c2 == '-' {
                c2 = mapping[0];
            } else {
                i += 1;
            }
        }
        result.push(c2);
        i += 1;
    }
    result
}

pub fn dakuten_allowed(code_point: u32) -> bool {
    // かがきぎくぐけげこごさざしじすずせぜそぞただちぢっつづてでとはばぱひびぴふぶぷへべぺほ
    // カガキギクグケゲコゴサザシジスズセゼソゾタダチヂッツヅテデトハバパヒビピフブプヘベペホ
    matches!(code_point, 0x304b..=0x3068 | 0x306f..=0x307b | 0x30ab..=0x30c8 | 0x30cf..=0x30db)
}

pub fn handakuten_allowed(code_point: u32) -> bool {
    // はばぱひびぴふぶぷへべぺほ
    // ハバパヒビピフブプヘベペホ
    matches!(code_point, 0x306f..=0x307b | 0x30cf..=0x30db)
}

/// Folds a kana followed by a combining (han)dakuten into the precomposed kana.
pub fn normalize_combining_characters(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut reversed: Vec<char> = Vec::with_capacity(chars.len());
    let mut i = chars.len() as isize - 1;
    // the first character cannot combine with anything
    while i > 0 {
        let c = chars[i as usize];
        let combinee = chars[i as usize - 1] as u32;
        let combined = match c {
            '\u{3099}' if dakuten_allowed(combinee) => char::from_u32(combinee + 1),
            '\u{309a}' if handakuten_allowed(combinee) => char::from_u32(combinee + 2),
            _ => None,
        };
        match combined {
            Some(combined) => {
                reversed.push(combined);
                i -= 2;
            }
            None => {
                reversed.push(c);
                i -= 1;
            }
        }
    }
    // i == -1 when the first two characters were combined
    if i == 0 {
        reversed.push(chars[0]);
    }
    reversed.into_iter().rev().collect()
}

pub fn is_emphatic_code_point(code_point: u32) -> bool {
    code_point == HIRAGANA_SMALL_TSU_CODE_POINT
        || code_point == KATAKANA_SMALL_TSU_CODE_POINT
        || code_point == KANA_PROLONGED_SOUND_MARK_CODE_POINT
}

/// `すっっごーーい` → `すっごーい`, or `すごい` with `full_collapse`.
/// Leading and trailing emphatics are left alone.
pub fn collapse_emphatic_sequences(text: &str, full_collapse: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let Some(left) = chars.iter().position(|&c| !is_emphatic_code_point(c as u32)) else {
        return text.to_string();
    };
    let right = chars
        .iter()
        .rposition(|&c| !is_emphatic_code_point(c as u32))
        .unwrap_or(left);

    let mut result: String = chars[..left].iter().collect();
    let mut current_collapsed: Option<char> = None;
    for &c in &chars[left..=right] {
        if is_emphatic_code_point(c as u32) {
            if current_collapsed != Some(c) {
                current_collapsed = Some(c);
                if !full_collapse {
                    result.push(c);
                }
            }
        } else {
            current_collapsed = None;
            result.push(c);
        }
    }
    result.extend(&chars[right + 1..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kana_conversion() {
        assert_eq!(convert_katakana_to_hiragana("ヨミチャン", false), "よみちゃん");
        assert_eq!(convert_katakana_to_hiragana("カード", false), "かあど");
        assert_eq!(convert_katakana_to_hiragana("カード", true), "かーど");
        assert_eq!(convert_katakana_to_hiragana("ヵヶ", false), "ヵヶ");
        assert_eq!(convert_hiragana_to_katakana("よみちゃん"), "ヨミチャン");
    }

    #[test]
    fn width_conversion() {
        assert_eq!(convert_fullwidth_alphanumeric_to_normal("ｙｏｍｉ１２"), "yomi12");
        assert_eq!(convert_alphanumeric_to_fullwidth("yomi12"), "ｙｏｍｉ１２");
        assert_eq!(convert_halfwidth_kana_to_fullwidth("ﾖﾐﾁｬﾝ"), "ヨミチャン");
        assert_eq!(convert_halfwidth_kana_to_fullwidth("ｶﾞﾊﾟﾅﾞ"), "ガパナﾞ");
    }

    #[test]
    fn romaji_conversion() {
        assert_eq!(convert_alphabetic_to_kana("hashiru"), "はしる");
        assert_eq!(convert_alphabetic_to_kana("ＨＡＳＨＩＲＵ"), "はしる");
        assert_eq!(convert_alphabetic_to_kana("走ru"), "走る");
    }

    #[test]
    fn combining_characters() {
        assert_eq!(normalize_combining_characters("ト\u{3099}"), "ド");
        assert_eq!(normalize_combining_characters("ハ\u{309a}ン"), "パン");
        assert_eq!(normalize_combining_characters("ア\u{3099}"), "ア\u{3099}");
    }

    #[test]
    fn emphatic_sequences() {
        assert_eq!(collapse_emphatic_sequences("すっっごーーい", false), "すっごーい");
        assert_eq!(collapse_emphatic_sequences("すっっごーーい", true), "すごい");
        assert_eq!(collapse_emphatic_sequences("ーーー", true), "ーーー");
        assert_eq!(collapse_emphatic_sequences("っすごい", true), "っすごい");
    }

    #[test]
    fn script_predicates() {
        assert!(is_string_entirely_kana("よみ"));
        assert!(!is_string_entirely_kana("読み"));
        assert!(!is_string_entirely_kana(""));
        assert!(is_string_partially_japanese("read 読"));
        assert!(!is_string_partially_japanese("read"));
    }
}
