use crate::language::{
    language_d::{
        BidirectionalPreProcessorOptions, TextProcessor, TextProcessorSetting, TextProcessorWithId,
    },
    text_processors::BASIC_TEXT_PROCESSOR_OPTIONS,
};

use super::japanese::{
    collapse_emphatic_sequences, convert_alphabetic_to_kana, convert_alphanumeric_to_fullwidth,
    convert_fullwidth_alphanumeric_to_normal, convert_halfwidth_kana_to_fullwidth,
    convert_hiragana_to_katakana, convert_katakana_to_hiragana, normalize_combining_characters,
};

const BIDIRECTIONAL_OPTIONS: [TextProcessorSetting; 3] = [
    TextProcessorSetting::Bidirectional(BidirectionalPreProcessorOptions::Off),
    TextProcessorSetting::Bidirectional(BidirectionalPreProcessorOptions::Direct),
    TextProcessorSetting::Bidirectional(BidirectionalPreProcessorOptions::Inverse),
];

const EMPHATIC_OPTIONS: [TextProcessorSetting; 3] = [
    TextProcessorSetting::Emphatic([false, false]),
    TextProcessorSetting::Emphatic([true, false]),
    TextProcessorSetting::Emphatic([true, true]),
];

fn when_enabled(text: &str, setting: TextProcessorSetting, f: fn(&str) -> String) -> String {
    match setting {
        TextProcessorSetting::Bool(true) => f(text),
        _ => text.to_string(),
    }
}

fn bidirectional(
    text: &str,
    setting: TextProcessorSetting,
    direct: fn(&str) -> String,
    inverse: fn(&str) -> String,
) -> String {
    match setting {
        TextProcessorSetting::Bidirectional(BidirectionalPreProcessorOptions::Direct) => direct(text),
        TextProcessorSetting::Bidirectional(BidirectionalPreProcessorOptions::Inverse) => {
            inverse(text)
        }
        _ => text.to_string(),
    }
}

pub const CONVERT_HALF_WIDTH_CHARACTERS: TextProcessor = TextProcessor {
    name: "Convert half width characters to full width",
    description: "ﾖﾐﾁｬﾝ → ヨミチャン",
    options: &BASIC_TEXT_PROCESSOR_OPTIONS,
    process: |text, setting| when_enabled(text, setting, convert_halfwidth_kana_to_fullwidth),
};

pub const ALPHABETIC_TO_HIRAGANA: TextProcessor = TextProcessor {
    name: "Convert alphabetic characters to hiragana",
    description: "hiragana → ひらがな",
    options: &BASIC_TEXT_PROCESSOR_OPTIONS,
    process: |text, setting| when_enabled(text, setting, convert_alphabetic_to_kana),
};

pub const NORMALIZE_COMBINING_CHARACTERS: TextProcessor = TextProcessor {
    name: "Normalize combining characters",
    description: "ド → ド (U+30C8 U+3099 → U+30C9)",
    options: &BASIC_TEXT_PROCESSOR_OPTIONS,
    process: |text, setting| when_enabled(text, setting, normalize_combining_characters),
};

pub const ALPHANUMERIC_WIDTH_VARIANTS: TextProcessor = TextProcessor {
    name: "Convert between alphabetic width variants",
    description: "ｙｏｍｉｔａｎ → yomitan and vice versa",
    options: &BIDIRECTIONAL_OPTIONS,
    process: |text, setting| {
        bidirectional(
            text,
            setting,
            convert_fullwidth_alphanumeric_to_normal,
            convert_alphanumeric_to_fullwidth,
        )
    },
};

pub const CONVERT_HIRAGANA_TO_KATAKANA: TextProcessor = TextProcessor {
    name: "Convert hiragana to katakana",
    description: "よみちゃん → ヨミチャン and vice versa",
    options: &BIDIRECTIONAL_OPTIONS,
    process: |text, setting| {
        bidirectional(text, setting, convert_hiragana_to_katakana, |text| {
            convert_katakana_to_hiragana(text, false)
        })
    },
};

pub const COLLAPSE_EMPHATIC_SEQUENCES: TextProcessor = TextProcessor {
    name: "Collapse emphatic character sequences",
    description: "すっっごーーい → すっごーい / すごい",
    options: &EMPHATIC_OPTIONS,
    process: |text, setting| match setting {
        TextProcessorSetting::Emphatic([true, full]) => collapse_emphatic_sequences(text, full),
        _ => text.to_string(),
    },
};

pub fn japanese_preprocessors() -> Vec<TextProcessorWithId> {
    vec![
        TextProcessorWithId {
            id: "convertHalfWidthCharacters",
            processor: CONVERT_HALF_WIDTH_CHARACTERS,
        },
        TextProcessorWithId {
            id: "alphabeticToHiragana",
            processor: ALPHABETIC_TO_HIRAGANA,
        },
        TextProcessorWithId {
            id: "normalizeCombiningCharacters",
            processor: NORMALIZE_COMBINING_CHARACTERS,
        },
        TextProcessorWithId {
            id: "alphanumericWidthVariants",
            processor: ALPHANUMERIC_WIDTH_VARIANTS,
        },
        TextProcessorWithId {
            id: "convertHiraganaToKatakana",
            processor: CONVERT_HIRAGANA_TO_KATAKANA,
        },
        TextProcessorWithId {
            id: "collapseEmphaticSequences",
            processor: COLLAPSE_EMPHATIC_SEQUENCES,
        },
    ]
}

/// Readings are compared in hiragana.
pub fn normalize_japanese_reading(reading: &str) -> String {
    convert_katakana_to_hiragana(reading, false)
}
