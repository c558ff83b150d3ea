use fancy_regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use super::language_d::{TextProcessor, TextProcessorSetting, TextProcessorWithId};

pub const BASIC_TEXT_PROCESSOR_OPTIONS: [TextProcessorSetting; 2] = [
    TextProcessorSetting::Bool(false),
    TextProcessorSetting::Bool(true),
];

static DIACRITICS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[\u{0300}-\u{036f}]").unwrap());

fn is_enabled(setting: TextProcessorSetting) -> bool {
    matches!(setting, TextProcessorSetting::Bool(true))
}

fn decapitalize(text: &str, setting: TextProcessorSetting) -> String {
    if is_enabled(setting) {
        return text.to_lowercase();
    }
    text.to_string()
}

fn capitalize_first_letter(text: &str, setting: TextProcessorSetting) -> String {
    if !is_enabled(setting) {
        return text.to_string();
    }
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn remove_alphabetic_diacritics(text: &str, setting: TextProcessorSetting) -> String {
    if !is_enabled(setting) {
        return text.to_string();
    }
    let normalized: String = text.nfd().collect();
    match DIACRITICS_PATTERN.try_replacen(&normalized, 0, "") {
        Ok(stripped) => stripped.into_owned(),
        Err(e) => {
            log::warn!("diacritic removal failed for {text:?}: {e}");
            text.to_string()
        }
    }
}

pub const DECAPITALIZE: TextProcessor = TextProcessor {
    name: "Decapitalize Text",
    description: "CAPITALIZED TEXT → capitalized text",
    options: &BASIC_TEXT_PROCESSOR_OPTIONS,
    process: decapitalize,
};

pub const CAPITALIZE_FIRST_LETTER: TextProcessor = TextProcessor {
    name: "Capitalize First Letter",
    description: "lowercase text → Lowercase text",
    options: &BASIC_TEXT_PROCESSOR_OPTIONS,
    process: capitalize_first_letter,
};

pub const REMOVE_ALPHABETIC_DIACRITICS: TextProcessor = TextProcessor {
    name: "Remove Alphabetic Diacritics",
    description: "ἄήé → αηe",
    options: &BASIC_TEXT_PROCESSOR_OPTIONS,
    process: remove_alphabetic_diacritics,
};

/// The casing pair shared by languages written in a bicameral script.
pub fn capitalization_preprocessors() -> Vec<TextProcessorWithId> {
    vec![
        TextProcessorWithId {
            id: "decapitalize",
            processor: DECAPITALIZE,
        },
        TextProcessorWithId {
            id: "capitalizeFirstLetter",
            processor: CAPITALIZE_FIRST_LETTER,
        },
    ]
}
