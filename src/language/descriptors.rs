use indexmap::IndexMap;

use super::{
    en::transforms::ENGLISH_TRANSFORMS,
    ja::{
        text_preprocessors::{japanese_preprocessors, normalize_japanese_reading},
        transforms::JAPANESE_TRANSFORMS,
    },
    language_d::{LanguageDescriptor, LanguageSummary},
    text_processors::capitalization_preprocessors,
};

pub fn japanese_descriptor() -> LanguageDescriptor {
    LanguageDescriptor {
        iso: "ja".to_string(),
        iso639_3: "jpn".to_string(),
        name: "Japanese".to_string(),
        example_text: "読め".to_string(),
        text_preprocessors: japanese_preprocessors(),
        text_postprocessors: Vec::new(),
        reading_normalizer: Some(normalize_japanese_reading),
        language_transforms: Some(JAPANESE_TRANSFORMS.clone()),
    }
}

pub fn english_descriptor() -> LanguageDescriptor {
    LanguageDescriptor {
        iso: "en".to_string(),
        iso639_3: "eng".to_string(),
        name: "English".to_string(),
        example_text: "read".to_string(),
        text_preprocessors: capitalization_preprocessors(),
        text_postprocessors: Vec::new(),
        reading_normalizer: None,
        language_transforms: Some(ENGLISH_TRANSFORMS.clone()),
    }
}

/// The languages every translator starts with, keyed by ISO code.
pub fn built_in_language_descriptors() -> IndexMap<String, LanguageDescriptor> {
    [japanese_descriptor(), english_descriptor()]
        .into_iter()
        .map(|descriptor| (descriptor.iso.clone(), descriptor))
        .collect()
}

pub fn get_language_summaries() -> Vec<LanguageSummary> {
    built_in_language_descriptors()
        .values()
        .map(LanguageSummary::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn summaries() {
        let isos: Vec<String> = get_language_summaries().into_iter().map(|s| s.iso).collect();
        assert_eq!(isos, vec!["ja".to_string(), "en".to_string()]);
    }
}
