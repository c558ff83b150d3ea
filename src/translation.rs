use derivative::Derivative;
use fancy_regex::Regex;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::dictionary::TermSourceMatchType;

// Kanji

/// An options object for use with `Translator::find_kanji`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FindKanjiOptions {
    /// The mapping of dictionaries to search for kanji in.
    /// The key is the dictionary name.
    pub enabled_dictionary_map: KanjiEnabledDictionaryMap,
    /// Whether or not non-Japanese characters should be searched.
    pub remove_non_japanese_characters: bool,
}

/// Details about a dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindKanjiDictionary {
    /// The index of the dictionary
    pub index: usize,
    /// The alias of the dictionary
    pub alias: String,
}

// Terms

/// How `Translator::find_terms` folds its results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindTermsMode {
    /// One entry per database row; only the sort frequency dictionary is consulted.
    Simple,
    /// Entries sharing a headword and inflection chain are folded together.
    #[default]
    Group,
    /// Entries are folded by the main dictionary's sequence numbers.
    Merge,
    /// One entry per database row, with full metadata.
    Split,
}

/// An options object for use with `Translator::find_terms`.
#[derive(Debug, Clone, Derivative, Deserialize)]
#[derivative(Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FindTermsOptions {
    /// The matching type for looking up terms.
    pub match_type: FindTermsMatchType,
    /// Whether or not deinflection should be performed.
    #[derivative(Default(value = "true"))]
    pub deinflect: bool,
    /// The reading which will be sorted to the top of the results.
    pub primary_reading: String,
    /// The name of the primary dictionary to search.
    pub main_dictionary: String,
    /// The name of the frequency dictionary used for sorting
    pub sort_frequency_dictionary: Option<String>,
    /// The order used when using a sorting dictionary.
    pub sort_frequency_dictionary_order: FindTermsSortOrder,
    /// Whether or not non-Japanese characters should be searched.
    pub remove_non_japanese_characters: bool,
    /// Sets of replacements applied to the source text before lookup.
    /// A `None` slot is skipped.
    pub text_replacements: FindTermsTextReplacements,
    /// The mapping of dictionaries to search for terms in.
    /// The key is the dictionary name.
    pub enabled_dictionary_map: TermEnabledDictionaryMap,
    /// A set of dictionary names which should have definitions removed.
    pub exclude_dictionary_definitions: Option<IndexSet<String>>,
    /// Whether every substring should be searched for, or only whole words.
    pub search_resolution: SearchResolution,
    /// ISO-639 code of the language.
    #[derivative(Default(value = "\"ja\".to_string()"))]
    pub language: String,
}

/// The matching type for looking up terms.
pub type FindTermsMatchType = TermSourceMatchType;

/// A sorting order to use when finding terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindTermsSortOrder {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchResolution {
    /// Shrink the search window one character at a time.
    #[default]
    Letter,
    /// Shrink the search window one word at a time.
    Word,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindTermsTextReplacement {
    #[serde_as(as = "DisplayFromStr")]
    pub pattern: Regex,
    pub replacement: String,
    /// Replace every match instead of only the first one.
    #[serde(default)]
    pub is_global: bool,
}

pub type FindTermsTextReplacements = Vec<Option<Vec<FindTermsTextReplacement>>>;

/// Details about a dictionary.
#[derive(Debug, Clone, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FindTermDictionary {
    /// The index of the dictionary
    pub index: usize,
    /// The alias of the dictionary
    pub alias: String,
    /// Whether or not secondary term searches are allowed for this dictionary.
    pub allow_secondary_searches: bool,
    /// Whether this dictionary's part of speech rules should be used to filter results.
    #[derivative(Default(value = "true"))]
    pub parts_of_speech_filter: bool,
    /// Whether to use the deinflections from this dictionary.
    #[derivative(Default(value = "true"))]
    pub use_deinflections: bool,
}

pub type TermEnabledDictionaryMap = IndexMap<String, FindTermDictionary>;
pub type KanjiEnabledDictionaryMap = IndexMap<String, FindKanjiDictionary>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn options_from_json() {
        let options: FindTermsOptions = serde_json::from_str(
            r#"{
                "mainDictionary": "JMdict",
                "sortFrequencyDictionaryOrder": "ascending",
                "searchResolution": "word",
                "textReplacements": [null, [{"pattern": "ー+", "replacement": "ー", "isGlobal": true}]],
                "enabledDictionaryMap": {"JMdict": {"index": 0, "allowSecondarySearches": true}}
            }"#,
        )
        .unwrap();
        assert!(options.deinflect);
        assert_eq!(options.language, "ja");
        assert_eq!(options.match_type, TermSourceMatchType::Exact);
        assert_eq!(options.sort_frequency_dictionary_order, FindTermsSortOrder::Ascending);
        assert_eq!(options.search_resolution, SearchResolution::Word);
        let jmdict = &options.enabled_dictionary_map["JMdict"];
        assert!(jmdict.allow_secondary_searches);
        assert!(jmdict.parts_of_speech_filter);
        assert!(jmdict.use_deinflections);
        let replacement = &options.text_replacements[1].as_ref().unwrap()[0];
        assert_eq!(replacement.pattern.as_str(), "ー+");
        assert!(options.text_replacements[0].is_none());
    }
}
