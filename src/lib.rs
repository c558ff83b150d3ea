//! Dictionary lookup for yomitan-style dictionaries.
//!
//! [`Translator`] takes a piece of text and resolves it into ranked
//! dictionary entries: every prefix of the text is run through the language's
//! text processors and deinflection rules, the candidates are looked up in a
//! [`DictionaryDatabase`], and the rows that come back are folded, tagged,
//! enriched with frequency and pronunciation data, and sorted.
//!
//! ```
//! use yomichan_translator::{
//!     FindTermDictionary, FindTermsMode, FindTermsOptions, InMemoryDictionaryDatabase, Translator,
//! };
//!
//! let mut db = InMemoryDictionaryDatabase::new();
//! db.add_dictionary_json(
//!     "JMdict",
//!     r#"{
//!         "terms": [["走る", "はしる", "", "v5", 1, ["to run"], 1, ""]]
//!     }"#,
//! )
//! .unwrap();
//! let translator = Translator::new(db).unwrap();
//!
//! let mut options = FindTermsOptions::default();
//! options
//!     .enabled_dictionary_map
//!     .insert("JMdict".to_string(), FindTermDictionary::default());
//! let result = translator
//!     .find_terms(FindTermsMode::Group, "走った", &options)
//!     .unwrap();
//! assert_eq!(result.dictionary_entries[0].headwords[0].term, "走る");
//! assert_eq!(result.original_text_length, 3);
//! ```

pub mod database;
pub mod dictionary;
pub mod dictionary_data;
pub mod errors;
pub mod language;
pub mod regex_util;
pub mod translation;
pub mod translation_internal;
pub mod translator;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;

pub use database::{DictionaryDatabase, InMemoryDictionaryDatabase};
pub use errors::{DBError, TranslatorError};
pub use translation::{
    FindKanjiDictionary, FindKanjiOptions, FindTermDictionary, FindTermsMode, FindTermsOptions,
};
pub use translator::{FindTermsResult, TagCache, TermReadingItem, Translator};
