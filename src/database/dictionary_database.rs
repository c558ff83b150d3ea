//! The dictionary store contract the translator queries.
//!
//! Every bulk method takes a list of queries and returns rows tagged with the
//! `index` of the query they satisfied; the translator re-associates results
//! purely by that index, so implementations must keep it accurate.

use crate::dictionary::{TermSourceMatchSource, TermSourceMatchType};
use crate::dictionary_data::{
    GenericFrequencyData, NumOrStr, TermGlossary, TermMetaFrequencyDataType,
    TermMetaPhoneticData, TermMetaPitchData,
};
use crate::errors::DBError;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Anything that can answer "is this dictionary enabled".
pub trait DictionarySet {
    fn has(&self, value: &str) -> bool;
}

impl DictionarySet for IndexSet<String> {
    fn has(&self, value: &str) -> bool {
        self.contains(value)
    }
}
impl DictionarySet for HashSet<String> {
    fn has(&self, value: &str) -> bool {
        self.contains(value)
    }
}
impl<V> DictionarySet for IndexMap<String, V> {
    fn has(&self, value: &str) -> bool {
        self.contains_key(value)
    }
}
impl<V> DictionarySet for HashMap<String, V> {
    fn has(&self, value: &str) -> bool {
        self.contains_key(value)
    }
}
impl<T: DictionarySet + ?Sized> DictionarySet for &T {
    fn has(&self, value: &str) -> bool {
        (**self).has(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermExactQueryRequest {
    pub term: String,
    pub reading: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceQuery {
    pub query: i64,
    pub dictionary: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericQueryRequest {
    pub query: String,
    pub dictionary: String,
}

/// A term row as returned by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    /// Unique within one store generation.
    pub id: u64,
    /// Index of the query that matched this row.
    pub index: usize,
    pub match_type: TermSourceMatchType,
    pub match_source: TermSourceMatchSource,
    pub term: String,
    pub reading: String,
    pub definition_tags: Vec<String>,
    pub term_tags: Vec<String>,
    pub rules: Vec<String>,
    pub definitions: Vec<TermGlossary>,
    pub score: i64,
    pub dictionary: String,
    /// `-1` when the dictionary has no sequence for this row.
    pub sequence: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DictionaryDatabaseTag {
    pub name: String,
    pub category: String,
    pub order: i64,
    pub notes: String,
    pub score: i64,
    pub dictionary: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DatabaseTermMetaData {
    Frequency(TermMetaFrequencyDataType),
    Pitch(TermMetaPitchData),
    Phonetic(TermMetaPhoneticData),
}

/// Represents a single term metadata entry found by `find_term_meta_bulk`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseTermMeta {
    /// Index of the original query term.
    pub index: usize,
    pub term: String,
    pub data: DatabaseTermMetaData,
    pub dictionary: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KanjiEntry {
    pub index: usize,
    pub character: String,
    pub onyomi: Vec<String>,
    pub kunyomi: Vec<String>,
    pub tags: Vec<String>,
    pub definitions: Vec<String>,
    pub stats: IndexMap<String, NumOrStr>,
    pub dictionary: String,
}

/// Kanji meta only carries frequency data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseKanjiMeta {
    pub index: usize,
    pub character: String,
    pub data: GenericFrequencyData,
    pub dictionary: String,
}

/// Bulk lookups against installed dictionaries.
pub trait DictionaryDatabase {
    /// Looks up every term of `term_list` against both the expression and the
    /// reading of each row. A row is returned at most once per call.
    fn find_terms_bulk(
        &self,
        term_list: &[String],
        dictionaries: &impl DictionarySet,
        match_type: TermSourceMatchType,
    ) -> Result<Vec<TermEntry>, DBError>;

    fn find_terms_exact_bulk(
        &self,
        term_list: &[TermExactQueryRequest],
        dictionaries: &impl DictionarySet,
    ) -> Result<Vec<TermEntry>, DBError>;

    fn find_terms_by_sequence_bulk(
        &self,
        items: &[SequenceQuery],
    ) -> Result<Vec<TermEntry>, DBError>;

    fn find_term_meta_bulk(
        &self,
        term_list: &[String],
        dictionaries: &impl DictionarySet,
    ) -> Result<Vec<DatabaseTermMeta>, DBError>;

    fn find_kanji_bulk(
        &self,
        kanji_list: &[String],
        dictionaries: &impl DictionarySet,
    ) -> Result<Vec<KanjiEntry>, DBError>;

    fn find_kanji_meta_bulk(
        &self,
        kanji_list: &[String],
        dictionaries: &impl DictionarySet,
    ) -> Result<Vec<DatabaseKanjiMeta>, DBError>;

    /// Returns exactly one slot per query, `None` where no tag matched.
    fn find_tag_meta_bulk(
        &self,
        items: &[GenericQueryRequest],
    ) -> Result<Vec<Option<DictionaryDatabaseTag>>, DBError>;
}
