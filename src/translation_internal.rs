use derive_more::derive::{Deref, DerefMut};
use indexmap::{IndexMap, IndexSet};

use crate::database::TermEntry;
use crate::dictionary::{InflectionRuleChainCandidate, TermDictionaryEntry};
use crate::language::language_d::TextProcessorSetting;

pub type TextProcessorRuleChainCandidate = Vec<String>;

pub type VariantAndTextProcessorRuleChainCandidatesMap =
    IndexMap<String, Vec<TextProcessorRuleChainCandidate>>;

/// A lookup candidate: one substring of the source text after text processing
/// and deinflection, with the rows that matched it.
#[derive(Clone, Debug, PartialEq)]
pub struct DatabaseDeinflection {
    pub original_text: String,
    pub transformed_text: String,
    pub deinflected_text: String,
    pub conditions: u32,
    pub text_processor_rule_chain_candidates: Vec<TextProcessorRuleChainCandidate>,
    pub inflection_rule_chain_candidates: Vec<InflectionRuleChainCandidate>,
    pub database_entries: Vec<TermEntry>,
}

impl DatabaseDeinflection {
    pub fn new(
        original_text: impl Into<String>,
        transformed_text: impl Into<String>,
        deinflected_text: impl Into<String>,
        conditions: u32,
        text_processor_rule_chain_candidates: Vec<TextProcessorRuleChainCandidate>,
        inflection_rule_chain_candidates: Vec<InflectionRuleChainCandidate>,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            transformed_text: transformed_text.into(),
            deinflected_text: deinflected_text.into(),
            conditions,
            text_processor_rule_chain_candidates,
            inflection_rule_chain_candidates,
            database_entries: Vec::new(),
        }
    }
}

/// Entries that merge mode will fold into one result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DictionaryEntryGroup {
    pub ids: IndexSet<u64>,
    pub dictionary_entries: Vec<TermDictionaryEntry>,
}

/// Memo of text processor outputs: text -> processor id -> setting -> output.
#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct TextCache(IndexMap<String, IndexMap<String, IndexMap<TextProcessorSetting, String>>>);
