use crate::dictionary_data::{NumOrStr, TermGlossaryContent};
use crate::translator::tag_aggregator::TagTargetId;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Enum representing what database field was used to match the source term.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermSourceMatchSource {
    Term,
    Reading,
    Sequence,
}

/// Enum representing how the search term relates to the final term.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermSourceMatchType {
    #[default]
    Exact,
    Prefix,
    Suffix,
}

/// Where an inflection chain came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InflectionSource {
    /// Produced by the language transformer.
    Algorithm,
    /// Produced by a dictionary's own `formOf` cross reference.
    Dictionary,
    /// Produced by both of the above.
    Both,
}

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InflectionRule {
    pub name: String,
    pub description: Option<String>,
}

impl InflectionRule {
    pub(crate) fn from_id(id: impl Into<String>) -> Self {
        Self {
            name: id.into(),
            description: None,
        }
    }
}

pub type InflectionRuleChain = Vec<InflectionRule>;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InflectionRuleChainCandidate {
    pub source: InflectionSource,
    pub inflection_rules: InflectionRuleChain,
}

/// A tag represents some brief information about part of a dictionary entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DictionaryTag {
    /// The name of the tag.
    pub name: String,
    /// The category of the tag.
    pub category: String,
    /// A number indicating the sorting order of the tag.
    pub order: i64,
    /// A score value for the tag.
    pub score: i64,
    /// An array of descriptions for the tag. If there are multiple entries,
    /// the values will typically have originated from different dictionaries.
    /// However, there is no correlation between the length of this array and
    /// the length of the `dictionaries` field, as duplicates are removed.
    pub content: Vec<String>,
    /// An array of dictionary names that contained a tag with this name and category.
    pub dictionaries: Vec<String>,
    /// Whether or not this tag is redundant with previous tags.
    pub redundant: bool,
}

/// A source term lookup that produced a headword.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermSource {
    /// The original source text.
    pub original_text: String,
    /// The source text after being transformed, but before deinflection.
    pub transformed_text: String,
    /// The final text after deinflection; the key used for the database query.
    pub deinflected_text: String,
    pub match_type: TermSourceMatchType,
    pub match_source: TermSourceMatchSource,
    /// Whether this source is the one the user actually looked up.
    /// Entries pulled in by sequence or secondary searches have `false` here.
    pub is_primary: bool,
}

/// A (term, reading) pair of an entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermHeadword {
    /// The original order of the headword, used for stable sorting.
    pub index: usize,
    pub term: String,
    pub reading: String,
    pub sources: Vec<TermSource>,
    pub tags: Vec<DictionaryTag>,
    pub word_classes: Vec<String>,
    #[serde(skip)]
    pub(crate) tag_target: TagTargetId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermDefinition {
    /// Index of the definition, used for stable sorting.
    pub index: usize,
    /// Indices of the headwords this definition applies to. Sorted, unique.
    pub headword_indices: Vec<usize>,
    pub dictionary: String,
    /// The priority of the dictionary (lower is higher priority).
    pub dictionary_index: usize,
    pub dictionary_alias: String,
    /// Database id of the row this definition came from.
    pub id: u64,
    pub score: i64,
    /// Sort order derived from the sort frequency dictionary.
    pub frequency_order: f64,
    pub sequences: Vec<i64>,
    pub is_primary: bool,
    pub tags: Vec<DictionaryTag>,
    pub entries: Vec<TermGlossaryContent>,
    #[serde(skip)]
    pub(crate) tag_target: TagTargetId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Pronunciation {
    #[serde(rename_all = "camelCase")]
    PitchAccent {
        position: NumOrStr,
        nasal_positions: Vec<u32>,
        devoice_positions: Vec<u32>,
        tags: Vec<DictionaryTag>,
        #[serde(skip)]
        tag_target: TagTargetId,
    },
    PhoneticTranscription {
        ipa: String,
        tags: Vec<DictionaryTag>,
        #[serde(skip)]
        tag_target: TagTargetId,
    },
}

impl Pronunciation {
    pub(crate) fn tag_target(&self) -> TagTargetId {
        match self {
            Pronunciation::PitchAccent { tag_target, .. } => *tag_target,
            Pronunciation::PhoneticTranscription { tag_target, .. } => *tag_target,
        }
    }

    pub(crate) fn tags_mut(&mut self) -> &mut Vec<DictionaryTag> {
        match self {
            Pronunciation::PitchAccent { tags, .. } => tags,
            Pronunciation::PhoneticTranscription { tags, .. } => tags,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermPronunciation {
    pub index: usize,
    pub headword_index: usize,
    pub dictionary: String,
    pub dictionary_index: usize,
    pub dictionary_alias: String,
    pub pronunciations: Vec<Pronunciation>,
}

/// Frequency information corresponds to how frequently a term appears in a corpus,
/// which can be a number of occurrences or an overall rank.
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermFrequency {
    pub index: usize,
    pub headword_index: usize,
    pub dictionary: String,
    pub dictionary_index: usize,
    pub dictionary_alias: String,
    /// Whether the frequency data was qualified by a reading.
    pub has_reading: bool,
    pub frequency: f64,
    pub display_value: Option<String>,
    /// Whether `frequency` was parsed out of `display_value`.
    pub display_value_parsed: bool,
}

/// A term lookup result. Either a single database row, or (in `group`/`merge`
/// modes) several rows folded together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermDictionaryEntry {
    /// Whether the entry came from the looked up text rather than a secondary search.
    pub is_primary: bool,
    pub text_processor_rule_chain_candidates: Vec<Vec<String>>,
    pub inflection_rule_chain_candidates: Vec<InflectionRuleChainCandidate>,
    pub score: i64,
    pub frequency_order: f64,
    /// The priority of the dictionary (lower is higher priority).
    pub dictionary_index: usize,
    pub dictionary_alias: String,
    /// Number of primary sources that had an exact term match.
    pub source_term_exact_match_count: usize,
    /// Whether the reading equals the requested primary reading.
    pub match_primary_reading: bool,
    /// Longest `original_text` (in characters) of any primary source.
    pub max_original_text_length: usize,
    pub headwords: Vec<TermHeadword>,
    pub definitions: Vec<TermDefinition>,
    pub pronunciations: Vec<TermPronunciation>,
    pub frequencies: Vec<TermFrequency>,
}

/// A flat frequency record returned by `Translator::get_term_frequencies`.
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermFrequencySimple {
    pub term: String,
    pub reading: Option<String>,
    pub dictionary: String,
    pub has_reading: bool,
    pub frequency: f64,
    pub display_value: Option<String>,
    pub display_value_parsed: bool,
}

/*************** Kanji ***************/

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KanjiStat {
    pub name: String,
    pub category: String,
    pub content: String,
    pub order: i64,
    pub score: i64,
    pub dictionary: String,
    pub value: NumOrStr,
}

pub type KanjiStatGroups = IndexMap<String, Vec<KanjiStat>>;

#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanjiFrequency {
    pub index: usize,
    pub dictionary: String,
    pub dictionary_index: usize,
    pub dictionary_alias: String,
    pub character: String,
    pub frequency: f64,
    pub display_value: Option<String>,
    pub display_value_parsed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanjiDictionaryEntry {
    pub character: String,
    pub dictionary: String,
    pub dictionary_index: usize,
    pub dictionary_alias: String,
    pub onyomi: Vec<String>,
    pub kunyomi: Vec<String>,
    pub tags: Vec<DictionaryTag>,
    pub stats: KanjiStatGroups,
    pub definitions: Vec<String>,
    pub frequencies: Vec<KanjiFrequency>,
    #[serde(skip)]
    pub(crate) tag_target: TagTargetId,
}
