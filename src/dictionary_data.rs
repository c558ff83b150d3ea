//! serde shapes of the yomitan dictionary bank files.
//!
//! Banks are JSON arrays of arrays; every row type here is a tuple struct so
//! that `serde_json` maps the positional layout directly.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/************* Glossary *************/

/// A single `glossary` item of a term bank row.
///
/// Either displayable content, or a cross-reference to an uninflected form
/// (`[uninflected, [rule, ...]]`) used by dictionaries that ship their own
/// conjugation tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermGlossary {
    Deinflection(TermGlossaryDeinflection),
    Content(Box<TermGlossaryContent>),
}

impl TermGlossary {
    pub fn text(text: impl Into<String>) -> Self {
        TermGlossary::Content(Box::new(TermGlossaryContent::Text(text.into())))
    }

    pub fn as_deinflection(&self) -> Option<&TermGlossaryDeinflection> {
        match self {
            TermGlossary::Deinflection(d) => Some(d),
            TermGlossary::Content(_) => None,
        }
    }

    pub fn into_content(self) -> Option<TermGlossaryContent> {
        match self {
            TermGlossary::Content(c) => Some(*c),
            TermGlossary::Deinflection(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermGlossaryContent {
    Text(String),
    Detailed(TermGlossaryDetailed),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TermGlossaryDetailed {
    Text {
        text: String,
    },
    Image(TermGlossaryImage),
    /// Structured content is kept as raw json; rendering is up to the application.
    StructuredContent {
        #[serde(with = "raw_json")]
        content: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermGlossaryImage {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// (De)serializes an arbitrary json value through its compact string form, so
/// glossary content can be hashed and compared structurally.
mod raw_json {
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(content: &str, s: S) -> Result<S::Ok, S::Error> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(serde::ser::Error::custom)?;
        value.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let value = serde_json::Value::deserialize(d)?;
        serde_json::to_string(&value).map_err(D::Error::custom)
    }
}

/// TermGlossaryDeinflection represents the deinflection information of a term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, Vec<String>)", into = "(String, Vec<String>)")]
pub struct TermGlossaryDeinflection {
    pub uninflected: String,
    pub inflection_rule_chain: Vec<String>,
}

impl From<(String, Vec<String>)> for TermGlossaryDeinflection {
    fn from((uninflected, inflection_rule_chain): (String, Vec<String>)) -> Self {
        Self {
            uninflected,
            inflection_rule_chain,
        }
    }
}

impl From<TermGlossaryDeinflection> for (String, Vec<String>) {
    fn from(d: TermGlossaryDeinflection) -> Self {
        (d.uninflected, d.inflection_rule_chain)
    }
}

/************* Banks *************/

/// `term_bank_*.json` (v3) row:
/// `[expression, reading, definitionTags, rules, score, glossary, sequence, termTags]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermBankV3Row(
    pub String,
    pub String,
    pub Option<String>,
    pub String,
    pub f64,
    pub Vec<TermGlossary>,
    pub i64,
    pub String,
);

/// `term_meta_bank_*.json` row: `[expression, mode, data]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermMetaBankRow(pub String, pub TermMetaModeType, pub serde_json::Value);

/// `kanji_bank_*.json` (v3) row:
/// `[character, onyomi, kunyomi, tags, meanings, stats]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KanjiBankV3Row(
    pub String,
    pub String,
    pub String,
    pub String,
    pub Vec<String>,
    #[serde(default)] pub IndexMap<String, NumOrStr>,
);

/// `kanji_meta_bank_*.json` row: `[character, "freq", data]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KanjiMetaBankRow(pub String, pub TermMetaModeType, pub GenericFrequencyData);

/// `tag_bank_*.json` row: `[name, category, order, notes, score]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagBankRow(pub String, pub String, pub i64, pub String, pub i64);

/// The bank files of one dictionary, already read from disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DictionaryBanks {
    #[serde(default)]
    pub terms: Vec<TermBankV3Row>,
    #[serde(default)]
    pub term_meta: Vec<TermMetaBankRow>,
    #[serde(default)]
    pub kanji: Vec<KanjiBankV3Row>,
    #[serde(default)]
    pub kanji_meta: Vec<KanjiMetaBankRow>,
    #[serde(default)]
    pub tags: Vec<TagBankRow>,
}

/************* Term Meta *************/

/// A helper Enum to select the mode for TermMeta data structures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermMetaModeType {
    Freq,
    Pitch,
    Ipa,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumOrStr {
    Num(serde_json::Number),
    Str(String),
}

impl std::fmt::Display for NumOrStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumOrStr::Num(n) => write!(f, "{n}"),
            NumOrStr::Str(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v.clone()],
            OneOrMany::Many(v) => v.clone(),
        }
    }
}

/// Represents the frequency data of a term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenericFrequencyData {
    Number(f64),
    String(String),
    Object {
        #[serde(default)]
        value: Option<f64>,
        #[serde(default, rename = "displayValue")]
        display_value: Option<String>,
    },
}

/// A helper Enum to select the type of data for TermMetaFrequency data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermMetaFrequencyDataType {
    WithReading {
        reading: String,
        frequency: GenericFrequencyData,
    },
    Generic(GenericFrequencyData),
}

impl TermMetaFrequencyDataType {
    pub fn reading(&self) -> Option<&str> {
        match self {
            TermMetaFrequencyDataType::WithReading { reading, .. } => Some(reading),
            TermMetaFrequencyDataType::Generic(_) => None,
        }
    }

    pub fn frequency(&self) -> &GenericFrequencyData {
        match self {
            TermMetaFrequencyDataType::WithReading { frequency, .. } => frequency,
            TermMetaFrequencyDataType::Generic(frequency) => frequency,
        }
    }
}

/************* Pitch / Speech Data *************/

/// List of different pitch accent information for the term and reading combination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermMetaPitch {
    /// Mora position of the pitch accent downstep.
    /// A value of 0 indicates that the word does not have a downstep (heiban).
    pub position: NumOrStr,
    /// Positions of a morae with nasal sound.
    #[serde(default)]
    pub nasal: Option<OneOrMany<u32>>,
    /// Positions of morae with devoiced sound.
    #[serde(default)]
    pub devoice: Option<OneOrMany<u32>>,
    /// List of tags for this pitch accent.
    /// This typically corresponds to a certain type of part of speech.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermMetaPitchData {
    pub reading: String,
    pub pitches: Vec<TermMetaPitch>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermMetaPhoneticTranscription {
    pub ipa: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermMetaPhoneticData {
    pub reading: String,
    /// List of different IPA transcription information for the term and reading combination.
    pub transcriptions: Vec<TermMetaPhoneticTranscription>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn glossary_variants() {
        let row: TermBankV3Row = serde_json::from_str(
            r#"["食べた", "たべた", null, "", 0, [["食べる", ["-た"]], "ate", {"type": "text", "text": "to eat"}], -1, ""]"#,
        )
        .unwrap();
        assert_eq!(
            row.5[0],
            TermGlossary::Deinflection(TermGlossaryDeinflection {
                uninflected: "食べる".into(),
                inflection_rule_chain: vec!["-た".into()],
            })
        );
        assert_eq!(row.5[1], TermGlossary::text("ate"));
        assert_eq!(
            row.5[2].clone().into_content(),
            Some(TermGlossaryContent::Detailed(TermGlossaryDetailed::Text {
                text: "to eat".into()
            }))
        );
    }

    #[test]
    fn frequency_shapes() {
        let plain: TermMetaFrequencyDataType = serde_json::from_str("12").unwrap();
        assert_eq!(plain.frequency(), &GenericFrequencyData::Number(12.0));
        assert_eq!(plain.reading(), None);

        let with_reading: TermMetaFrequencyDataType =
            serde_json::from_str(r#"{"reading": "はしる", "frequency": {"value": 7, "displayValue": "7㋕"}}"#)
                .unwrap();
        assert_eq!(with_reading.reading(), Some("はしる"));
        assert_eq!(
            with_reading.frequency(),
            &GenericFrequencyData::Object {
                value: Some(7.0),
                display_value: Some("7㋕".into())
            }
        );
    }
}
