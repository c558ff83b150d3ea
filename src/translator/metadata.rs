use indexmap::{IndexMap, IndexSet};

use crate::{
    database::{DatabaseTermMetaData, DictionaryDatabase},
    dictionary::{
        Pronunciation, TermDictionaryEntry, TermFrequency, TermFrequencySimple, TermPronunciation,
    },
    dictionary_data::{GenericFrequencyData, OneOrMany},
    errors::TranslatorError,
    translation::TermEnabledDictionaryMap,
};

use super::{get_dictionary_alias, get_dictionary_order, tag_aggregator::TagAggregator, Translator};

/// A (term, reading) pair for [`Translator::get_term_frequencies`].
/// A `None` reading matches frequency data of any reading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermReadingItem {
    pub term: String,
    pub reading: Option<String>,
}

impl TermReadingItem {
    pub fn new(term: impl Into<String>, reading: Option<&str>) -> Self {
        Self {
            term: term.into(),
            reading: reading.map(String::from),
        }
    }
}

/// The numeric value, display value, and whether the value was parsed out of the display string.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyInfo {
    pub frequency: f64,
    pub display_value: Option<String>,
    pub display_value_parsed: bool,
}

/// (entry index, headword index) of every headword sharing a (term, reading).
type HeadwordTargets = Vec<(usize, usize)>;

impl<D: DictionaryDatabase> Translator<D> {
    /// Flat frequency records of the given dictionaries for each pair.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn get_term_frequencies(
        &self,
        term_reading_list: &[TermReadingItem],
        dictionaries: &[String],
    ) -> Result<Vec<TermFrequencySimple>, TranslatorError> {
        let dictionary_set: IndexSet<String> = dictionaries.iter().cloned().collect();
        let term_list: Vec<String> = term_reading_list
            .iter()
            .map(|item| item.term.clone())
            .collect();
        let metas = self.db.find_term_meta_bulk(&term_list, &dictionary_set)?;

        let mut results = Vec::new();
        for meta in metas {
            let DatabaseTermMetaData::Frequency(data) = meta.data else {
                continue;
            };
            let Some(TermReadingItem { term, reading }) = term_reading_list.get(meta.index) else {
                continue;
            };
            let mut reading = reading.clone();
            let has_reading = data.reading().is_some();
            if let Some(data_reading) = data.reading() {
                if reading.as_deref() != Some(data_reading) {
                    if reading.is_some() {
                        continue;
                    }
                    reading = Some(data_reading.to_string());
                }
            }
            let FrequencyInfo {
                frequency,
                display_value,
                display_value_parsed,
            } = self.get_frequency_info(data.frequency());
            results.push(TermFrequencySimple {
                term: term.clone(),
                reading,
                dictionary: meta.dictionary,
                has_reading,
                frequency,
                display_value,
                display_value_parsed,
            });
        }
        Ok(results)
    }

    /// Attaches frequencies and pronunciations of every headword.
    pub(crate) fn add_term_meta(
        &self,
        dictionary_entries: &mut [TermDictionaryEntry],
        enabled_dictionary_map: &TermEnabledDictionaryMap,
        tag_aggregator: &mut TagAggregator,
    ) -> Result<(), TranslatorError> {
        let mut headword_map: IndexMap<String, IndexMap<String, HeadwordTargets>> = IndexMap::new();
        for (entry_index, dictionary_entry) in dictionary_entries.iter().enumerate() {
            for (headword_index, headword) in dictionary_entry.headwords.iter().enumerate() {
                headword_map
                    .entry(headword.term.clone())
                    .or_default()
                    .entry(headword.reading.clone())
                    .or_default()
                    .push((entry_index, headword_index));
            }
        }
        let headword_map_keys: Vec<String> = headword_map.keys().cloned().collect();

        let metas = self
            .db
            .find_term_meta_bulk(&headword_map_keys, enabled_dictionary_map)?;
        for meta in metas {
            let Some((_, reading_map)) = headword_map.get_index(meta.index) else {
                continue;
            };
            let dictionary = meta.dictionary.as_str();
            let dictionary_index = get_dictionary_order(dictionary, enabled_dictionary_map);
            let dictionary_alias = get_dictionary_alias(dictionary, enabled_dictionary_map);

            for (reading, targets) in reading_map {
                match &meta.data {
                    DatabaseTermMetaData::Frequency(data) => {
                        let has_reading = data.reading().is_some();
                        if data.reading().is_some_and(|r| r != reading) {
                            continue;
                        }
                        let info = self.get_frequency_info(data.frequency());
                        for &(entry_index, headword_index) in targets {
                            let frequencies = &mut dictionary_entries[entry_index].frequencies;
                            frequencies.push(TermFrequency {
                                index: frequencies.len(),
                                headword_index,
                                dictionary: dictionary.to_string(),
                                dictionary_index,
                                dictionary_alias: dictionary_alias.clone(),
                                has_reading,
                                frequency: info.frequency,
                                display_value: info.display_value.clone(),
                                display_value_parsed: info.display_value_parsed,
                            });
                        }
                    }
                    DatabaseTermMetaData::Pitch(data) => {
                        if &data.reading != reading {
                            continue;
                        }
                        let pitches: Vec<Pronunciation> = data
                            .pitches
                            .iter()
                            .map(|pitch| {
                                let tag_target = tag_aggregator.new_target();
                                if let Some(tags) = &pitch.tags {
                                    tag_aggregator.add_tags(tag_target, dictionary, tags);
                                }
                                Pronunciation::PitchAccent {
                                    position: pitch.position.clone(),
                                    nasal_positions: to_number_array(pitch.nasal.as_ref()),
                                    devoice_positions: to_number_array(pitch.devoice.as_ref()),
                                    tags: Vec::new(),
                                    tag_target,
                                }
                            })
                            .collect();
                        push_pronunciations(
                            dictionary_entries,
                            targets,
                            dictionary,
                            dictionary_index,
                            &dictionary_alias,
                            &pitches,
                        );
                    }
                    DatabaseTermMetaData::Phonetic(data) => {
                        if &data.reading != reading {
                            continue;
                        }
                        let transcriptions: Vec<Pronunciation> = data
                            .transcriptions
                            .iter()
                            .map(|transcription| {
                                let tag_target = tag_aggregator.new_target();
                                if let Some(tags) = &transcription.tags {
                                    tag_aggregator.add_tags(tag_target, dictionary, tags);
                                }
                                Pronunciation::PhoneticTranscription {
                                    ipa: transcription.ipa.clone(),
                                    tags: Vec::new(),
                                    tag_target,
                                }
                            })
                            .collect();
                        push_pronunciations(
                            dictionary_entries,
                            targets,
                            dictionary,
                            dictionary_index,
                            &dictionary_alias,
                            &transcriptions,
                        );
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn get_frequency_info(&self, frequency: &GenericFrequencyData) -> FrequencyInfo {
        match frequency {
            GenericFrequencyData::Number(value) => FrequencyInfo {
                frequency: *value,
                display_value: None,
                display_value_parsed: false,
            },
            GenericFrequencyData::String(display_value) => FrequencyInfo {
                frequency: self.convert_string_to_number(display_value),
                display_value: Some(display_value.clone()),
                display_value_parsed: true,
            },
            GenericFrequencyData::Object {
                value,
                display_value,
            } => FrequencyInfo {
                frequency: value.unwrap_or(0.0),
                display_value: display_value.clone(),
                display_value_parsed: false,
            },
        }
    }

    /// The first number found in `value`, or 0.
    fn convert_string_to_number(&self, value: &str) -> f64 {
        match self.number_regex.find(value) {
            Ok(Some(m)) => m
                .as_str()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .unwrap_or(0.0),
            Ok(None) => 0.0,
            Err(e) => {
                log::warn!("failed to parse a number out of {value:?}: {e}");
                0.0
            }
        }
    }
}

fn push_pronunciations(
    dictionary_entries: &mut [TermDictionaryEntry],
    targets: &HeadwordTargets,
    dictionary: &str,
    dictionary_index: usize,
    dictionary_alias: &str,
    pronunciations: &[Pronunciation],
) {
    for &(entry_index, headword_index) in targets {
        let list = &mut dictionary_entries[entry_index].pronunciations;
        list.push(TermPronunciation {
            index: list.len(),
            headword_index,
            dictionary: dictionary.to_string(),
            dictionary_index,
            dictionary_alias: dictionary_alias.to_string(),
            pronunciations: pronunciations.to_vec(),
        });
    }
}

fn to_number_array(value: Option<&OneOrMany<u32>>) -> Vec<u32> {
    value.map_or_else(Vec::new, OneOrMany::to_vec)
}
