use indexmap::IndexMap;

use crate::{
    database::{DictionaryDatabase, SequenceQuery, TermExactQueryRequest},
    dictionary::{
        InflectionRuleChainCandidate, TermDefinition, TermDictionaryEntry, TermHeadword,
        TermSource, TermSourceMatchSource,
    },
    dictionary_data::TermGlossaryContent,
    errors::TranslatorError,
    translation::{FindTermsOptions, TermEnabledDictionaryMap},
    translation_internal::DictionaryEntryGroup,
};

use super::{sorting::sort_term_dictionary_entries_by_id, tag_aggregator::TagAggregator, Translator};

type HeadwordKey = (String, String);

impl<D: DictionaryDatabase> Translator<D> {
    /// Folds entries of the main dictionary by sequence, pulling in every row
    /// sharing that sequence and, through secondary searches, rows of other
    /// dictionaries with the same headword.
    pub(crate) fn get_related_dictionary_entries(
        &self,
        dictionary_entries: Vec<TermDictionaryEntry>,
        options: &FindTermsOptions,
        tag_aggregator: &mut TagAggregator,
    ) -> Result<Vec<TermDictionaryEntry>, TranslatorError> {
        let FindTermsOptions {
            main_dictionary,
            enabled_dictionary_map,
            language,
            primary_reading,
            ..
        } = options;

        let mut sequence_list: Vec<SequenceQuery> = Vec::new();
        let mut grouped_dictionary_entries: Vec<DictionaryEntryGroup> = Vec::new();
        let mut grouped_dictionary_entries_map: IndexMap<i64, usize> = IndexMap::new();
        let mut ungrouped_dictionary_entries_map: IndexMap<u64, TermDictionaryEntry> =
            IndexMap::new();

        for dictionary_entry in dictionary_entries {
            let Some(definition) = dictionary_entry.definitions.first() else {
                continue;
            };
            let id = definition.id;
            let sequence = definition.sequences.first().copied().unwrap_or(-1);
            if &definition.dictionary == main_dictionary && sequence >= 0 {
                let group_index = *grouped_dictionary_entries_map
                    .entry(sequence)
                    .or_insert_with(|| {
                        sequence_list.push(SequenceQuery {
                            query: sequence,
                            dictionary: definition.dictionary.clone(),
                        });
                        grouped_dictionary_entries.push(DictionaryEntryGroup::default());
                        grouped_dictionary_entries.len() - 1
                    });
                let group = &mut grouped_dictionary_entries[group_index];
                group.ids.insert(id);
                group.dictionary_entries.push(dictionary_entry);
            } else {
                ungrouped_dictionary_entries_map.insert(id, dictionary_entry);
            }
        }

        if !sequence_list.is_empty() {
            let secondary_search_dictionary_map =
                get_secondary_search_dictionary_map(enabled_dictionary_map);
            self.add_related_dictionary_entries(
                &mut grouped_dictionary_entries,
                &mut ungrouped_dictionary_entries_map,
                &sequence_list,
                enabled_dictionary_map,
                tag_aggregator,
                primary_reading,
            )?;
            for group in &mut grouped_dictionary_entries {
                sort_term_dictionary_entries_by_id(&mut group.dictionary_entries);
            }
            if !ungrouped_dictionary_entries_map.is_empty()
                || !secondary_search_dictionary_map.is_empty()
            {
                self.add_secondary_related_dictionary_entries(
                    language,
                    &mut grouped_dictionary_entries,
                    &mut ungrouped_dictionary_entries_map,
                    enabled_dictionary_map,
                    &secondary_search_dictionary_map,
                    tag_aggregator,
                    primary_reading,
                )?;
            }
        }

        let mut new_dictionary_entries = Vec::new();
        for group in grouped_dictionary_entries {
            new_dictionary_entries.push(self.create_grouped_dictionary_entry(
                language,
                group.dictionary_entries,
                true,
                tag_aggregator,
                primary_reading,
            ));
        }
        new_dictionary_entries.extend(self.group_dictionary_entries_by_headword(
            language,
            ungrouped_dictionary_entries_map.into_values(),
            tag_aggregator,
            primary_reading,
        ));
        Ok(new_dictionary_entries)
    }

    fn add_related_dictionary_entries(
        &self,
        grouped_dictionary_entries: &mut [DictionaryEntryGroup],
        ungrouped_dictionary_entries_map: &mut IndexMap<u64, TermDictionaryEntry>,
        sequence_list: &[SequenceQuery],
        enabled_dictionary_map: &TermEnabledDictionaryMap,
        tag_aggregator: &mut TagAggregator,
        primary_reading: &str,
    ) -> Result<(), TranslatorError> {
        let database_entries = self.db.find_terms_by_sequence_bulk(sequence_list)?;
        for database_entry in database_entries {
            let Some(group) = grouped_dictionary_entries.get_mut(database_entry.index) else {
                continue;
            };
            let id = database_entry.id;
            if group.ids.contains(&id) {
                continue;
            }
            let term = database_entry.term.clone();
            let dictionary_entry = self.create_term_dictionary_entry_from_database_entry(
                database_entry,
                &term,
                &term,
                &term,
                Vec::new(),
                Vec::new(),
                false,
                enabled_dictionary_map,
                tag_aggregator,
                primary_reading,
            );
            group.dictionary_entries.push(dictionary_entry);
            group.ids.insert(id);
            ungrouped_dictionary_entries_map.shift_remove(&id);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn add_secondary_related_dictionary_entries(
        &self,
        language: &str,
        grouped_dictionary_entries: &mut [DictionaryEntryGroup],
        ungrouped_dictionary_entries_map: &mut IndexMap<u64, TermDictionaryEntry>,
        enabled_dictionary_map: &TermEnabledDictionaryMap,
        secondary_search_dictionary_map: &TermEnabledDictionaryMap,
        tag_aggregator: &mut TagAggregator,
        primary_reading: &str,
    ) -> Result<(), TranslatorError> {
        // prepare grouping info
        let mut term_list: Vec<TermExactQueryRequest> = Vec::new();
        // headword -> indices of the groups containing it
        let mut target_map: IndexMap<HeadwordKey, Vec<usize>> = IndexMap::new();

        for (group_index, group) in grouped_dictionary_entries.iter().enumerate() {
            for dictionary_entry in &group.dictionary_entries {
                let Some(TermHeadword { term, reading, .. }) = dictionary_entry.headwords.first()
                else {
                    continue;
                };
                let key = (term.clone(), self.normalize_reading(language, reading));
                let target = target_map.entry(key).or_insert_with(|| {
                    term_list.push(TermExactQueryRequest {
                        term: term.clone(),
                        reading: reading.clone(),
                    });
                    Vec::new()
                });
                target.push(group_index);
            }
        }

        // unsequenced entries join sequenced groups with a matching headword
        let ungrouped_ids: Vec<u64> = ungrouped_dictionary_entries_map.keys().copied().collect();
        for id in ungrouped_ids {
            let Some(dictionary_entry) = ungrouped_dictionary_entries_map.get(&id) else {
                continue;
            };
            let Some(TermHeadword { term, reading, .. }) = dictionary_entry.headwords.first() else {
                continue;
            };
            let key = (term.clone(), self.normalize_reading(language, reading));
            let Some(target) = target_map.get(&key) else {
                continue;
            };
            for &group_index in target {
                let group = &mut grouped_dictionary_entries[group_index];
                if group.ids.contains(&id) {
                    continue;
                }
                group.dictionary_entries.push(dictionary_entry.clone());
                group.ids.insert(id);
            }
            ungrouped_dictionary_entries_map.shift_remove(&id);
        }

        // search the database for additional secondary terms
        if term_list.is_empty() || secondary_search_dictionary_map.is_empty() {
            return Ok(());
        }

        let mut database_entries = self
            .db
            .find_terms_exact_bulk(&term_list, secondary_search_dictionary_map)?;
        database_entries.sort_by_key(|entry| entry.index);

        for database_entry in database_entries {
            let index = database_entry.index;
            let id = database_entry.id;
            let (Some(request), Some(target)) =
                (term_list.get(index), target_map.get_index(index).map(|(_, t)| t))
            else {
                continue;
            };
            let source_text = request.term.as_str();
            for &group_index in target {
                let group = &mut grouped_dictionary_entries[group_index];
                if group.ids.contains(&id) {
                    continue;
                }
                let dictionary_entry = self.create_term_dictionary_entry_from_database_entry(
                    database_entry.clone(),
                    source_text,
                    source_text,
                    source_text,
                    Vec::new(),
                    Vec::new(),
                    false,
                    enabled_dictionary_map,
                    tag_aggregator,
                    primary_reading,
                );
                group.dictionary_entries.push(dictionary_entry);
                group.ids.insert(id);
                ungrouped_dictionary_entries_map.shift_remove(&id);
            }
        }
        Ok(())
    }

    /// Folds entries sharing (term, normalized reading, inflection chains).
    pub(crate) fn group_dictionary_entries_by_headword(
        &self,
        language: &str,
        dictionary_entries: impl IntoIterator<Item = TermDictionaryEntry>,
        tag_aggregator: &mut TagAggregator,
        primary_reading: &str,
    ) -> Vec<TermDictionaryEntry> {
        let mut groups: IndexMap<
            (String, String, Vec<InflectionRuleChainCandidate>),
            Vec<TermDictionaryEntry>,
        > = IndexMap::new();
        for dictionary_entry in dictionary_entries {
            let Some(TermHeadword { term, reading, .. }) = dictionary_entry.headwords.first() else {
                continue;
            };
            let key = (
                term.clone(),
                self.normalize_reading(language, reading),
                dictionary_entry.inflection_rule_chain_candidates.clone(),
            );
            groups.entry(key).or_default().push(dictionary_entry);
        }

        groups
            .into_values()
            .map(|group| {
                self.create_grouped_dictionary_entry(
                    language,
                    group,
                    false,
                    tag_aggregator,
                    primary_reading,
                )
            })
            .collect()
    }

    pub(crate) fn create_grouped_dictionary_entry(
        &self,
        language: &str,
        dictionary_entries: Vec<TermDictionaryEntry>,
        check_duplicate_definitions: bool,
        tag_aggregator: &mut TagAggregator,
        primary_reading: &str,
    ) -> TermDictionaryEntry {
        // headwords are generated before sorting, so that the order of dictionary_entries is kept
        let mut headwords: IndexMap<HeadwordKey, TermHeadword> = IndexMap::new();
        let mut definition_entries: Vec<(TermDictionaryEntry, Vec<usize>)> = Vec::new();
        for mut dictionary_entry in dictionary_entries {
            let entry_headwords = std::mem::take(&mut dictionary_entry.headwords);
            let headword_index_map =
                self.add_term_headwords(language, &mut headwords, entry_headwords, tag_aggregator);
            definition_entries.push((dictionary_entry, headword_index_map));
        }

        let check_duplicate_definitions =
            check_duplicate_definitions && definition_entries.len() > 1;

        let mut score = i64::MIN;
        let mut dictionary_index = usize::MAX;
        let mut max_original_text_length = 0;
        let mut is_primary = false;
        let mut definitions: Vec<TermDefinition> = Vec::new();
        let mut definitions_map: IndexMap<(String, Vec<TermGlossaryContent>), usize> =
            IndexMap::new();
        let mut inflections: Option<Vec<InflectionRuleChainCandidate>> = None;
        let mut text_processes: Option<Vec<Vec<String>>> = None;

        for (dictionary_entry, headword_index_map) in definition_entries {
            score = score.max(dictionary_entry.score);
            dictionary_index = dictionary_index.min(dictionary_entry.dictionary_index);

            if dictionary_entry.is_primary {
                is_primary = true;
                max_original_text_length =
                    max_original_text_length.max(dictionary_entry.max_original_text_length);

                let entry_inflections = &dictionary_entry.inflection_rule_chain_candidates;
                if inflections
                    .as_ref()
                    .map_or(true, |current| entry_inflections.len() < current.len())
                {
                    inflections = Some(entry_inflections.clone());
                }
                let entry_text_processes = &dictionary_entry.text_processor_rule_chain_candidates;
                if text_processes
                    .as_ref()
                    .map_or(true, |current| entry_text_processes.len() < current.len())
                {
                    text_processes = Some(entry_text_processes.clone());
                }
            }

            if check_duplicate_definitions {
                add_term_definitions(
                    &mut definitions,
                    &mut definitions_map,
                    dictionary_entry.definitions,
                    &headword_index_map,
                    tag_aggregator,
                );
            } else {
                add_term_definitions_fast(
                    &mut definitions,
                    dictionary_entry.definitions,
                    &headword_index_map,
                );
            }
        }

        let headwords: Vec<TermHeadword> = headwords.into_values().collect();

        let mut source_term_exact_match_count = 0;
        let mut match_primary_reading = false;
        for TermHeadword {
            sources, reading, ..
        } in &headwords
        {
            if !primary_reading.is_empty() && reading == primary_reading {
                match_primary_reading = true;
            }
            if sources
                .iter()
                .any(|s| s.is_primary && s.match_source == TermSourceMatchSource::Term)
            {
                source_term_exact_match_count += 1;
            }
        }

        TermDictionaryEntry {
            is_primary,
            text_processor_rule_chain_candidates: text_processes.unwrap_or_default(),
            inflection_rule_chain_candidates: inflections.unwrap_or_default(),
            score,
            frequency_order: 0.0,
            dictionary_index,
            dictionary_alias: String::new(),
            source_term_exact_match_count,
            match_primary_reading,
            max_original_text_length,
            headwords,
            definitions,
            pronunciations: Vec::new(),
            frequencies: Vec::new(),
        }
    }

    /// Adds `new_headwords` to the map and returns where each one landed.
    fn add_term_headwords(
        &self,
        language: &str,
        headwords_map: &mut IndexMap<HeadwordKey, TermHeadword>,
        new_headwords: Vec<TermHeadword>,
        tag_aggregator: &mut TagAggregator,
    ) -> Vec<usize> {
        let mut headword_index_map = Vec::with_capacity(new_headwords.len());
        for TermHeadword {
            term,
            reading,
            sources,
            word_classes,
            tag_target,
            ..
        } in new_headwords
        {
            let key = (term.clone(), self.normalize_reading(language, &reading));
            let next_index = headwords_map.len();
            let headword = headwords_map.entry(key).or_insert_with(|| TermHeadword {
                index: next_index,
                term,
                reading,
                sources: Vec::new(),
                tags: Vec::new(),
                word_classes: Vec::new(),
                tag_target: tag_aggregator.new_target(),
            });
            add_unique_sources(&mut headword.sources, sources);
            add_unique_simple(&mut headword.word_classes, word_classes);
            tag_aggregator.merge_tags(headword.tag_target, tag_target);
            headword_index_map.push(headword.index);
        }
        headword_index_map
    }
}

fn get_secondary_search_dictionary_map(
    enabled_dictionary_map: &TermEnabledDictionaryMap,
) -> TermEnabledDictionaryMap {
    enabled_dictionary_map
        .iter()
        .filter(|(_, details)| details.allow_secondary_searches)
        .map(|(name, details)| (name.clone(), details.clone()))
        .collect()
}

pub(crate) fn add_unique_simple<T: PartialEq>(list: &mut Vec<T>, new_items: impl IntoIterator<Item = T>) {
    for item in new_items {
        if !list.contains(&item) {
            list.push(item);
        }
    }
}

fn add_unique_sources(sources: &mut Vec<TermSource>, new_sources: Vec<TermSource>) {
    if sources.is_empty() {
        sources.extend(new_sources);
        return;
    }
    for new_source in new_sources {
        let existing = sources.iter_mut().find(|source| {
            source.deinflected_text == new_source.deinflected_text
                && source.transformed_text == new_source.transformed_text
                && source.original_text == new_source.original_text
                && source.match_type == new_source.match_type
                && source.match_source == new_source.match_source
        });
        match existing {
            Some(source) => {
                if new_source.is_primary {
                    source.is_primary = true;
                }
            }
            None => sources.push(new_source),
        }
    }
}

/// Inserts into a sorted, unique index list.
fn add_unique_term_headword_index(headword_indices: &mut Vec<usize>, headword_index: usize) {
    if let Err(pos) = headword_indices.binary_search(&headword_index) {
        headword_indices.insert(pos, headword_index);
    }
}

fn add_term_definitions_fast(
    definitions: &mut Vec<TermDefinition>,
    new_definitions: Vec<TermDefinition>,
    headword_index_map: &[usize],
) {
    for mut definition in new_definitions {
        definition.index = definitions.len();
        definition.headword_indices = definition
            .headword_indices
            .iter()
            .filter_map(|&i| headword_index_map.get(i).copied())
            .collect();
        definition.frequency_order = 0.0;
        definitions.push(definition);
    }
}

fn add_term_definitions(
    definitions: &mut Vec<TermDefinition>,
    definitions_map: &mut IndexMap<(String, Vec<TermGlossaryContent>), usize>,
    new_definitions: Vec<TermDefinition>,
    headword_index_map: &[usize],
    tag_aggregator: &mut TagAggregator,
) {
    for new_definition in new_definitions {
        let key = (
            new_definition.dictionary.clone(),
            new_definition.entries.clone(),
        );
        let position = match definitions_map.get(&key) {
            Some(&position) => {
                let definition = &mut definitions[position];
                if new_definition.is_primary {
                    definition.is_primary = true;
                }
                add_unique_simple(&mut definition.sequences, new_definition.sequences.iter().copied());
                position
            }
            None => {
                let position = definitions.len();
                definitions.push(TermDefinition {
                    index: position,
                    headword_indices: Vec::new(),
                    dictionary: new_definition.dictionary.clone(),
                    dictionary_index: new_definition.dictionary_index,
                    dictionary_alias: new_definition.dictionary_alias.clone(),
                    id: new_definition.id,
                    score: new_definition.score,
                    frequency_order: 0.0,
                    sequences: new_definition.sequences.clone(),
                    is_primary: new_definition.is_primary,
                    tags: Vec::new(),
                    entries: new_definition.entries.clone(),
                    tag_target: tag_aggregator.new_target(),
                });
                definitions_map.insert(key, position);
                position
            }
        };

        let definition = &mut definitions[position];
        for &headword_index in &new_definition.headword_indices {
            if let Some(&mapped) = headword_index_map.get(headword_index) {
                add_unique_term_headword_index(&mut definition.headword_indices, mapped);
            }
        }
        tag_aggregator.merge_tags(definition.tag_target, new_definition.tag_target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn headword_index_insert_keeps_order() {
        let mut indices = vec![0, 2];
        add_unique_term_headword_index(&mut indices, 1);
        add_unique_term_headword_index(&mut indices, 2);
        add_unique_term_headword_index(&mut indices, 5);
        assert_eq!(indices, vec![0, 1, 2, 5]);
    }

    #[test]
    fn unique_simple() {
        let mut list = vec!["v5".to_string()];
        add_unique_simple(&mut list, vec!["v5".to_string(), "vi".to_string()]);
        assert_eq!(list, vec!["v5".to_string(), "vi".to_string()]);
    }
}
