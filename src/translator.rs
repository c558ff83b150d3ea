//! The lookup engine: turns a piece of text into ranked dictionary entries.

mod grouping;
mod kanji;
mod metadata;
pub mod sorting;
pub mod tag_aggregator;
pub mod text_variants;

use std::{hash::Hash, sync::Arc};

use fancy_regex::Regex;
use getset::Getters;
use icu::{
    collator::{Collator, CollatorOptions},
    locid::locale,
};
use indexmap::{IndexMap, IndexSet};

use crate::{
    database::{DictionaryDatabase, TermEntry},
    dictionary::{
        InflectionRule, InflectionRuleChainCandidate, InflectionSource, TermDefinition,
        TermDictionaryEntry, TermHeadword, TermSource,
    },
    dictionary_data::{TermGlossary, TermGlossaryDeinflection},
    errors::TranslatorError,
    language::{
        descriptors::built_in_language_descriptors,
        language_d::{LanguageDescriptor, LanguageSummary},
        transformer::{LanguageTransformer, MultiLanguageTransformer},
    },
    translation::{
        FindKanjiDictionary, FindTermDictionary, FindTermsMatchType, FindTermsMode,
        FindTermsOptions, FindTermsSortOrder, TermEnabledDictionaryMap,
    },
    translation_internal::{DatabaseDeinflection, TextProcessorRuleChainCandidate},
};

pub use metadata::{FrequencyInfo, TermReadingItem};
pub use tag_aggregator::{TagCache, TagTargetId};

use sorting::{
    sort_term_dictionary_entries, sort_term_dictionary_entry_definitions,
    sort_term_dictionary_entry_simple_data, update_sort_frequencies,
};
use tag_aggregator::{flag_redundant_definition_tags, ExpandedTags, TagAggregator};
use text_variants::get_japanese_chinese_korean_only_text;

/// Languages whose input can be cut down to CJK characters before lookup.
const CJK_LANGUAGES: [&str; 4] = ["ja", "zh", "yue", "ko"];

/// The result of [`Translator::find_terms`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindTermsResult {
    pub dictionary_entries: Vec<TermDictionaryEntry>,
    /// Length in characters of the longest source substring that matched.
    pub original_text_length: usize,
}

/// What the engine needs from an enabled dictionary map value.
pub trait EnabledDictionary {
    fn index(&self) -> usize;
    fn alias(&self) -> &str;
}

impl EnabledDictionary for FindTermDictionary {
    fn index(&self) -> usize {
        self.index
    }
    fn alias(&self) -> &str {
        &self.alias
    }
}

impl EnabledDictionary for FindKanjiDictionary {
    fn index(&self) -> usize {
        self.index
    }
    fn alias(&self) -> &str {
        &self.alias
    }
}

/// Priority of `dictionary`; unknown dictionaries sort after every enabled one.
pub(crate) fn get_dictionary_order<T: EnabledDictionary>(
    dictionary: &str,
    enabled_dictionary_map: &IndexMap<String, T>,
) -> usize {
    enabled_dictionary_map
        .get(dictionary)
        .map_or(enabled_dictionary_map.len(), EnabledDictionary::index)
}

pub(crate) fn get_dictionary_alias<T: EnabledDictionary>(
    dictionary: &str,
    enabled_dictionary_map: &IndexMap<String, T>,
) -> String {
    match enabled_dictionary_map.get(dictionary).map(EnabledDictionary::alias) {
        Some(alias) if !alias.is_empty() => alias.to_string(),
        _ => dictionary.to_string(),
    }
}

/// Finds term and kanji dictionary entries for text.
#[derive(Getters)]
pub struct Translator<D: DictionaryDatabase> {
    #[getset(get = "pub")]
    db: D,
    mlt: MultiLanguageTransformer,
    #[getset(get = "pub")]
    tag_cache: Arc<TagCache>,
    /// Invariant locale ("en-US").
    string_comparer: Collator,
    number_regex: Regex,
    #[getset(get = "pub")]
    languages: IndexMap<String, LanguageDescriptor>,
}

impl<D: DictionaryDatabase> Translator<D> {
    /// Creates a translator with the built-in languages and its own tag cache.
    pub fn new(db: D) -> Result<Self, TranslatorError> {
        Self::with_tag_cache(db, Arc::new(TagCache::new()))
    }

    /// Creates a translator sharing `tag_cache` with other translators over the same store.
    pub fn with_tag_cache(db: D, tag_cache: Arc<TagCache>) -> Result<Self, TranslatorError> {
        let string_comparer = Collator::try_new(&locale!("en-US").into(), CollatorOptions::new())
            .map_err(|e| TranslatorError::Collator(e.to_string()))?;
        let mut translator = Self {
            db,
            mlt: MultiLanguageTransformer::new(),
            tag_cache,
            string_comparer,
            number_regex: Regex::new(r"[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?")?,
            languages: IndexMap::new(),
        };
        for descriptor in built_in_language_descriptors().into_values() {
            translator.add_language(descriptor)?;
        }
        Ok(translator)
    }

    /// Registers (or replaces) a language.
    pub fn add_language(&mut self, descriptor: LanguageDescriptor) -> Result<(), TranslatorError> {
        if let Some(transforms) = &descriptor.language_transforms {
            self.mlt.add_descriptor(transforms)?;
        }
        log::debug!("registered language {}", descriptor.iso);
        self.languages.insert(descriptor.iso.clone(), descriptor);
        Ok(())
    }

    pub fn language_summaries(&self) -> Vec<LanguageSummary> {
        self.languages.values().map(LanguageSummary::from).collect()
    }

    /// Clears the tag cache. Call this whenever the installed dictionaries change.
    pub fn clear_database_caches(&self) {
        self.tag_cache.clear();
    }

    /// Finds term definitions for the given text.
    ///
    /// `mode` decides how rows are folded into entries; see [`FindTermsMode`].
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn find_terms(
        &self,
        mode: FindTermsMode,
        text: &str,
        options: &FindTermsOptions,
    ) -> Result<FindTermsResult, TranslatorError> {
        let FindTermsOptions {
            enabled_dictionary_map,
            exclude_dictionary_definitions,
            sort_frequency_dictionary,
            sort_frequency_dictionary_order,
            language,
            primary_reading,
            ..
        } = options;
        let mut tag_aggregator = TagAggregator::new();
        let (mut dictionary_entries, original_text_length) =
            self.find_terms_internal(text, options, &mut tag_aggregator)?;

        match mode {
            FindTermsMode::Group => {
                dictionary_entries = self.group_dictionary_entries_by_headword(
                    language,
                    dictionary_entries,
                    &mut tag_aggregator,
                    primary_reading,
                );
            }
            FindTermsMode::Merge => {
                dictionary_entries =
                    self.get_related_dictionary_entries(dictionary_entries, options, &mut tag_aggregator)?;
            }
            FindTermsMode::Simple | FindTermsMode::Split => {}
        }

        if let Some(excluded) = exclude_dictionary_definitions {
            remove_excluded_definitions(&mut dictionary_entries, excluded, &mut tag_aggregator);
        }

        if mode != FindTermsMode::Simple {
            self.add_term_meta(&mut dictionary_entries, enabled_dictionary_map, &mut tag_aggregator)?;
            let expanded_tags = self.expand_tag_groups_and_group(&tag_aggregator)?;
            apply_expanded_tags(&mut dictionary_entries, &expanded_tags);
        } else if let Some(sort_dictionary) = sort_frequency_dictionary {
            let mut sort_dictionary_map = TermEnabledDictionaryMap::new();
            if let Some(value) = enabled_dictionary_map.get(sort_dictionary) {
                sort_dictionary_map.insert(sort_dictionary.clone(), value.clone());
            }
            self.add_term_meta(&mut dictionary_entries, &sort_dictionary_map, &mut tag_aggregator)?;
        }

        if let Some(sort_dictionary) = sort_frequency_dictionary {
            update_sort_frequencies(
                &mut dictionary_entries,
                sort_dictionary,
                *sort_frequency_dictionary_order == FindTermsSortOrder::Ascending,
            );
        }
        if dictionary_entries.len() > 1 {
            sort_term_dictionary_entries(&mut dictionary_entries, &self.string_comparer);
        }
        for TermDictionaryEntry {
            definitions,
            frequencies,
            pronunciations,
            ..
        } in &mut dictionary_entries
        {
            flag_redundant_definition_tags(definitions);
            if definitions.len() > 1 {
                sort_term_dictionary_entry_definitions(definitions);
            }
            if frequencies.len() > 1 {
                sort_term_dictionary_entry_simple_data(frequencies);
            }
            if pronunciations.len() > 1 {
                sort_term_dictionary_entry_simple_data(pronunciations);
            }
        }
        self.add_user_facing_inflections(language, &mut dictionary_entries);

        log::debug!(
            "find_terms({mode:?}, {text:?}): {} entries",
            dictionary_entries.len()
        );
        Ok(FindTermsResult {
            dictionary_entries,
            original_text_length,
        })
    }

    fn find_terms_internal(
        &self,
        text: &str,
        options: &FindTermsOptions,
        tag_aggregator: &mut TagAggregator,
    ) -> Result<(Vec<TermDictionaryEntry>, usize), TranslatorError> {
        let text = if options.remove_non_japanese_characters
            && CJK_LANGUAGES.contains(&options.language.as_str())
        {
            get_japanese_chinese_korean_only_text(text)
        } else {
            text
        };
        if text.is_empty() {
            return Ok((Vec::new(), 0));
        }
        if !self.languages.contains_key(&options.language) {
            return Err(TranslatorError::UnsupportedLanguage(options.language.clone()));
        }

        let deinflections = self.get_deinflections(text, options)?;
        Ok(self.get_dictionary_entries(
            deinflections,
            &options.enabled_dictionary_map,
            tag_aggregator,
            &options.primary_reading,
        ))
    }

    /// Assembles one entry per row. A row reached through several candidates
    /// keeps the longest transformed text; equally long ones merge their chains.
    fn get_dictionary_entries(
        &self,
        deinflections: Vec<DatabaseDeinflection>,
        enabled_dictionary_map: &TermEnabledDictionaryMap,
        tag_aggregator: &mut TagAggregator,
        primary_reading: &str,
    ) -> (Vec<TermDictionaryEntry>, usize) {
        let mut original_text_length = 0;
        let mut dictionary_entries: Vec<TermDictionaryEntry> = Vec::new();
        let mut ids: IndexSet<u64> = IndexSet::new();

        for DatabaseDeinflection {
            original_text,
            transformed_text,
            deinflected_text,
            text_processor_rule_chain_candidates,
            inflection_rule_chain_candidates,
            database_entries,
            ..
        } in deinflections
        {
            if database_entries.is_empty() {
                continue;
            }
            original_text_length = original_text_length.max(original_text.chars().count());
            let transformed_length = transformed_text.chars().count();

            for database_entry in database_entries {
                let id = database_entry.id;
                if !ids.contains(&id) {
                    dictionary_entries.push(self.create_term_dictionary_entry_from_database_entry(
                        database_entry,
                        &original_text,
                        &transformed_text,
                        &deinflected_text,
                        text_processor_rule_chain_candidates.clone(),
                        inflection_rule_chain_candidates.clone(),
                        true,
                        enabled_dictionary_map,
                        tag_aggregator,
                        primary_reading,
                    ));
                    ids.insert(id);
                    continue;
                }

                let Some(existing_index) = find_existing_entry(&dictionary_entries, id) else {
                    continue;
                };
                let existing_transformed_length = dictionary_entries[existing_index]
                    .headwords
                    .first()
                    .and_then(|headword| headword.sources.first())
                    .map_or(0, |source| source.transformed_text.chars().count());

                if transformed_length < existing_transformed_length {
                    continue;
                }
                if transformed_length > existing_transformed_length {
                    dictionary_entries[existing_index] = self
                        .create_term_dictionary_entry_from_database_entry(
                            database_entry,
                            &original_text,
                            &transformed_text,
                            &deinflected_text,
                            text_processor_rule_chain_candidates.clone(),
                            inflection_rule_chain_candidates.clone(),
                            true,
                            enabled_dictionary_map,
                            tag_aggregator,
                            primary_reading,
                        );
                } else {
                    let existing_entry = &mut dictionary_entries[existing_index];
                    merge_inflection_rule_chains(existing_entry, &inflection_rule_chain_candidates);
                    merge_text_processor_rule_chains(
                        existing_entry,
                        &text_processor_rule_chain_candidates,
                    );
                }
            }
        }
        (dictionary_entries, original_text_length)
    }

    fn get_deinflections(
        &self,
        text: &str,
        options: &FindTermsOptions,
    ) -> Result<Vec<DatabaseDeinflection>, TranslatorError> {
        let mut deinflections = if options.deinflect {
            self.get_algorithm_deinflections(text, options)?
        } else {
            vec![DatabaseDeinflection::new(text, text, text, 0, Vec::new(), Vec::new())]
        };
        if deinflections.is_empty() {
            return Ok(deinflections);
        }

        let FindTermsOptions {
            match_type,
            language,
            enabled_dictionary_map,
            ..
        } = options;

        self.add_entries_to_deinflections(
            language,
            &mut deinflections,
            enabled_dictionary_map,
            *match_type,
        )?;

        let dictionary_deinflections = self.get_dictionary_deinflections(
            language,
            &deinflections,
            enabled_dictionary_map,
            *match_type,
        )?;
        deinflections.extend(dictionary_deinflections);

        for deinflection in &mut deinflections {
            for entry in &mut deinflection.database_entries {
                entry
                    .definitions
                    .retain(|definition| definition.as_deinflection().is_none());
            }
            deinflection
                .database_entries
                .retain(|entry| !entry.definitions.is_empty());
        }
        deinflections.retain(|deinflection| !deinflection.database_entries.is_empty());
        Ok(deinflections)
    }

    /// Follows the `formOf` cross references of the rows already found.
    fn get_dictionary_deinflections(
        &self,
        language: &str,
        deinflections: &[DatabaseDeinflection],
        enabled_dictionary_map: &TermEnabledDictionaryMap,
        match_type: FindTermsMatchType,
    ) -> Result<Vec<DatabaseDeinflection>, TranslatorError> {
        let mut dictionary_deinflections = Vec::new();
        for DatabaseDeinflection {
            original_text,
            transformed_text,
            text_processor_rule_chain_candidates,
            inflection_rule_chain_candidates: algorithm_chains,
            database_entries,
            ..
        } in deinflections
        {
            for TermEntry {
                dictionary,
                definitions,
                ..
            } in database_entries
            {
                let use_deinflections = enabled_dictionary_map
                    .get(dictionary)
                    .map_or(true, |d| d.use_deinflections);
                if !use_deinflections {
                    continue;
                }
                for TermGlossaryDeinflection {
                    uninflected: form_of,
                    inflection_rule_chain: inflection_rules,
                } in definitions.iter().filter_map(TermGlossary::as_deinflection)
                {
                    if form_of.is_empty() {
                        continue;
                    }
                    let inflection_rule_chain_candidates = algorithm_chains
                        .iter()
                        .map(|InflectionRuleChainCandidate { inflection_rules: alg_inflections, .. }| {
                            InflectionRuleChainCandidate {
                                source: if alg_inflections.is_empty() {
                                    InflectionSource::Dictionary
                                } else {
                                    InflectionSource::Both
                                },
                                inflection_rules: alg_inflections
                                    .iter()
                                    .cloned()
                                    .chain(
                                        inflection_rules
                                            .iter()
                                            .map(|rule| InflectionRule::from_id(rule.as_str())),
                                    )
                                    .collect(),
                            }
                        })
                        .collect();
                    dictionary_deinflections.push(DatabaseDeinflection::new(
                        original_text.as_str(),
                        transformed_text.as_str(),
                        form_of.as_str(),
                        0,
                        text_processor_rule_chain_candidates.clone(),
                        inflection_rule_chain_candidates,
                    ));
                }
            }
        }

        self.add_entries_to_deinflections(
            language,
            &mut dictionary_deinflections,
            enabled_dictionary_map,
            match_type,
        )?;
        Ok(dictionary_deinflections)
    }

    /// One bulk query for every distinct deinflected text.
    fn add_entries_to_deinflections(
        &self,
        language: &str,
        deinflections: &mut [DatabaseDeinflection],
        enabled_dictionary_map: &TermEnabledDictionaryMap,
        match_type: FindTermsMatchType,
    ) -> Result<(), TranslatorError> {
        if deinflections.is_empty() {
            return Ok(());
        }
        let mut unique_deinflections_map: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (i, deinflection) in deinflections.iter().enumerate() {
            unique_deinflections_map
                .entry(deinflection.deinflected_text.clone())
                .or_default()
                .push(i);
        }
        let unique_deinflection_terms: Vec<String> =
            unique_deinflections_map.keys().cloned().collect();

        let database_entries = self.db.find_terms_bulk(
            &unique_deinflection_terms,
            enabled_dictionary_map,
            match_type,
        )?;
        log::debug!(
            "{} rows for {} distinct terms",
            database_entries.len(),
            unique_deinflection_terms.len()
        );
        self.match_entries_to_deinflections(
            language,
            database_entries,
            &unique_deinflections_map,
            deinflections,
            enabled_dictionary_map,
        );
        Ok(())
    }

    /// Keeps a row for a candidate only when its part of speech agrees with
    /// the candidate's grammatical conditions.
    fn match_entries_to_deinflections(
        &self,
        language: &str,
        database_entries: Vec<TermEntry>,
        unique_deinflections_map: &IndexMap<String, Vec<usize>>,
        deinflections: &mut [DatabaseDeinflection],
        enabled_dictionary_map: &TermEnabledDictionaryMap,
    ) {
        for database_entry in database_entries {
            let parts_of_speech_filter = match enabled_dictionary_map.get(&database_entry.dictionary) {
                Some(entry_dictionary) => entry_dictionary.parts_of_speech_filter,
                None => {
                    log::warn!(
                        "row from {} which is not in the enabled dictionary map",
                        database_entry.dictionary
                    );
                    true
                }
            };
            let definition_conditions = self
                .mlt
                .get_condition_flags_from_parts_of_speech(language, &database_entry.rules);
            let Some((_, indices)) = unique_deinflections_map.get_index(database_entry.index) else {
                continue;
            };
            for &i in indices {
                let deinflection = &mut deinflections[i];
                if !parts_of_speech_filter
                    || LanguageTransformer::conditions_match(
                        deinflection.conditions,
                        definition_conditions,
                    )
                {
                    deinflection.database_entries.push(database_entry.clone());
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn create_term_dictionary_entry_from_database_entry(
        &self,
        database_entry: TermEntry,
        original_text: &str,
        transformed_text: &str,
        deinflected_text: &str,
        text_processor_rule_chain_candidates: Vec<TextProcessorRuleChainCandidate>,
        inflection_rule_chain_candidates: Vec<InflectionRuleChainCandidate>,
        is_primary: bool,
        enabled_dictionary_map: &TermEnabledDictionaryMap,
        tag_aggregator: &mut TagAggregator,
        primary_reading: &str,
    ) -> TermDictionaryEntry {
        let TermEntry {
            id,
            match_type,
            match_source,
            term,
            reading: raw_reading,
            definition_tags,
            term_tags,
            rules,
            definitions,
            score,
            dictionary,
            sequence: raw_sequence,
            ..
        } = database_entry;
        // deinflection glossaries were stripped in get_deinflections
        let content_definitions = definitions
            .into_iter()
            .filter_map(TermGlossary::into_content)
            .collect();
        let reading = if raw_reading.is_empty() {
            term.clone()
        } else {
            raw_reading
        };
        let match_primary_reading = !primary_reading.is_empty() && reading == primary_reading;
        let dictionary_index = get_dictionary_order(&dictionary, enabled_dictionary_map);
        let dictionary_alias = get_dictionary_alias(&dictionary, enabled_dictionary_map);
        let source_term_exact_match_count = usize::from(is_primary && deinflected_text == term);
        let sequence = raw_sequence.max(-1);

        let headword_tag_target = tag_aggregator.new_target();
        let definition_tag_target = tag_aggregator.new_target();
        tag_aggregator.add_tags(headword_tag_target, &dictionary, &term_tags);
        tag_aggregator.add_tags(definition_tag_target, &dictionary, &definition_tags);

        let source = TermSource {
            original_text: original_text.to_string(),
            transformed_text: transformed_text.to_string(),
            deinflected_text: deinflected_text.to_string(),
            match_type,
            match_source,
            is_primary,
        };

        TermDictionaryEntry {
            is_primary,
            text_processor_rule_chain_candidates,
            inflection_rule_chain_candidates,
            score,
            frequency_order: 0.0,
            dictionary_index,
            dictionary_alias: dictionary_alias.clone(),
            source_term_exact_match_count,
            match_primary_reading,
            max_original_text_length: original_text.chars().count(),
            headwords: vec![TermHeadword {
                index: 0,
                term,
                reading,
                sources: vec![source],
                tags: Vec::new(),
                word_classes: rules,
                tag_target: headword_tag_target,
            }],
            definitions: vec![TermDefinition {
                index: 0,
                headword_indices: vec![0],
                dictionary,
                dictionary_index,
                dictionary_alias,
                id,
                score,
                frequency_order: 0.0,
                sequences: vec![sequence],
                is_primary,
                tags: Vec::new(),
                entries: content_definitions,
                tag_target: definition_tag_target,
            }],
            pronunciations: Vec::new(),
            frequencies: Vec::new(),
        }
    }

    /// The reading used to decide whether two headwords are the same.
    pub(crate) fn normalize_reading(&self, language: &str, reading: &str) -> String {
        match self
            .languages
            .get(language)
            .and_then(|descriptor| descriptor.reading_normalizer)
        {
            Some(normalizer) => normalizer(reading),
            None => reading.to_string(),
        }
    }

    /// Replaces internal rule ids with their display name and description.
    fn add_user_facing_inflections(
        &self,
        language: &str,
        dictionary_entries: &mut [TermDictionaryEntry],
    ) {
        for entry in dictionary_entries {
            for candidate in &mut entry.inflection_rule_chain_candidates {
                let rule_ids: Vec<String> = candidate
                    .inflection_rules
                    .iter()
                    .map(|rule| rule.name.clone())
                    .collect();
                candidate.inflection_rules =
                    self.mlt.get_user_facing_inflection_rules(language, &rule_ids);
            }
        }
    }
}

fn find_existing_entry(dictionary_entries: &[TermDictionaryEntry], id: u64) -> Option<usize> {
    dictionary_entries
        .iter()
        .position(|entry| entry.definitions.iter().any(|definition| definition.id == id))
}

fn merge_text_processor_rule_chains(
    existing_entry: &mut TermDictionaryEntry,
    text_processor_rule_chain_candidates: &[TextProcessorRuleChainCandidate],
) {
    for text_processor_rules in text_processor_rule_chain_candidates {
        let duplicate = existing_entry
            .text_processor_rule_chain_candidates
            .iter()
            .any(|existing_chain| are_arrays_equal_ignore_order(existing_chain, text_processor_rules));
        if !duplicate {
            existing_entry
                .text_processor_rule_chain_candidates
                .push(text_processor_rules.clone());
        }
    }
}

fn merge_inflection_rule_chains(
    existing_entry: &mut TermDictionaryEntry,
    inflection_rule_chain_candidates: &[InflectionRuleChainCandidate],
) {
    for candidate in inflection_rule_chain_candidates {
        let duplicate = existing_entry
            .inflection_rule_chain_candidates
            .iter_mut()
            .find(|existing_chain| {
                are_arrays_equal_ignore_order(
                    &existing_chain.inflection_rules,
                    &candidate.inflection_rules,
                )
            });
        match duplicate {
            None => existing_entry
                .inflection_rule_chain_candidates
                .push(candidate.clone()),
            Some(duplicate) if duplicate.source != candidate.source => {
                duplicate.source = InflectionSource::Both;
            }
            Some(_) => {}
        }
    }
}

/// Multiset equality.
fn are_arrays_equal_ignore_order<T: Eq + Hash>(array1: &[T], array2: &[T]) -> bool {
    if array1.len() != array2.len() {
        return false;
    }
    let mut frequency_counter: IndexMap<&T, usize> = IndexMap::new();
    for element in array1 {
        *frequency_counter.entry(element).or_default() += 1;
    }
    for element in array2 {
        match frequency_counter.get_mut(element) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return false,
        }
    }
    true
}

/// Drops everything that came from `excluded`, then prunes headwords no
/// remaining definition refers to.
fn remove_excluded_definitions(
    dictionary_entries: &mut Vec<TermDictionaryEntry>,
    excluded: &IndexSet<String>,
    tag_aggregator: &mut TagAggregator,
) {
    dictionary_entries.retain_mut(|entry| {
        let definition_count = entry.definitions.len();
        entry
            .definitions
            .retain(|definition| !excluded.contains(&definition.dictionary));
        entry
            .pronunciations
            .retain(|pronunciation| !excluded.contains(&pronunciation.dictionary));
        entry
            .frequencies
            .retain(|frequency| !excluded.contains(&frequency.dictionary));
        for definition in &entry.definitions {
            tag_aggregator.remove_dictionaries(definition.tag_target, excluded);
        }
        for headword in &entry.headwords {
            tag_aggregator.remove_dictionaries(headword.tag_target, excluded);
        }

        if entry.definitions.len() == definition_count {
            return true;
        }
        if entry.definitions.is_empty() {
            return false;
        }
        remove_unused_headwords(entry);
        true
    });
}

fn remove_unused_headwords(entry: &mut TermDictionaryEntry) {
    let mut used = vec![false; entry.headwords.len()];
    for definition in &entry.definitions {
        for &headword_index in &definition.headword_indices {
            if let Some(slot) = used.get_mut(headword_index) {
                *slot = true;
            }
        }
    }
    if used.iter().all(|&u| u) {
        return;
    }

    let mut index_remap: Vec<Option<usize>> = Vec::with_capacity(used.len());
    let mut next = 0;
    for &u in &used {
        index_remap.push(u.then(|| {
            next += 1;
            next - 1
        }));
    }

    let mut old_index = 0;
    entry.headwords.retain(|_| {
        let keep = used[old_index];
        old_index += 1;
        keep
    });
    for (i, headword) in entry.headwords.iter_mut().enumerate() {
        headword.index = i;
    }

    let remap = |i: usize| index_remap.get(i).copied().flatten();
    for definition in &mut entry.definitions {
        definition.headword_indices = definition
            .headword_indices
            .iter()
            .filter_map(|&i| remap(i))
            .collect();
    }
    entry.pronunciations.retain_mut(|pronunciation| {
        match remap(pronunciation.headword_index) {
            Some(new_index) => {
                pronunciation.headword_index = new_index;
                true
            }
            None => false,
        }
    });
    entry.frequencies.retain_mut(|frequency| match remap(frequency.headword_index) {
        Some(new_index) => {
            frequency.headword_index = new_index;
            true
        }
        None => false,
    });
}

/// Writes resolved tags back onto every tag list of the entries.
fn apply_expanded_tags(dictionary_entries: &mut [TermDictionaryEntry], expanded_tags: &ExpandedTags) {
    let tags_of = |target: TagTargetId| expanded_tags.get(&target).cloned().unwrap_or_default();
    for entry in dictionary_entries {
        for headword in &mut entry.headwords {
            headword.tags = tags_of(headword.tag_target);
        }
        for definition in &mut entry.definitions {
            definition.tags = tags_of(definition.tag_target);
        }
        for term_pronunciation in &mut entry.pronunciations {
            for pronunciation in &mut term_pronunciation.pronunciations {
                *pronunciation.tags_mut() = tags_of(pronunciation.tag_target());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryDictionaryDatabase;
    use crate::dictionary::{TermFrequency, TermSourceMatchSource, TermSourceMatchType};
    use pretty_assertions::assert_eq;

    fn headword(index: usize, term: &str) -> TermHeadword {
        TermHeadword {
            index,
            term: term.into(),
            reading: "はしる".into(),
            sources: Vec::new(),
            tags: Vec::new(),
            word_classes: Vec::new(),
            tag_target: 0,
        }
    }

    fn definition(id: u64, dictionary: &str, headword_indices: Vec<usize>) -> TermDefinition {
        TermDefinition {
            index: 0,
            headword_indices,
            dictionary: dictionary.into(),
            dictionary_index: 0,
            dictionary_alias: dictionary.into(),
            id,
            score: 0,
            frequency_order: 0.0,
            sequences: vec![-1],
            is_primary: true,
            tags: Vec::new(),
            entries: Vec::new(),
            tag_target: 0,
        }
    }

    fn frequency(headword_index: usize, dictionary: &str) -> TermFrequency {
        TermFrequency {
            index: 0,
            headword_index,
            dictionary: dictionary.into(),
            dictionary_index: 0,
            dictionary_alias: dictionary.into(),
            has_reading: false,
            frequency: 1.0,
            display_value: None,
            display_value_parsed: false,
        }
    }

    fn entry(
        headwords: Vec<TermHeadword>,
        definitions: Vec<TermDefinition>,
        frequencies: Vec<TermFrequency>,
    ) -> TermDictionaryEntry {
        TermDictionaryEntry {
            is_primary: true,
            text_processor_rule_chain_candidates: vec![vec![]],
            inflection_rule_chain_candidates: Vec::new(),
            score: 0,
            frequency_order: 0.0,
            dictionary_index: 0,
            dictionary_alias: String::new(),
            source_term_exact_match_count: 0,
            match_primary_reading: false,
            max_original_text_length: 0,
            headwords,
            definitions,
            pronunciations: Vec::new(),
            frequencies,
        }
    }

    #[test]
    fn exclusion_prunes_headwords_and_remaps_indices() {
        let mut entries = vec![
            entry(
                vec![headword(0, "奔る"), headword(1, "走る")],
                vec![definition(1, "A", vec![0]), definition(2, "B", vec![1])],
                vec![frequency(0, "F"), frequency(1, "F")],
            ),
            entry(
                vec![headword(0, "走る")],
                vec![definition(3, "A", vec![0])],
                Vec::new(),
            ),
        ];
        let mut tag_aggregator = TagAggregator::new();
        remove_excluded_definitions(
            &mut entries,
            &IndexSet::from(["A".to_string()]),
            &mut tag_aggregator,
        );

        assert_eq!(entries.len(), 1);
        let remaining = &entries[0];
        assert_eq!(remaining.headwords, vec![headword(0, "走る")]);
        assert_eq!(remaining.definitions, vec![definition(2, "B", vec![0])]);
        assert_eq!(remaining.frequencies, vec![frequency(0, "F")]);
    }

    fn chain(source: InflectionSource, rules: &[&str]) -> InflectionRuleChainCandidate {
        InflectionRuleChainCandidate {
            source,
            inflection_rules: rules.iter().map(|r| InflectionRule::from_id(*r)).collect(),
        }
    }

    fn hashiru_row() -> TermEntry {
        TermEntry {
            id: 7,
            index: 0,
            match_type: TermSourceMatchType::Exact,
            match_source: TermSourceMatchSource::Term,
            term: "走る".into(),
            reading: "はしる".into(),
            definition_tags: Vec::new(),
            term_tags: Vec::new(),
            rules: vec!["v5".into()],
            definitions: vec![TermGlossary::text("to run")],
            score: 0,
            dictionary: "JMdict".into(),
            sequence: 1,
        }
    }

    fn candidate(transformed_text: &str, rules: &[&str]) -> DatabaseDeinflection {
        let mut deinflection = DatabaseDeinflection::new(
            transformed_text,
            transformed_text,
            "走る",
            0,
            vec![Vec::new()],
            vec![InflectionRuleChainCandidate {
                source: InflectionSource::Algorithm,
                inflection_rules: rules.iter().copied().map(InflectionRule::from_id).collect(),
            }],
        );
        deinflection.database_entries.push(hashiru_row());
        deinflection
    }

    #[test]
    fn later_longer_candidate_replaces_shorter() {
        let translator = Translator::new(InMemoryDictionaryDatabase::new()).unwrap();
        let mut enabled = TermEnabledDictionaryMap::new();
        enabled.insert("JMdict".into(), FindTermDictionary::default());
        let mut tag_aggregator = TagAggregator::new();

        let shorter = candidate("走らせ", &["causative"]);
        let longer = candidate("走らせられ", &["causative", "passive"]);
        let expected_chains = longer.inflection_rule_chain_candidates.clone();
        let (entries, original_text_length) = translator.get_dictionary_entries(
            vec![shorter, longer],
            &enabled,
            &mut tag_aggregator,
            "",
        );

        assert_eq!(original_text_length, 5);
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.headwords[0].sources.len(), 1);
        assert_eq!(entry.headwords[0].sources[0].transformed_text, "走らせられ");
        assert_eq!(entry.inflection_rule_chain_candidates, expected_chains);
        assert_eq!(entry.max_original_text_length, 5);
    }

    #[test]
    fn multiset_equality() {
        assert!(are_arrays_equal_ignore_order(&["a", "b", "a"], &["a", "a", "b"]));
        assert!(!are_arrays_equal_ignore_order(&["a", "b", "b"], &["a", "a", "b"]));
        assert!(!are_arrays_equal_ignore_order(&["a"], &["a", "a"]));
    }

    #[test]
    fn alias_falls_back_to_name() {
        let mut map = TermEnabledDictionaryMap::new();
        map.insert("JMdict".into(), FindTermDictionary::default());
        map.insert(
            "Jitendex".into(),
            FindTermDictionary {
                index: 1,
                alias: "JTDX".into(),
                ..Default::default()
            },
        );
        assert_eq!(get_dictionary_alias("JMdict", &map), "JMdict");
        assert_eq!(get_dictionary_alias("Jitendex", &map), "JTDX");
        assert_eq!(get_dictionary_order("Jitendex", &map), 1);
        assert_eq!(get_dictionary_order("missing", &map), 2);
    }

    #[test]
    fn same_chain_from_other_source_becomes_both() {
        let mut entry = entry(Vec::new(), Vec::new(), Vec::new());
        entry.inflection_rule_chain_candidates = vec![chain(InflectionSource::Algorithm, &["-た"])];
        merge_inflection_rule_chains(
            &mut entry,
            &[
                chain(InflectionSource::Dictionary, &["-た"]),
                chain(InflectionSource::Algorithm, &["-ます", "-た"]),
            ],
        );
        merge_text_processor_rule_chains(&mut entry, &[vec![], vec!["decapitalize".into()]]);
        assert_eq!(
            entry.inflection_rule_chain_candidates,
            vec![
                chain(InflectionSource::Both, &["-た"]),
                chain(InflectionSource::Algorithm, &["-ます", "-た"]),
            ]
        );
        assert_eq!(
            entry.text_processor_rule_chain_candidates,
            vec![vec![], vec!["decapitalize".to_string()]]
        );
    }
}
