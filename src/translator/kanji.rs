use indexmap::{IndexMap, IndexSet};

use crate::{
    database::{DictionaryDatabase, DictionaryDatabaseTag, GenericQueryRequest, KanjiEntry},
    dictionary::{KanjiDictionaryEntry, KanjiFrequency, KanjiStat, KanjiStatGroups},
    dictionary_data::NumOrStr,
    errors::TranslatorError,
    translation::{FindKanjiOptions, KanjiEnabledDictionaryMap},
};

use super::{
    get_dictionary_alias, get_dictionary_order,
    metadata::FrequencyInfo,
    sorting::{sort_kanji_dictionary_entries, sort_kanji_dictionary_entry_data, sort_kanji_stats},
    tag_aggregator::{get_name_base, TagAggregator},
    text_variants::get_japanese_chinese_korean_only_text,
    Translator,
};

impl<D: DictionaryDatabase> Translator<D> {
    /// Finds kanji entries for every unique character of `text`.
    ///
    /// `text` is usually a single character; longer strings are looked up one
    /// character at a time.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn find_kanji(
        &self,
        text: &str,
        options: &FindKanjiOptions,
    ) -> Result<Vec<KanjiDictionaryEntry>, TranslatorError> {
        let text = if options.remove_non_japanese_characters {
            get_japanese_chinese_korean_only_text(text)
        } else {
            text
        };
        let enabled_dictionary_map = &options.enabled_dictionary_map;
        let kanji_unique: IndexSet<String> = text.chars().map(String::from).collect();
        let kanji_list: Vec<String> = kanji_unique.into_iter().collect();

        let mut database_entries = self
            .db
            .find_kanji_bulk(&kanji_list, enabled_dictionary_map)?;
        if database_entries.is_empty() {
            return Ok(Vec::new());
        }
        database_entries.sort_by_key(|entry| entry.index);

        let mut tag_aggregator = TagAggregator::new();
        let mut dictionary_entries = Vec::with_capacity(database_entries.len());
        for KanjiEntry {
            character,
            onyomi,
            kunyomi,
            tags,
            definitions,
            stats,
            dictionary,
            ..
        } in database_entries
        {
            let expanded_stats = self.expand_kanji_stats(&stats, &dictionary)?;
            let tag_target = tag_aggregator.new_target();
            tag_aggregator.add_tags(tag_target, &dictionary, &tags);
            dictionary_entries.push(KanjiDictionaryEntry {
                character,
                dictionary_index: get_dictionary_order(&dictionary, enabled_dictionary_map),
                dictionary_alias: get_dictionary_alias(&dictionary, enabled_dictionary_map),
                dictionary,
                onyomi,
                kunyomi,
                tags: Vec::new(),
                stats: expanded_stats,
                definitions,
                frequencies: Vec::new(),
                tag_target,
            });
        }

        if dictionary_entries.len() > 1 {
            sort_kanji_dictionary_entries(&mut dictionary_entries);
        }

        self.add_kanji_meta(&mut dictionary_entries, enabled_dictionary_map)?;
        let expanded_tags = self.expand_tag_groups_and_group(&tag_aggregator)?;
        for entry in &mut dictionary_entries {
            if let Some(tags) = expanded_tags.get(&entry.tag_target) {
                entry.tags = tags.clone();
            }
        }

        sort_kanji_dictionary_entry_data(&mut dictionary_entries);
        log::debug!("{} kanji entries for {text:?}", dictionary_entries.len());
        Ok(dictionary_entries)
    }

    fn add_kanji_meta(
        &self,
        dictionary_entries: &mut [KanjiDictionaryEntry],
        enabled_dictionary_map: &KanjiEnabledDictionaryMap,
    ) -> Result<(), TranslatorError> {
        let kanji_list: Vec<String> = dictionary_entries
            .iter()
            .map(|entry| entry.character.clone())
            .collect();
        let metas = self
            .db
            .find_kanji_meta_bulk(&kanji_list, enabled_dictionary_map)?;
        for meta in metas {
            let Some(entry) = dictionary_entries.get_mut(meta.index) else {
                continue;
            };
            let FrequencyInfo {
                frequency,
                display_value,
                display_value_parsed,
            } = self.get_frequency_info(&meta.data);
            entry.frequencies.push(KanjiFrequency {
                index: entry.frequencies.len(),
                dictionary_index: get_dictionary_order(&meta.dictionary, enabled_dictionary_map),
                dictionary_alias: get_dictionary_alias(&meta.dictionary, enabled_dictionary_map),
                dictionary: meta.dictionary,
                character: meta.character,
                frequency,
                display_value,
                display_value_parsed,
            });
        }
        Ok(())
    }

    /// Resolves stat names through tag metadata and groups them by category.
    /// Stats without metadata are dropped.
    fn expand_kanji_stats(
        &self,
        stats: &IndexMap<String, NumOrStr>,
        dictionary: &str,
    ) -> Result<KanjiStatGroups, TranslatorError> {
        let items: Vec<GenericQueryRequest> = stats
            .keys()
            .map(|name| GenericQueryRequest {
                query: get_name_base(name).to_string(),
                dictionary: dictionary.to_string(),
            })
            .collect();
        let database_infos = self.find_tag_meta_cached(&items)?;

        let mut stats_groups: KanjiStatGroups = IndexMap::new();
        for ((name, value), database_info) in stats.iter().zip(database_infos) {
            let Some(database_info) = database_info else {
                continue;
            };
            let stat = create_kanji_stat(name, value, &database_info, dictionary);
            stats_groups
                .entry(database_info.category.clone())
                .or_default()
                .push(stat);
        }
        for group in stats_groups.values_mut() {
            sort_kanji_stats(group, &self.string_comparer);
        }
        Ok(stats_groups)
    }
}

fn create_kanji_stat(
    name: &str,
    value: &NumOrStr,
    database_info: &DictionaryDatabaseTag,
    dictionary: &str,
) -> KanjiStat {
    KanjiStat {
        name: name.to_string(),
        category: if database_info.category.is_empty() {
            "default".to_string()
        } else {
            database_info.category.clone()
        },
        content: database_info.notes.clone(),
        order: database_info.order,
        score: database_info.score,
        dictionary: dictionary.to_string(),
        value: value.clone(),
    }
}
