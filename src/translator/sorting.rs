use std::cmp::Ordering;

use icu::collator::Collator;

use crate::dictionary::{
    InflectionRuleChainCandidate, KanjiDictionaryEntry, KanjiStat, TermDefinition,
    TermDictionaryEntry, TermFrequency, TermPronunciation,
};
use crate::translation_internal::TextProcessorRuleChainCandidate;

/// `Number.MAX_SAFE_INTEGER`, the sentinel for "no frequency" in ascending order.
pub const MAX_SAFE_INTEGER: f64 = 9007199254740991.0;

fn get_shortest_text_processing_chain_length(
    candidates: &[TextProcessorRuleChainCandidate],
) -> usize {
    candidates.iter().map(Vec::len).min().unwrap_or(0)
}

fn get_shortest_inflection_chain_length(candidates: &[InflectionRuleChainCandidate]) -> usize {
    candidates
        .iter()
        .map(|candidate| candidate.inflection_rules.len())
        .min()
        .unwrap_or(0)
}

/// The ranking order of term results.
pub fn compare_term_dictionary_entries(
    v1: &TermDictionaryEntry,
    v2: &TermDictionaryEntry,
    collator: &Collator,
) -> Ordering {
    // reading match
    v2.match_primary_reading
        .cmp(&v1.match_primary_reading)
        // length of source term
        .then_with(|| v2.max_original_text_length.cmp(&v1.max_original_text_length))
        .then_with(|| {
            get_shortest_text_processing_chain_length(&v1.text_processor_rule_chain_candidates).cmp(
                &get_shortest_text_processing_chain_length(&v2.text_processor_rule_chain_candidates),
            )
        })
        .then_with(|| {
            get_shortest_inflection_chain_length(&v1.inflection_rule_chain_candidates)
                .cmp(&get_shortest_inflection_chain_length(&v2.inflection_rule_chain_candidates))
        })
        // exact kana matches first
        .then_with(|| {
            v2.source_term_exact_match_count
                .cmp(&v1.source_term_exact_match_count)
        })
        .then_with(|| v1.frequency_order.total_cmp(&v2.frequency_order))
        .then_with(|| v1.dictionary_index.cmp(&v2.dictionary_index))
        .then_with(|| v2.score.cmp(&v1.score))
        .then_with(|| {
            for (hw1, hw2) in v1.headwords.iter().zip(&v2.headwords) {
                let ord = hw2
                    .term
                    .chars()
                    .count()
                    .cmp(&hw1.term.chars().count())
                    .then_with(|| collator.compare(&hw1.term, &hw2.term));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        })
        .then_with(|| v2.definitions.len().cmp(&v1.definitions.len()))
}

pub fn sort_term_dictionary_entries(entries: &mut [TermDictionaryEntry], collator: &Collator) {
    entries.sort_by(|v1, v2| compare_term_dictionary_entries(v1, v2, collator));
}

pub fn sort_term_dictionary_entry_definitions(definitions: &mut [TermDefinition]) {
    definitions.sort_by(|v1, v2| {
        v1.frequency_order
            .total_cmp(&v2.frequency_order)
            .then_with(|| v1.dictionary_index.cmp(&v2.dictionary_index))
            .then_with(|| v2.score.cmp(&v1.score))
            .then_with(|| v2.headword_indices.len().cmp(&v1.headword_indices.len()))
            .then_with(|| v1.headword_indices.cmp(&v2.headword_indices))
            .then_with(|| v1.index.cmp(&v2.index))
    });
}

pub fn sort_term_dictionary_entries_by_id(entries: &mut [TermDictionaryEntry]) {
    if entries.len() <= 1 {
        return;
    }
    entries.sort_by_key(|entry| entry.definitions.first().map_or(0, |d| d.id));
}

/// Shared shape of frequencies and pronunciations.
pub trait HeadwordData {
    fn headword_index(&self) -> usize;
    fn dictionary_index(&self) -> usize;
    fn index(&self) -> usize;
}

impl HeadwordData for TermFrequency {
    fn headword_index(&self) -> usize {
        self.headword_index
    }
    fn dictionary_index(&self) -> usize {
        self.dictionary_index
    }
    fn index(&self) -> usize {
        self.index
    }
}

impl HeadwordData for TermPronunciation {
    fn headword_index(&self) -> usize {
        self.headword_index
    }
    fn dictionary_index(&self) -> usize {
        self.dictionary_index
    }
    fn index(&self) -> usize {
        self.index
    }
}

pub fn sort_term_dictionary_entry_simple_data<T: HeadwordData>(data: &mut [T]) {
    data.sort_by_key(|v| (v.headword_index(), v.dictionary_index(), v.index()));
}

pub fn sort_kanji_dictionary_entries(entries: &mut [KanjiDictionaryEntry]) {
    entries.sort_by_key(|entry| entry.dictionary_index);
}

pub fn sort_kanji_dictionary_entry_data(entries: &mut [KanjiDictionaryEntry]) {
    for entry in entries {
        entry
            .frequencies
            .sort_by_key(|frequency| (frequency.dictionary_index, frequency.index));
    }
}

pub fn sort_kanji_stats(stats: &mut [KanjiStat], collator: &Collator) {
    if stats.len() <= 1 {
        return;
    }
    stats.sort_by(|v1, v2| {
        v1.order
            .cmp(&v2.order)
            .then_with(|| collator.compare(&v1.content, &v2.content))
    });
}

fn frequency_order(min: f64, max: f64, ascending: bool) -> f64 {
    match (min <= max, ascending) {
        (true, true) => min,
        (true, false) => -max,
        (false, true) => MAX_SAFE_INTEGER,
        (false, false) => 0.0,
    }
}

/// Sets `frequency_order` on every entry and definition from the
/// frequencies of `dictionary`.
pub fn update_sort_frequencies(
    entries: &mut [TermDictionaryEntry],
    dictionary: &str,
    ascending: bool,
) {
    for entry in entries {
        let mut frequency_map: Vec<(usize, f64)> = Vec::new();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for item in entry.frequencies.iter().filter(|f| f.dictionary == dictionary) {
            match frequency_map
                .iter_mut()
                .find(|(index, _)| *index == item.headword_index)
            {
                Some(slot) => slot.1 = item.frequency,
                None => frequency_map.push((item.headword_index, item.frequency)),
            }
            min = min.min(item.frequency);
            max = max.max(item.frequency);
        }
        entry.frequency_order = frequency_order(min, max, ascending);

        for definition in &mut entry.definitions {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for headword_index in &definition.headword_indices {
                if let Some((_, frequency)) = frequency_map
                    .iter()
                    .find(|(index, _)| index == headword_index)
                {
                    min = min.min(*frequency);
                    max = max.max(*frequency);
                }
            }
            definition.frequency_order = frequency_order(min, max, ascending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sentinel_orders() {
        assert_eq!(frequency_order(f64::INFINITY, f64::NEG_INFINITY, true), MAX_SAFE_INTEGER);
        assert_eq!(frequency_order(f64::INFINITY, f64::NEG_INFINITY, false), 0.0);
        assert_eq!(frequency_order(3.0, 9.0, true), 3.0);
        assert_eq!(frequency_order(3.0, 9.0, false), -9.0);
    }

    #[test]
    fn shortest_chains() {
        assert_eq!(get_shortest_text_processing_chain_length(&[]), 0);
        assert_eq!(
            get_shortest_text_processing_chain_length(&[vec!["a".into(), "b".into()], vec!["c".into()]]),
            1
        );
    }
}
