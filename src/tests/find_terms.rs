use std::sync::Arc;

use indexmap::IndexSet;
use pretty_assertions::assert_eq;

use crate::{
    dictionary::{InflectionSource, Pronunciation, TermDictionaryEntry, TermSourceMatchSource},
    dictionary_data::{NumOrStr, TermGlossaryContent},
    errors::TranslatorError,
    test_utils::{term_options, test_translator, TEST_DB},
    translation::{FindTermsMode, FindTermsOptions, FindTermsSortOrder, FindTermsTextReplacement},
    translator::{tag_aggregator::TagAggregator, Translator},
};

fn chains(entry: &TermDictionaryEntry) -> Vec<(InflectionSource, Vec<String>)> {
    entry
        .inflection_rule_chain_candidates
        .iter()
        .map(|candidate| {
            (
                candidate.source,
                candidate
                    .inflection_rules
                    .iter()
                    .map(|rule| rule.name.clone())
                    .collect(),
            )
        })
        .collect()
}

fn glosses(entry: &TermDictionaryEntry) -> Vec<Vec<TermGlossaryContent>> {
    entry
        .definitions
        .iter()
        .map(|definition| definition.entries.clone())
        .collect()
}

fn text(s: &str) -> TermGlossaryContent {
    TermGlossaryContent::Text(s.to_string())
}

fn merge_options() -> FindTermsOptions {
    let mut options = term_options(&["JMdict", "Jitendex", "JPDB", "NHK"]);
    options.main_dictionary = "JMdict".to_string();
    if let Some(jitendex) = options.enabled_dictionary_map.get_mut("Jitendex") {
        jitendex.allow_secondary_searches = true;
    }
    options
}

#[test]
fn past_tense_deinflects_to_dictionary_form() {
    let translator = test_translator();
    let result = translator
        .find_terms(FindTermsMode::Group, "走った", &term_options(&["JMdict"]))
        .unwrap();

    assert_eq!(result.original_text_length, 3);
    assert_eq!(result.dictionary_entries.len(), 1);
    let entry = &result.dictionary_entries[0];
    assert_eq!(entry.headwords[0].term, "走る");
    assert_eq!(entry.headwords[0].reading, "はしる");
    assert_eq!(entry.headwords[0].sources[0].original_text, "走った");
    assert_eq!(entry.headwords[0].sources[0].deinflected_text, "走る");
    assert!(chains(entry).contains(&(InflectionSource::Algorithm, vec!["-た".to_string()])));
    assert_eq!(
        glosses(entry),
        vec![vec![text("to run")], vec![text("to travel (of vehicles)")]]
    );
}

#[test]
fn exact_lookup_without_deinflection() {
    let translator = test_translator();
    let mut options = term_options(&["JMdict"]);
    options.deinflect = false;
    let result = translator
        .find_terms(FindTermsMode::Simple, "走る", &options)
        .unwrap();

    assert_eq!(result.original_text_length, 2);
    assert_eq!(result.dictionary_entries.len(), 2);
    for entry in &result.dictionary_entries {
        assert_eq!(entry.headwords[0].term, "走る");
        assert_eq!(entry.inflection_rule_chain_candidates, Vec::new());
    }
    // nothing shorter than the whole text is looked up
    let result = translator
        .find_terms(FindTermsMode::Simple, "走るよ", &options)
        .unwrap();
    assert_eq!(result.dictionary_entries, Vec::new());
}

#[test]
fn uninflected_text_has_empty_chain() {
    let translator = test_translator();
    let result = translator
        .find_terms(FindTermsMode::Split, "読む", &term_options(&["JMdict"]))
        .unwrap();

    assert_eq!(result.dictionary_entries.len(), 1);
    let entry = &result.dictionary_entries[0];
    assert!(chains(entry).contains(&(InflectionSource::Algorithm, Vec::new())));
    assert!(entry
        .text_processor_rule_chain_candidates
        .contains(&Vec::new()));
    let source = &entry.headwords[0].sources[0];
    assert_eq!(source.deinflected_text, "読む");
    assert_eq!(source.match_source, TermSourceMatchSource::Term);
    assert!(source.is_primary);
    assert_eq!(entry.source_term_exact_match_count, 1);
}

#[test]
fn longest_transformed_text_wins() {
    // "見" deinflects to "見る" as well, but only covers one character
    let translator = test_translator();
    let result = translator
        .find_terms(FindTermsMode::Split, "見る", &term_options(&["JMdict"]))
        .unwrap();

    assert_eq!(result.original_text_length, 2);
    assert_eq!(result.dictionary_entries.len(), 1);
    let entry = &result.dictionary_entries[0];
    assert_eq!(entry.headwords[0].sources.len(), 1);
    assert_eq!(entry.headwords[0].sources[0].transformed_text, "見る");
    assert_eq!(entry.max_original_text_length, 2);
}

#[test]
fn equal_length_candidates_merge_chains() {
    let translator = test_translator();
    let result = translator
        .find_terms(
            FindTermsMode::Group,
            "走った",
            &term_options(&["JMdict", "FormOf"]),
        )
        .unwrap();

    assert_eq!(result.dictionary_entries.len(), 1);
    let entry_chains = chains(&result.dictionary_entries[0]);
    assert!(entry_chains.contains(&(InflectionSource::Both, vec!["-た".to_string()])));
    assert!(!entry_chains.contains(&(InflectionSource::Algorithm, vec!["-た".to_string()])));
    assert!(!entry_chains.contains(&(InflectionSource::Dictionary, vec!["-た".to_string()])));
}

#[test]
fn form_of_rows_are_not_entries() {
    let translator = test_translator();
    let result = translator
        .find_terms(FindTermsMode::Split, "走った", &term_options(&["FormOf"]))
        .unwrap();
    assert_eq!(result.dictionary_entries, Vec::new());
    assert_eq!(result.original_text_length, 0);
}

#[test]
fn merge_mode_folds_sequence_and_secondary_rows() {
    let translator = test_translator();
    let options = merge_options();
    let merged = translator
        .find_terms(FindTermsMode::Merge, "走る", &options)
        .unwrap();

    assert_eq!(merged.dictionary_entries.len(), 1);
    let entry = &merged.dictionary_entries[0];
    assert_eq!(entry.headwords.len(), 1);
    assert_eq!(entry.dictionary_alias, "");
    let dictionaries: Vec<&str> = entry
        .definitions
        .iter()
        .map(|definition| definition.dictionary.as_str())
        .collect();
    assert_eq!(dictionaries, vec!["JMdict", "JMdict", "Jitendex"]);
    assert_eq!(entry.definitions[0].sequences, vec![1000]);

    let grouped = translator
        .find_terms(FindTermsMode::Group, "走る", &options)
        .unwrap();
    let merged_ids: IndexSet<u64> = merged
        .dictionary_entries
        .iter()
        .flat_map(|entry| entry.definitions.iter().map(|d| d.id))
        .collect();
    for entry in &grouped.dictionary_entries {
        for definition in &entry.definitions {
            assert!(merged_ids.contains(&definition.id));
        }
    }
}

#[test]
fn ranking_is_deterministic() {
    let translator = test_translator();
    let options = merge_options();
    let first = translator
        .find_terms(FindTermsMode::Merge, "走った", &options)
        .unwrap();
    let second = translator
        .find_terms(FindTermsMode::Merge, "走った", &options)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn regrouping_grouped_entries_changes_nothing() {
    let translator = test_translator();
    let options = term_options(&["JMdict", "Jitendex"]);
    let grouped = translator
        .find_terms(FindTermsMode::Group, "走る", &options)
        .unwrap()
        .dictionary_entries;

    let mut tag_aggregator = TagAggregator::new();
    let regrouped = translator.group_dictionary_entries_by_headword(
        "ja",
        grouped.clone(),
        &mut tag_aggregator,
        "",
    );
    assert_eq!(regrouped.len(), grouped.len());
    assert_eq!(
        regrouped.iter().map(glosses).collect::<Vec<_>>(),
        grouped.iter().map(glosses).collect::<Vec<_>>()
    );
}

#[test]
fn excluded_dictionary_definitions_are_removed() {
    let translator = test_translator();
    let mut options = term_options(&["JMdict", "Jitendex"]);
    options.exclude_dictionary_definitions = Some(IndexSet::from(["JMdict".to_string()]));
    let result = translator
        .find_terms(FindTermsMode::Group, "走る", &options)
        .unwrap();

    assert_eq!(result.dictionary_entries.len(), 1);
    let entry = &result.dictionary_entries[0];
    assert_eq!(glosses(entry), vec![vec![text("to run; to dash")]]);
    assert_eq!(entry.headwords.len(), 1);
    // the "P" tag came only from JMdict
    assert_eq!(entry.headwords[0].tags, Vec::new());

    options.exclude_dictionary_definitions = Some(IndexSet::from([
        "JMdict".to_string(),
        "Jitendex".to_string(),
    ]));
    let result = translator
        .find_terms(FindTermsMode::Group, "走る", &options)
        .unwrap();
    assert_eq!(result.dictionary_entries, Vec::new());
}

#[test]
fn excluding_main_dictionary_after_merge() {
    let translator = test_translator();
    let mut options = merge_options();
    options.exclude_dictionary_definitions = Some(IndexSet::from(["JMdict".to_string()]));
    let result = translator
        .find_terms(FindTermsMode::Merge, "走る", &options)
        .unwrap();

    assert_eq!(result.dictionary_entries.len(), 1);
    let entry = &result.dictionary_entries[0];
    assert_eq!(glosses(entry), vec![vec![text("to run; to dash")]]);
    assert_eq!(entry.headwords.len(), 1);
    assert_eq!(entry.definitions[0].headword_indices, vec![0]);
    assert!(entry
        .definitions
        .iter()
        .all(|definition| definition.dictionary != "JMdict"));
}

#[test]
fn tags_frequencies_and_pitch_are_attached() {
    let translator = test_translator();
    let result = translator
        .find_terms(
            FindTermsMode::Group,
            "走る",
            &term_options(&["JMdict", "JPDB", "NHK"]),
        )
        .unwrap();
    let entry = &result.dictionary_entries[0];

    let headword_tags: Vec<(&str, &str)> = entry.headwords[0]
        .tags
        .iter()
        .map(|tag| (tag.name.as_str(), tag.category.as_str()))
        .collect();
    assert_eq!(headword_tags, vec![("P", "popular")]);

    let first_tag = &entry.definitions[0].tags[0];
    assert_eq!(first_tag.name, "v5");
    assert_eq!(first_tag.category, "partOfSpeech");
    assert_eq!(first_tag.content, vec!["Godan verb".to_string()]);
    assert!(!first_tag.redundant);
    assert!(entry.definitions[1].tags[0].redundant);

    assert_eq!(entry.frequencies.len(), 1);
    let frequency = &entry.frequencies[0];
    assert_eq!(frequency.dictionary, "JPDB");
    assert_eq!(frequency.frequency, 500.0);
    assert!(frequency.has_reading);
    assert_eq!(frequency.headword_index, 0);

    assert_eq!(entry.pronunciations.len(), 1);
    assert_eq!(entry.pronunciations[0].dictionary, "NHK");
    let Pronunciation::PitchAccent { position, tags, .. } =
        &entry.pronunciations[0].pronunciations[0]
    else {
        panic!("expected a pitch accent");
    };
    assert_eq!(position, &NumOrStr::Num(2.into()));
    // NHK ships no tag bank
    assert_eq!(tags[0].name, "v5");
    assert_eq!(tags[0].category, "default");
}

#[test]
fn simple_mode_sorts_by_frequency_without_tags() {
    let translator = test_translator();
    let mut options = term_options(&["JMdict", "JPDB"]);
    options.sort_frequency_dictionary = Some("JPDB".to_string());
    options.sort_frequency_dictionary_order = FindTermsSortOrder::Ascending;
    let result = translator
        .find_terms(FindTermsMode::Simple, "走る", &options)
        .unwrap();

    assert_eq!(result.dictionary_entries.len(), 2);
    for entry in &result.dictionary_entries {
        assert_eq!(entry.frequency_order, 500.0);
        assert_eq!(entry.headwords[0].tags, Vec::new());
    }
    assert_eq!(result.dictionary_entries[0].score, 100);
}

#[test]
fn katakana_input_matches_by_reading() {
    let translator = test_translator();
    let result = translator
        .find_terms(FindTermsMode::Group, "ヨム", &term_options(&["JMdict"]))
        .unwrap();

    assert_eq!(result.dictionary_entries.len(), 1);
    let entry = &result.dictionary_entries[0];
    assert_eq!(entry.headwords[0].term, "読む");
    assert_eq!(entry.headwords[0].sources[0].match_source, TermSourceMatchSource::Reading);
    assert_eq!(entry.source_term_exact_match_count, 0);
    assert!(entry
        .text_processor_rule_chain_candidates
        .iter()
        .any(|chain| chain.contains(&"convertHiraganaToKatakana".to_string())));
}

#[test]
fn romaji_input_matches_by_reading() {
    let translator = test_translator();
    let result = translator
        .find_terms(FindTermsMode::Group, "hashiru", &term_options(&["JMdict"]))
        .unwrap();

    assert_eq!(result.original_text_length, 7);
    let entry = &result.dictionary_entries[0];
    assert_eq!(entry.headwords[0].term, "走る");
    assert_eq!(entry.headwords[0].reading, "はしる");
    assert_eq!(entry.headwords[0].sources[0].match_source, TermSourceMatchSource::Reading);
    assert!(entry
        .text_processor_rule_chain_candidates
        .contains(&vec!["alphabeticToHiragana".to_string()]));
}

#[test]
fn text_replacements_seed_lookups() {
    let translator = test_translator();
    let mut options = term_options(&["JMdict"]);
    options.text_replacements = vec![Some(vec![FindTermsTextReplacement {
        pattern: fancy_regex::Regex::new("x").unwrap(),
        replacement: String::new(),
        is_global: true,
    }])];
    let result = translator
        .find_terms(FindTermsMode::Group, "読xむ", &options)
        .unwrap();

    assert_eq!(result.original_text_length, 3);
    assert_eq!(result.dictionary_entries.len(), 1);
    assert_eq!(result.dictionary_entries[0].headwords[0].term, "読む");
    assert!(result.dictionary_entries[0]
        .text_processor_rule_chain_candidates
        .iter()
        .any(|chain| chain.first().map(String::as_str) == Some("Text Replacement 0")));
}

#[test]
fn empty_and_unsupported_inputs() {
    let translator = test_translator();

    let mut options = term_options(&["JMdict"]);
    options.remove_non_japanese_characters = true;
    let result = translator
        .find_terms(FindTermsMode::Group, "abc", &options)
        .unwrap();
    assert_eq!(result.dictionary_entries, Vec::new());
    assert_eq!(result.original_text_length, 0);

    let mut options = term_options(&["JMdict"]);
    options.language = "xx".to_string();
    assert!(translator
        .find_terms(FindTermsMode::Group, "", &options)
        .unwrap()
        .dictionary_entries
        .is_empty());
    assert!(matches!(
        translator.find_terms(FindTermsMode::Group, "走る", &options),
        Err(TranslatorError::UnsupportedLanguage(language)) if language == "xx"
    ));
}

#[test]
fn tag_cache_is_shared_and_clearable() {
    let translator = test_translator();
    translator
        .find_terms(FindTermsMode::Group, "走る", &term_options(&["JMdict"]))
        .unwrap();
    assert!(!translator.tag_cache().is_empty());

    let other = Translator::with_tag_cache(TEST_DB.clone(), Arc::clone(translator.tag_cache()))
        .unwrap();
    assert!(Arc::ptr_eq(translator.tag_cache(), other.tag_cache()));

    other.clear_database_caches();
    assert!(translator.tag_cache().is_empty());
}
