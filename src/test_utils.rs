use std::sync::LazyLock;

use crate::{
    database::InMemoryDictionaryDatabase,
    translation::{
        FindKanjiDictionary, FindKanjiOptions, FindTermDictionary, FindTermsOptions,
        KanjiEnabledDictionaryMap, TermEnabledDictionaryMap,
    },
    translator::Translator,
};

pub(crate) const JMDICT: &str = r#"{
    "terms": [
        ["走る", "はしる", "v5", "v5", 100, ["to run"], 1000, "P"],
        ["走る", "はしる", "v5", "v5", 90, ["to travel (of vehicles)"], 1000, ""],
        ["読む", "よむ", "v5", "v5", 100, ["to read"], 2000, "P"],
        ["見る", "みる", "v1", "v1", 100, ["to see"], 3000, "P"]
    ],
    "tags": [
        ["P", "popular", -10, "popular term", 10],
        ["v5", "partOfSpeech", -3, "Godan verb", 0],
        ["v1", "partOfSpeech", -3, "Ichidan verb", 0]
    ]
}"#;

pub(crate) const JITENDEX: &str = r#"{
    "terms": [
        ["走る", "はしる", "", "v5", 0, ["to run; to dash"], 0, ""]
    ]
}"#;

/// A dictionary that only ships a `formOf` cross reference.
pub(crate) const FORM_OF: &str = r#"{
    "terms": [
        ["走った", "", "", "", 0, [["走る", ["-た"]]], 0, ""]
    ]
}"#;

pub(crate) const JPDB: &str = r#"{
    "term_meta": [
        ["走る", "freq", {"reading": "はしる", "frequency": 500}],
        ["読む", "freq", 1200],
        ["見る", "freq", {"value": 300, "displayValue": "300㋕"}]
    ]
}"#;

pub(crate) const NHK: &str = r#"{
    "term_meta": [
        ["走る", "pitch", {"reading": "はしる", "pitches": [{"position": 2, "tags": ["v5"]}]}]
    ]
}"#;

pub(crate) const KANJIDIC: &str = r#"{
    "kanji": [
        ["走", "ソウ", "はし.る", "jouyou", ["run"], {"strokes": "7", "grade": "2", "rank": 1.5}]
    ],
    "kanji_meta": [
        ["走", "freq", 300]
    ],
    "tags": [
        ["jouyou", "frequent", 0, "included in list of regular-use characters", 0],
        ["grade", "misc", 0, "school grade level", 0],
        ["strokes", "misc", 0, "stroke count", 0],
        ["rank", "", 0, "corpus rank", 0]
    ]
}"#;

/// Every fixture dictionary, installed once and cloned per test.
pub(crate) static TEST_DB: LazyLock<InMemoryDictionaryDatabase> = LazyLock::new(|| {
    let mut db = InMemoryDictionaryDatabase::new();
    for (name, json) in [
        ("JMdict", JMDICT),
        ("Jitendex", JITENDEX),
        ("FormOf", FORM_OF),
        ("JPDB", JPDB),
        ("NHK", NHK),
        ("KANJIDIC", KANJIDIC),
    ] {
        db.add_dictionary_json(name, json).unwrap();
    }
    db
});

pub(crate) fn test_translator() -> Translator<InMemoryDictionaryDatabase> {
    Translator::new(TEST_DB.clone()).unwrap()
}

/// Enables `names` in priority order.
pub(crate) fn enabled_terms(names: &[&str]) -> TermEnabledDictionaryMap {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            (
                name.to_string(),
                FindTermDictionary {
                    index,
                    ..Default::default()
                },
            )
        })
        .collect()
}

pub(crate) fn term_options(names: &[&str]) -> FindTermsOptions {
    FindTermsOptions {
        enabled_dictionary_map: enabled_terms(names),
        ..Default::default()
    }
}

pub(crate) fn kanji_options(names: &[&str]) -> FindKanjiOptions {
    let enabled_dictionary_map: KanjiEnabledDictionaryMap = names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            (
                name.to_string(),
                FindKanjiDictionary {
                    index,
                    alias: String::new(),
                },
            )
        })
        .collect();
    FindKanjiOptions {
        enabled_dictionary_map,
        ..Default::default()
    }
}
