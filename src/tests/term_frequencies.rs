use pretty_assertions::assert_eq;

use crate::{
    dictionary::TermFrequencySimple,
    test_utils::test_translator,
    translator::TermReadingItem,
};

#[test]
fn frequencies_respect_readings() {
    let translator = test_translator();
    let items = [
        TermReadingItem::new("走る", Some("はしる")),
        TermReadingItem::new("走る", Some("そうる")),
        TermReadingItem::new("読む", None),
        TermReadingItem::new("見る", Some("みる")),
    ];
    let frequencies = translator
        .get_term_frequencies(&items, &["JPDB".to_string()])
        .unwrap();

    assert_eq!(
        frequencies,
        vec![
            TermFrequencySimple {
                term: "走る".into(),
                reading: Some("はしる".into()),
                dictionary: "JPDB".into(),
                has_reading: true,
                frequency: 500.0,
                display_value: None,
                display_value_parsed: false,
            },
            TermFrequencySimple {
                term: "読む".into(),
                reading: None,
                dictionary: "JPDB".into(),
                has_reading: false,
                frequency: 1200.0,
                display_value: None,
                display_value_parsed: false,
            },
            TermFrequencySimple {
                term: "見る".into(),
                reading: Some("みる".into()),
                dictionary: "JPDB".into(),
                has_reading: false,
                frequency: 300.0,
                display_value: Some("300㋕".into()),
                display_value_parsed: false,
            },
        ]
    );
}

#[test]
fn unlisted_dictionaries_are_ignored() {
    let translator = test_translator();
    let frequencies = translator
        .get_term_frequencies(&[TermReadingItem::new("読む", None)], &["NHK".to_string()])
        .unwrap();
    assert_eq!(frequencies, Vec::new());
}
