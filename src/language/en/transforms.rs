use indexmap::IndexMap;
use std::sync::LazyLock;

use crate::language::transformer::{
    prefix_inflection, suffix_inflection, Condition, LanguageTransformDescriptor, Rule, Transform,
};

fn doubled_consonant_inflection(
    consonants: &str,
    suffix: &str,
    conditions_in: &[&str],
    conditions_out: &[&str],
) -> Vec<Rule> {
    consonants
        .chars()
        .map(|c| {
            suffix_inflection(
                &format!("{c}{c}{suffix}"),
                &c.to_string(),
                conditions_in,
                conditions_out,
            )
        })
        .collect()
}

fn transform(name: &str, description: &str, rules: Vec<Rule>) -> (String, Transform) {
    (
        name.to_string(),
        Transform {
            name: name.to_string(),
            description: Some(description.to_string()),
            rules,
        },
    )
}

fn conditions() -> IndexMap<String, Condition> {
    IndexMap::from([
        ("v".to_string(), Condition::new("Verb", true)),
        (
            "n".to_string(),
            Condition::new("Noun", true).with_sub_conditions(&["np", "ns"]),
        ),
        ("np".to_string(), Condition::new("Noun plural", true)),
        ("ns".to_string(), Condition::new("Noun singular", true)),
        ("adj".to_string(), Condition::new("Adjective", true)),
        ("adv".to_string(), Condition::new("Adverb", true)),
    ])
}

fn transforms() -> IndexMap<String, Transform> {
    let s = suffix_inflection;
    let v = &["v"][..];
    let adj = &["adj"][..];

    let mut past = vec![
        s("ed", "", v, v),
        s("ed", "e", v, v),
        s("ied", "y", v, v),
        s("cked", "c", v, v),
    ];
    past.extend(doubled_consonant_inflection("bdgklmnprstz", "ed", v, v));
    past.extend([
        s("laid", "lay", v, v),
        s("paid", "pay", v, v),
        s("said", "say", v, v),
    ]);

    let mut ing = vec![
        s("ing", "", v, v),
        s("ing", "e", v, v),
        s("ying", "ie", v, v),
        s("cking", "c", v, v),
    ];
    ing.extend(doubled_consonant_inflection("bdgklmnprstz", "ing", v, v));

    let mut comparative = vec![s("er", "", adj, adj), s("er", "e", adj, adj), s("ier", "y", adj, adj)];
    comparative.extend(doubled_consonant_inflection("bdgmnt", "er", adj, adj));

    let mut superlative = vec![s("est", "", adj, adj), s("est", "e", adj, adj), s("iest", "y", adj, adj)];
    superlative.extend(doubled_consonant_inflection("bdgmnt", "est", adj, adj));

    IndexMap::from([
        transform(
            "plural",
            "Plural form of a noun",
            vec![
                s("s", "", &["np"], &["ns"]),
                s("es", "", &["np"], &["ns"]),
                s("ies", "y", &["np"], &["ns"]),
                s("ves", "fe", &["np"], &["ns"]),
                s("ves", "f", &["np"], &["ns"]),
            ],
        ),
        transform(
            "possessive",
            "Possessive form of a noun",
            vec![s("'s", "", &["n"], &["n"]), s("s'", "s", &["n"], &["n"])],
        ),
        transform("past", "Simple past tense of a verb", past),
        transform("ing", "Present participle of a verb", ing),
        transform(
            "3rd pers. sing. pres",
            "Third person singular present tense of a verb",
            vec![s("s", "", v, v), s("es", "", v, v), s("ies", "y", v, v)],
        ),
        transform("archaic", "Archaic form of a word", vec![s("'d", "ed", v, v)]),
        transform(
            "adverb",
            "Adverb form of an adjective",
            vec![
                s("ly", "", &["adv"], adj),
                s("ily", "y", &["adv"], adj),
                s("ly", "le", &["adv"], adj),
            ],
        ),
        transform("comparative", "Comparative form of an adjective", comparative),
        transform("superlative", "Superlative form of an adjective", superlative),
        transform(
            "dropped g",
            "Dropped g in -ing form of a verb",
            vec![s("in'", "ing", v, v)],
        ),
        transform(
            "un-",
            "Negative form of an adjective, adverb, or verb",
            vec![prefix_inflection(
                "un",
                "",
                &["adj", "adv", "v"],
                &["adj", "adv", "v"],
            )],
        ),
        transform(
            "will future",
            "Will-future tense of a verb",
            vec![prefix_inflection("will ", "", v, v)],
        ),
    ])
}

pub static ENGLISH_TRANSFORMS: LazyLock<LanguageTransformDescriptor> =
    LazyLock::new(|| LanguageTransformDescriptor {
        language: "en".to_string(),
        conditions: conditions(),
        transforms: transforms(),
    });

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::transformer::LanguageTransformer;

    fn reaches(source: &str, term: &str, reasons: &[&str]) -> bool {
        let mut lt = LanguageTransformer::new();
        lt.add_descriptor(&ENGLISH_TRANSFORMS).unwrap();
        let found = lt
            .transform(source)
            .any(|t| t.text == term && t.inflection_rules() == reasons);
        found
    }

    #[test]
    fn english_paths() {
        assert!(reaches("walked", "walk", &["past"]));
        assert!(reaches("stopped", "stop", &["past"]));
        assert!(reaches("happiest", "happy", &["superlative"]));
        assert!(reaches("unhappily", "happy", &["adverb", "un-"]));
        assert!(reaches("cats", "cat", &["plural"]));
    }
}
