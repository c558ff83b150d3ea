use fancy_regex::Regex;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dictionary::InflectionRule;
use crate::errors::{ConditionError, LanguageTransformerError};

/// Highest number of leaf conditions one transformer can hold; flags are `u32`.
pub const MAX_CONDITION_FLAGS: u32 = 32;

/// A language's grammar table: grammatical conditions and the rules that move
/// an inflected form back towards its dictionary form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageTransformDescriptor {
    pub language: String,
    pub conditions: IndexMap<String, Condition>,
    pub transforms: IndexMap<String, Transform>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub name: String,
    /// Whether a dictionary's part of speech tag may name this condition.
    #[serde(default)]
    pub is_dictionary_form: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_conditions: Option<Vec<String>>,
}

impl Condition {
    pub fn new(name: &str, is_dictionary_form: bool) -> Self {
        Self {
            name: name.to_string(),
            is_dictionary_form,
            sub_conditions: None,
        }
    }

    pub fn with_sub_conditions(mut self, sub_conditions: &[&str]) -> Self {
        self.sub_conditions = Some(sub_conditions.iter().map(|s| s.to_string()).collect());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rules: Vec<Rule>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleType {
    Suffix,
    Prefix,
    WholeWord,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub inflected: String,
    pub deinflected: String,
    pub conditions_in: Vec<String>,
    pub conditions_out: Vec<String>,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn suffix_inflection(
    inflected_suffix: &str,
    deinflected_suffix: &str,
    conditions_in: &[&str],
    conditions_out: &[&str],
) -> Rule {
    Rule {
        rule_type: RuleType::Suffix,
        inflected: inflected_suffix.to_string(),
        deinflected: deinflected_suffix.to_string(),
        conditions_in: to_strings(conditions_in),
        conditions_out: to_strings(conditions_out),
    }
}

pub fn prefix_inflection(
    inflected_prefix: &str,
    deinflected_prefix: &str,
    conditions_in: &[&str],
    conditions_out: &[&str],
) -> Rule {
    Rule {
        rule_type: RuleType::Prefix,
        inflected: inflected_prefix.to_string(),
        deinflected: deinflected_prefix.to_string(),
        conditions_in: to_strings(conditions_in),
        conditions_out: to_strings(conditions_out),
    }
}

pub fn whole_word_inflection(
    inflected_word: &str,
    deinflected_word: &str,
    conditions_in: &[&str],
    conditions_out: &[&str],
) -> Rule {
    Rule {
        rule_type: RuleType::WholeWord,
        inflected: inflected_word.to_string(),
        deinflected: deinflected_word.to_string(),
        conditions_in: to_strings(conditions_in),
        conditions_out: to_strings(conditions_out),
    }
}

impl Rule {
    fn pattern(&self) -> String {
        let escaped = fancy_regex::escape(&self.inflected);
        match self.rule_type {
            RuleType::Suffix => format!("{escaped}$"),
            RuleType::Prefix => format!("^{escaped}"),
            RuleType::WholeWord => format!("^{escaped}$"),
        }
    }

    pub fn deinflect(&self, text: &str) -> String {
        match self.rule_type {
            RuleType::Suffix => {
                let stem = text.strip_suffix(self.inflected.as_str()).unwrap_or(text);
                format!("{stem}{}", self.deinflected)
            }
            RuleType::Prefix => {
                let rest = text.strip_prefix(self.inflected.as_str()).unwrap_or(text);
                format!("{}{rest}", self.deinflected)
            }
            RuleType::WholeWord => self.deinflected.clone(),
        }
    }
}

#[derive(Clone, Debug)]
struct CompiledRule {
    rule: Rule,
    is_inflected: Regex,
    conditions_in: u32,
    conditions_out: u32,
}

#[derive(Clone, Debug)]
struct CompiledTransform {
    id: String,
    name: String,
    description: Option<String>,
    rules: Vec<CompiledRule>,
    heuristic: Regex,
}

/// One step of a deinflection path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceFrame {
    pub transform: String,
    pub rule_index: usize,
    pub text: String,
}

/// A candidate produced by [`LanguageTransformer::transform`].
///
/// `trace` lists the most recently applied rule first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformedText {
    pub text: String,
    pub conditions: u32,
    pub trace: Vec<TraceFrame>,
}

impl TransformedText {
    pub fn inflection_rules(&self) -> Vec<String> {
        self.trace.iter().map(|frame| frame.transform.clone()).collect()
    }
}

/// Deinflects text with the grammar tables it was given.
#[derive(Clone, Debug, Default)]
pub struct LanguageTransformer {
    next_flag_index: u32,
    transforms: Vec<CompiledTransform>,
    condition_type_to_condition_flags_map: IndexMap<String, u32>,
    part_of_speech_to_condition_flags_map: IndexMap<String, u32>,
}

impl LanguageTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn add_descriptor(
        &mut self,
        descriptor: &LanguageTransformDescriptor,
    ) -> Result<(), LanguageTransformerError> {
        let (condition_flags_map, next_flag_index) =
            Self::get_condition_flags_map(&descriptor.conditions, self.next_flag_index)?;

        let mut transforms = Vec::with_capacity(descriptor.transforms.len());
        for (transform_id, transform) in &descriptor.transforms {
            let mut rules = Vec::with_capacity(transform.rules.len());
            let mut patterns = Vec::with_capacity(transform.rules.len());
            for (index, rule) in transform.rules.iter().enumerate() {
                let conditions_in =
                    Self::get_condition_flags_strict(&condition_flags_map, &rule.conditions_in)
                        .map_err(|source| LanguageTransformerError::InvalidConditions {
                            source,
                            transform_id: transform_id.clone(),
                            index,
                        })?;
                let conditions_out =
                    Self::get_condition_flags_strict(&condition_flags_map, &rule.conditions_out)
                        .map_err(|source| LanguageTransformerError::InvalidConditions {
                            source,
                            transform_id: transform_id.clone(),
                            index,
                        })?;
                let pattern = rule.pattern();
                let is_inflected =
                    Regex::new(&pattern).map_err(|source| LanguageTransformerError::Pattern {
                        source,
                        transform_id: transform_id.clone(),
                    })?;
                patterns.push(pattern);
                rules.push(CompiledRule {
                    rule: rule.clone(),
                    is_inflected,
                    conditions_in,
                    conditions_out,
                });
            }
            let heuristic = Regex::new(&patterns.join("|")).map_err(|source| {
                LanguageTransformerError::Pattern {
                    source,
                    transform_id: transform_id.clone(),
                }
            })?;
            transforms.push(CompiledTransform {
                id: transform_id.clone(),
                name: transform.name.clone(),
                description: transform.description.clone(),
                rules,
                heuristic,
            });
        }

        self.next_flag_index = next_flag_index;
        self.transforms.extend(transforms);

        for (condition_type, condition) in &descriptor.conditions {
            let Some(&flags) = condition_flags_map.get(condition_type) else {
                continue;
            };
            self.condition_type_to_condition_flags_map
                .insert(condition_type.clone(), flags);
            if condition.is_dictionary_form {
                self.part_of_speech_to_condition_flags_map
                    .insert(condition_type.clone(), flags);
            }
        }
        Ok(())
    }

    pub fn get_condition_flags_from_parts_of_speech(&self, parts_of_speech: &[String]) -> u32 {
        Self::get_condition_flags(&self.part_of_speech_to_condition_flags_map, parts_of_speech)
    }

    pub fn get_condition_flags_from_condition_types(&self, condition_types: &[String]) -> u32 {
        Self::get_condition_flags(&self.condition_type_to_condition_flags_map, condition_types)
    }

    pub fn get_condition_flags_from_single_condition_type(&self, condition_type: &str) -> u32 {
        self.condition_type_to_condition_flags_map
            .get(condition_type)
            .copied()
            .unwrap_or(0)
    }

    /// Lazily walks every deinflection path of `source_text`.
    ///
    /// The first item is always the untouched text with no conditions.
    pub fn transform(&self, source_text: &str) -> Transformations<'_> {
        Transformations {
            transformer: self,
            results: vec![TransformedText {
                text: source_text.to_string(),
                conditions: 0,
                trace: Vec::new(),
            }],
            cursor: 0,
        }
    }

    pub fn get_user_facing_inflection_rules(&self, inflection_rules: &[String]) -> Vec<InflectionRule> {
        inflection_rules
            .iter()
            .map(|rule| {
                match self.transforms.iter().find(|transform| &transform.id == rule) {
                    Some(transform) => InflectionRule {
                        name: transform.name.clone(),
                        description: transform.description.clone(),
                    },
                    None => InflectionRule::from_id(rule.as_str()),
                }
            })
            .collect()
    }

    /// If `current_conditions` is `0`, then `next_conditions` is ignored and `true` is returned.
    /// Otherwise, there must be at least one shared condition between the two.
    pub fn conditions_match(current_conditions: u32, next_conditions: u32) -> bool {
        current_conditions == 0 || (current_conditions & next_conditions) != 0
    }

    fn expand(&self, current: &TransformedText, results: &mut Vec<TransformedText>) {
        let text = current.text.as_str();
        for transform in &self.transforms {
            if !is_match(&transform.heuristic, text) {
                continue;
            }
            for (rule_index, compiled) in transform.rules.iter().enumerate() {
                if !Self::conditions_match(current.conditions, compiled.conditions_in) {
                    continue;
                }
                if !is_match(&compiled.is_inflected, text) {
                    continue;
                }
                let is_cycle = current.trace.iter().any(|frame| {
                    frame.transform == transform.id
                        && frame.rule_index == rule_index
                        && frame.text == text
                });
                if is_cycle {
                    log::warn!(
                        "cycle detected in transform[{}] rule[{rule_index}] for text: {text}",
                        transform.id
                    );
                    continue;
                }
                let mut trace = Vec::with_capacity(current.trace.len() + 1);
                trace.push(TraceFrame {
                    transform: transform.id.clone(),
                    rule_index,
                    text: text.to_string(),
                });
                trace.extend(current.trace.iter().cloned());
                results.push(TransformedText {
                    text: compiled.rule.deinflect(text),
                    conditions: compiled.conditions_out,
                    trace,
                });
            }
        }
    }

    fn get_condition_flags_map(
        conditions: &IndexMap<String, Condition>,
        mut next_flag_index: u32,
    ) -> Result<(IndexMap<String, u32>, u32), ConditionError> {
        let mut condition_flags_map: IndexMap<String, u32> = IndexMap::new();
        let mut targets: Vec<(&String, &Condition)> = conditions.iter().collect();
        while !targets.is_empty() {
            let mut next_targets = Vec::new();
            for &(condition_type, condition) in &targets {
                let flags = match &condition.sub_conditions {
                    None => {
                        if next_flag_index >= MAX_CONDITION_FLAGS {
                            return Err(ConditionError::MaxConditions);
                        }
                        let flags = 1u32 << next_flag_index;
                        next_flag_index += 1;
                        flags
                    }
                    Some(sub_conditions) => {
                        match Self::get_condition_flags_strict(&condition_flags_map, sub_conditions)
                        {
                            Ok(flags) => flags,
                            Err(_) => {
                                next_targets.push((condition_type, condition));
                                continue;
                            }
                        }
                    }
                };
                condition_flags_map.insert(condition_type.clone(), flags);
            }
            if next_targets.len() == targets.len() {
                let conditions = next_targets
                    .iter()
                    .map(|(condition_type, _)| condition_type.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(ConditionError::SubRuleCycle { conditions });
            }
            targets = next_targets;
        }
        Ok((condition_flags_map, next_flag_index))
    }

    fn get_condition_flags_strict(
        condition_flags_map: &IndexMap<String, u32>,
        condition_types: &[String],
    ) -> Result<u32, ConditionError> {
        let mut flags = 0;
        for (index, condition_type) in condition_types.iter().enumerate() {
            let Some(flags2) = condition_flags_map.get(condition_type) else {
                return Err(ConditionError::Missing {
                    index,
                    condition: condition_type.clone(),
                });
            };
            flags |= flags2;
        }
        Ok(flags)
    }

    fn get_condition_flags(
        condition_flags_map: &IndexMap<String, u32>,
        condition_types: &[String],
    ) -> u32 {
        condition_types
            .iter()
            .filter_map(|condition_type| condition_flags_map.get(condition_type))
            .fold(0, |flags, flags2| flags | flags2)
    }
}

fn is_match(regex: &Regex, text: &str) -> bool {
    regex.is_match(text).unwrap_or_else(|e| {
        log::warn!("rule pattern {regex} failed on {text:?}: {e}");
        false
    })
}

/// Breadth-first deinflection candidates; see [`LanguageTransformer::transform`].
///
/// A candidate's children are computed when the candidate itself is yielded,
/// so stopping early skips the remaining rule evaluation.
pub struct Transformations<'a> {
    transformer: &'a LanguageTransformer,
    results: Vec<TransformedText>,
    cursor: usize,
}

impl Iterator for Transformations<'_> {
    type Item = TransformedText;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.results.get(self.cursor)?.clone();
        self.cursor += 1;
        self.transformer.expand(&current, &mut self.results);
        Some(current)
    }
}

/// Holds one [`LanguageTransformer`] per language.
#[derive(Clone, Debug, Default)]
pub struct MultiLanguageTransformer {
    language_transformers: IndexMap<String, LanguageTransformer>,
}

impl MultiLanguageTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_descriptor(
        &mut self,
        descriptor: &LanguageTransformDescriptor,
    ) -> Result<(), LanguageTransformerError> {
        let mut transformer = LanguageTransformer::new();
        transformer.add_descriptor(descriptor)?;
        self.language_transformers
            .insert(descriptor.language.clone(), transformer);
        Ok(())
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.language_transformers.contains_key(language)
    }

    pub fn get_condition_flags_from_parts_of_speech(
        &self,
        language: &str,
        parts_of_speech: &[String],
    ) -> u32 {
        self.language_transformers
            .get(language)
            .map_or(0, |lt| lt.get_condition_flags_from_parts_of_speech(parts_of_speech))
    }

    pub fn get_condition_flags_from_condition_types(
        &self,
        language: &str,
        condition_types: &[String],
    ) -> u32 {
        self.language_transformers
            .get(language)
            .map_or(0, |lt| lt.get_condition_flags_from_condition_types(condition_types))
    }

    /// A language without a grammar table only yields the source text itself.
    pub fn transform(&self, language: &str, source_text: &str) -> Vec<TransformedText> {
        match self.language_transformers.get(language) {
            Some(lt) => lt.transform(source_text).collect(),
            None => vec![TransformedText {
                text: source_text.to_string(),
                conditions: 0,
                trace: Vec::new(),
            }],
        }
    }

    pub fn get_user_facing_inflection_rules(
        &self,
        language: &str,
        inflection_rules: &[String],
    ) -> Vec<InflectionRule> {
        match self.language_transformers.get(language) {
            Some(lt) => lt.get_user_facing_inflection_rules(inflection_rules),
            None => inflection_rules
                .iter()
                .map(|rule| InflectionRule::from_id(rule.as_str()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn toy_descriptor() -> LanguageTransformDescriptor {
        LanguageTransformDescriptor {
            language: "toy".to_string(),
            conditions: IndexMap::from([
                (
                    "v".to_string(),
                    Condition::new("Verb", true).with_sub_conditions(&["v1", "v5"]),
                ),
                ("v1".to_string(), Condition::new("Ichidan verb", true)),
                ("v5".to_string(), Condition::new("Godan verb", true)),
                ("-ta".to_string(), Condition::new("Past", false)),
            ]),
            transforms: IndexMap::from([(
                "past".to_string(),
                Transform {
                    name: "past".to_string(),
                    description: Some("Past tense".to_string()),
                    rules: vec![
                        suffix_inflection("った", "る", &["-ta"], &["v5"]),
                        suffix_inflection("た", "る", &["-ta"], &["v1"]),
                    ],
                },
            )]),
        }
    }

    #[test]
    fn sub_conditions_union_their_leaves() {
        let mut lt = LanguageTransformer::new();
        lt.add_descriptor(&toy_descriptor()).unwrap();
        let v1 = lt.get_condition_flags_from_single_condition_type("v1");
        let v5 = lt.get_condition_flags_from_single_condition_type("v5");
        assert_eq!(lt.get_condition_flags_from_single_condition_type("v"), v1 | v5);
        assert_ne!(v1, v5);
        assert_eq!(
            lt.get_condition_flags_from_parts_of_speech(&["v5".to_string(), "unknown".to_string()]),
            v5
        );
        // not a dictionary form
        assert_eq!(lt.get_condition_flags_from_parts_of_speech(&["-ta".to_string()]), 0);
    }

    #[test]
    fn transform_yields_source_first_then_candidates() {
        let mut lt = LanguageTransformer::new();
        lt.add_descriptor(&toy_descriptor()).unwrap();
        let results: Vec<TransformedText> = lt.transform("走った").collect();
        assert_eq!(results[0].text, "走った");
        assert_eq!(results[0].conditions, 0);
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["走った", "走る", "走っる"]);
        assert_eq!(results[1].inflection_rules(), vec!["past".to_string()]);
        assert_eq!(
            results[1].conditions,
            lt.get_condition_flags_from_single_condition_type("v5")
        );
    }

    #[test]
    fn unknown_condition_is_rejected() {
        let mut descriptor = toy_descriptor();
        descriptor.transforms["past"]
            .rules
            .push(suffix_inflection("だ", "ぶ", &["-ta"], &["v9"]));
        let err = LanguageTransformer::new().add_descriptor(&descriptor).unwrap_err();
        assert!(matches!(
            err,
            LanguageTransformerError::InvalidConditions { index: 2, .. }
        ));
    }

    #[test]
    fn sub_condition_cycle_is_rejected() {
        let descriptor = LanguageTransformDescriptor {
            language: "toy".to_string(),
            conditions: IndexMap::from([
                ("a".to_string(), Condition::new("a", true).with_sub_conditions(&["b"])),
                ("b".to_string(), Condition::new("b", true).with_sub_conditions(&["a"])),
            ]),
            transforms: IndexMap::new(),
        };
        let err = LanguageTransformer::new().add_descriptor(&descriptor).unwrap_err();
        assert!(matches!(
            err,
            LanguageTransformerError::ConditionsFlagMap(ConditionError::SubRuleCycle { .. })
        ));
    }

    #[test]
    fn too_many_conditions() {
        let conditions = (0..33)
            .map(|i| (format!("c{i}"), Condition::new("c", true)))
            .collect();
        let descriptor = LanguageTransformDescriptor {
            language: "toy".to_string(),
            conditions,
            transforms: IndexMap::new(),
        };
        let err = LanguageTransformer::new().add_descriptor(&descriptor).unwrap_err();
        assert!(matches!(
            err,
            LanguageTransformerError::ConditionsFlagMap(ConditionError::MaxConditions)
        ));
    }

    #[test]
    fn self_feeding_rule_stops_on_cycle() {
        let descriptor = LanguageTransformDescriptor {
            language: "toy".to_string(),
            conditions: IndexMap::from([("x".to_string(), Condition::new("x", true))]),
            transforms: IndexMap::from([(
                "noop".to_string(),
                Transform {
                    name: "noop".to_string(),
                    description: None,
                    rules: vec![suffix_inflection("a", "a", &["x"], &["x"])],
                },
            )]),
        };
        let mut lt = LanguageTransformer::new();
        lt.add_descriptor(&descriptor).unwrap();
        let results: Vec<TransformedText> = lt.transform("ba").collect();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn user_facing_rules() {
        let mut mlt = MultiLanguageTransformer::new();
        mlt.add_descriptor(&toy_descriptor()).unwrap();
        let rules = mlt.get_user_facing_inflection_rules(
            "toy",
            &["past".to_string(), "mystery".to_string()],
        );
        assert_eq!(
            rules,
            vec![
                InflectionRule {
                    name: "past".to_string(),
                    description: Some("Past tense".to_string()),
                },
                InflectionRule::from_id("mystery"),
            ]
        );
        assert_eq!(mlt.transform("zz", "abc").len(), 1);
    }

    #[test]
    fn descriptor_from_json() {
        let descriptor: LanguageTransformDescriptor = serde_json::from_str(
            r#"{
                "language": "toy",
                "conditions": {"v": {"name": "Verb", "isDictionaryForm": true}},
                "transforms": {
                    "un-": {
                        "name": "un-",
                        "rules": [{"type": "prefix", "inflected": "un", "deinflected": "", "conditionsIn": ["v"], "conditionsOut": ["v"]}]
                    }
                }
            }"#,
        )
        .unwrap();
        let mut lt = LanguageTransformer::new();
        lt.add_descriptor(&descriptor).unwrap();
        let texts: Vec<String> = lt.transform("undo").map(|t| t.text).collect();
        assert_eq!(texts, vec!["undo".to_string(), "do".to_string()]);
    }
}
