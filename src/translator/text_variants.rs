use std::sync::LazyLock;

use fancy_regex::Regex;

use crate::{
    database::DictionaryDatabase,
    dictionary::{InflectionRule, InflectionRuleChainCandidate, InflectionSource},
    errors::{RegexReplaceError, TranslatorError},
    language::{
        cjk_utils::{is_code_point_chinese, is_code_point_korean},
        ja::japanese::is_code_point_japanese,
        language_d::{TextProcessorSetting, TextProcessorWithId},
    },
    regex_util::apply_text_replacement,
    translation::{FindTermsOptions, FindTermsTextReplacement, SearchResolution},
    translation_internal::{
        DatabaseDeinflection, TextCache, TextProcessorRuleChainCandidate,
        VariantAndTextProcessorRuleChainCandidatesMap,
    },
};

use super::Translator;

static GET_NEXT_SUBSTRING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}][\p{L}\p{N}]*$").unwrap());

impl<D: DictionaryDatabase> Translator<D> {
    /// Every (substring, text variant, deinflection) candidate of `text`,
    /// longest substring first.
    pub(crate) fn get_algorithm_deinflections(
        &self,
        text: &str,
        options: &FindTermsOptions,
    ) -> Result<Vec<DatabaseDeinflection>, TranslatorError> {
        let language = options.language.as_str();
        let descriptor = self
            .languages
            .get(language)
            .ok_or_else(|| TranslatorError::UnsupportedLanguage(language.to_string()))?;

        let mut deinflections = Vec::new();
        let mut source_cache = TextCache::default();

        let mut raw_source = text.to_string();
        while !raw_source.is_empty() {
            let preprocessed_text_variants = get_text_variants(
                &raw_source,
                &descriptor.text_preprocessors,
                &options.text_replacements,
                &mut source_cache,
            )?;

            for (source, preprocessor_rule_chain_candidates) in &preprocessed_text_variants {
                for deinflection in self.mlt.transform(language, source) {
                    let postprocessed_text_variants = get_text_variants(
                        &deinflection.text,
                        &descriptor.text_postprocessors,
                        &[],
                        &mut source_cache,
                    )?;
                    for (transformed_text, postprocessor_rule_chain_candidates) in
                        postprocessed_text_variants
                    {
                        let inflection_rule_chain_candidate = InflectionRuleChainCandidate {
                            source: InflectionSource::Algorithm,
                            inflection_rules: deinflection
                                .trace
                                .iter()
                                .map(|frame| InflectionRule::from_id(frame.transform.as_str()))
                                .collect(),
                        };

                        // every combination of pre- and postprocessor chains
                        let text_processor_rule_chain_candidates: Vec<
                            TextProcessorRuleChainCandidate,
                        > = preprocessor_rule_chain_candidates
                            .iter()
                            .flat_map(|pre| {
                                postprocessor_rule_chain_candidates.iter().map(move |post| {
                                    pre.iter().chain(post).cloned().collect::<Vec<_>>()
                                })
                            })
                            .collect();

                        deinflections.push(DatabaseDeinflection::new(
                            raw_source.as_str(),
                            source.as_str(),
                            transformed_text,
                            deinflection.conditions,
                            text_processor_rule_chain_candidates,
                            vec![inflection_rule_chain_candidate],
                        ));
                    }
                }
            }
            raw_source = get_next_substring(options.search_resolution, &raw_source).to_string();
        }
        log::debug!(
            "{} deinflection candidates for {text:?}",
            deinflections.len()
        );
        Ok(deinflections)
    }
}

/// Runs every processor over every variant with each of its settings.
///
/// Each distinct output is kept with the chains of processor ids that produce
/// it; a processor that leaves a variant unchanged adds nothing to its chain.
pub fn get_text_variants(
    text: &str,
    text_processors: &[TextProcessorWithId],
    text_replacements: &[Option<Vec<FindTermsTextReplacement>>],
    text_cache: &mut TextCache,
) -> Result<VariantAndTextProcessorRuleChainCandidatesMap, RegexReplaceError> {
    let mut variants_map = VariantAndTextProcessorRuleChainCandidatesMap::new();
    variants_map.insert(text.to_string(), vec![Vec::new()]);

    for (id, text_replacement) in text_replacements.iter().enumerate() {
        let Some(text_replacement) = text_replacement else {
            continue;
        };
        variants_map.insert(
            apply_text_replacements(text, text_replacement)?,
            vec![vec![format!("Text Replacement {id}")]],
        );
    }

    for TextProcessorWithId { id, processor } in text_processors {
        let mut new_variants_map = VariantAndTextProcessorRuleChainCandidatesMap::new();
        for (variant, current_preprocessor_rule_chain_candidates) in &variants_map {
            for &option in processor.options {
                let processed = get_processed_text(text_cache, variant, id, option, |t, o| {
                    processor.process(t, o)
                });
                let with_id = || {
                    current_preprocessor_rule_chain_candidates
                        .iter()
                        .map(|candidate| {
                            let mut candidate = candidate.clone();
                            candidate.push(id.to_string());
                            candidate
                        })
                        .collect::<Vec<_>>()
                };
                match new_variants_map.get_mut(&processed) {
                    // unchanged text keeps its chains
                    None if &processed == variant => {
                        new_variants_map
                            .insert(processed, current_preprocessor_rule_chain_candidates.clone());
                    }
                    Some(_) if &processed == variant => {}
                    None => {
                        new_variants_map.insert(processed, with_id());
                    }
                    Some(existing) => existing.extend(with_id()),
                }
            }
        }
        variants_map = new_variants_map;
    }
    Ok(variants_map)
}

fn get_processed_text(
    text_cache: &mut TextCache,
    text: &str,
    id: &str,
    setting: TextProcessorSetting,
    process: impl Fn(&str, TextProcessorSetting) -> String,
) -> String {
    let level2 = text_cache
        .entry(text.to_string())
        .or_default()
        .entry(id.to_string())
        .or_default();
    level2
        .entry(setting)
        .or_insert_with(|| process(text, setting))
        .clone()
}

/// Shrinks the search window: one character, or one trailing word.
pub fn get_next_substring(search_resolution: SearchResolution, current: &str) -> &str {
    match search_resolution {
        SearchResolution::Word => match GET_NEXT_SUBSTRING_REGEX.find(current) {
            Ok(Some(m)) => &current[..m.start()],
            Ok(None) => "",
            Err(e) => {
                log::warn!("word boundary search failed for {current:?}: {e}");
                ""
            }
        },
        SearchResolution::Letter => match current.char_indices().next_back() {
            Some((last, _)) => &current[..last],
            None => "",
        },
    }
}

pub fn apply_text_replacements(
    text: &str,
    replacements: &[FindTermsTextReplacement],
) -> Result<String, RegexReplaceError> {
    let mut text = text.to_string();
    for FindTermsTextReplacement {
        pattern,
        replacement,
        is_global,
    } in replacements
    {
        text = apply_text_replacement(&text, pattern, replacement, *is_global)?;
    }
    Ok(text)
}

/// Cuts `text` at the first character that is not Japanese, Chinese or Korean.
pub fn get_japanese_chinese_korean_only_text(text: &str) -> &str {
    for (i, c) in text.char_indices() {
        let code_point = c as u32;
        if !is_code_point_japanese(code_point)
            && !is_code_point_chinese(code_point)
            && !is_code_point_korean(code_point)
        {
            return &text[..i];
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::ja::text_preprocessors::japanese_preprocessors;
    use crate::language::text_processors::capitalization_preprocessors;
    use pretty_assertions::assert_eq;

    #[test]
    fn next_substring_by_letter() {
        assert_eq!(get_next_substring(SearchResolution::Letter, "走った"), "走っ");
        assert_eq!(get_next_substring(SearchResolution::Letter, "走"), "");
    }

    #[test]
    fn next_substring_by_word() {
        assert_eq!(get_next_substring(SearchResolution::Word, "read the book"), "read the");
        assert_eq!(get_next_substring(SearchResolution::Word, "read"), "");
    }

    #[test]
    fn cjk_only() {
        assert_eq!(get_japanese_chinese_korean_only_text("走ったabc"), "走った");
        assert_eq!(get_japanese_chinese_korean_only_text("abc"), "");
    }

    #[test]
    fn casing_variants() {
        let mut cache = TextCache::default();
        let variants =
            get_text_variants("Read", &capitalization_preprocessors(), &[], &mut cache).unwrap();
        let keys: Vec<&str> = variants.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Read", "read"]);
        assert_eq!(
            variants["Read"],
            vec![
                Vec::<String>::new(),
                vec!["decapitalize".to_string(), "capitalizeFirstLetter".to_string()]
            ]
        );
        assert_eq!(variants["read"], vec![vec!["decapitalize".to_string()]]);
    }

    #[test]
    fn katakana_variant_records_processor() {
        let mut cache = TextCache::default();
        let variants =
            get_text_variants("ヨム", &japanese_preprocessors(), &[], &mut cache).unwrap();
        assert_eq!(
            variants.get("よむ"),
            Some(&vec![vec!["convertHiraganaToKatakana".to_string()]])
        );
        assert_eq!(variants.get("ヨム"), Some(&vec![Vec::<String>::new()]));
    }

    #[test]
    fn text_replacement_seeds_variant() {
        let replacements = vec![
            None,
            Some(vec![FindTermsTextReplacement {
                pattern: Regex::new("ー+").unwrap(),
                replacement: "".into(),
                is_global: true,
            }]),
        ];
        let mut cache = TextCache::default();
        let variants = get_text_variants("すごーい", &[], &replacements, &mut cache).unwrap();
        assert_eq!(
            variants.get("すごい"),
            Some(&vec![vec!["Text Replacement 1".to_string()]])
        );
    }
}
