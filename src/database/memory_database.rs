use crate::database::dictionary_database::{
    DatabaseKanjiMeta, DatabaseTermMeta, DatabaseTermMetaData, DictionaryDatabase,
    DictionaryDatabaseTag, DictionarySet, GenericQueryRequest, KanjiEntry, SequenceQuery,
    TermEntry, TermExactQueryRequest,
};
use crate::dictionary::{TermSourceMatchSource, TermSourceMatchType};
use crate::dictionary_data::{
    DictionaryBanks, GenericFrequencyData, NumOrStr, TermGlossary, TermMetaBankRow,
    TermMetaFrequencyDataType, TermMetaModeType, TermMetaPhoneticData, TermMetaPitchData,
};
use crate::errors::DBError;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// A term row as stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseTermEntry {
    pub id: u64,
    pub expression: String,
    pub reading: String,
    pub definition_tags: Option<String>,
    pub rules: String,
    pub score: i64,
    pub glossary: Vec<TermGlossary>,
    pub sequence: Option<i64>,
    pub term_tags: Option<String>,
    pub dictionary: String,
}

impl DatabaseTermEntry {
    fn into_term_entry(
        self,
        match_source: TermSourceMatchSource,
        match_type: TermSourceMatchType,
        index: usize,
    ) -> TermEntry {
        let DatabaseTermEntry {
            id,
            expression,
            reading,
            definition_tags,
            rules,
            score,
            glossary,
            sequence,
            term_tags,
            dictionary,
        } = self;
        TermEntry {
            id,
            index,
            match_type,
            match_source,
            term: expression,
            reading,
            definition_tags: split_optional_string_field(definition_tags.as_deref()),
            term_tags: split_optional_string_field(term_tags.as_deref()),
            rules: split_optional_string_field(Some(&rules)),
            definitions: glossary,
            score,
            dictionary,
            sequence: sequence.unwrap_or(-1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct DatabaseTermMetaRow {
    expression: String,
    data: DatabaseTermMetaData,
    dictionary: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct DatabaseKanjiEntry {
    character: String,
    onyomi: String,
    kunyomi: String,
    tags: String,
    meanings: Vec<String>,
    stats: IndexMap<String, NumOrStr>,
    dictionary: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct DatabaseKanjiMetaRow {
    character: String,
    data: GenericFrequencyData,
    dictionary: String,
}

/// A dictionary store held entirely in memory, filled from yomitan bank data.
///
/// # Examples
/// ```
/// use yomichan_translator::database::InMemoryDictionaryDatabase;
/// use yomichan_translator::dictionary_data::DictionaryBanks;
///
/// let mut db = InMemoryDictionaryDatabase::new();
/// let banks: DictionaryBanks = serde_json::from_str(
///     r#"{"terms": [["読む", "よむ", "", "v5", 0, ["to read"], 1, ""]]}"#,
/// ).unwrap();
/// db.add_dictionary("JMdict", banks).unwrap();
/// assert!(db.dictionaries().contains("JMdict"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryDictionaryDatabase {
    next_id: u64,
    dictionaries: IndexSet<String>,
    terms: Vec<DatabaseTermEntry>,
    term_meta: Vec<DatabaseTermMetaRow>,
    kanji: Vec<DatabaseKanjiEntry>,
    kanji_meta: Vec<DatabaseKanjiMetaRow>,
    tags: Vec<DictionaryDatabaseTag>,
}

impl InMemoryDictionaryDatabase {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn dictionaries(&self) -> &IndexSet<String> {
        &self.dictionaries
    }

    /// Parses a json object with `terms`, `term_meta`, `kanji`, `kanji_meta`
    /// and `tags` bank arrays and installs it under `name`.
    pub fn add_dictionary_json(&mut self, name: &str, json: &str) -> Result<(), DBError> {
        let banks: DictionaryBanks = serde_json::from_str(json)?;
        self.add_dictionary(name, banks)
    }

    pub fn add_dictionary(&mut self, name: &str, banks: DictionaryBanks) -> Result<(), DBError> {
        if self.dictionaries.contains(name) {
            return Err(DBError::Import(format!(
                "cannot import {name} as it is already installed"
            )));
        }
        let DictionaryBanks {
            terms,
            term_meta,
            kanji,
            kanji_meta,
            tags,
        } = banks;

        let term_meta = term_meta
            .into_iter()
            .map(|row| convert_term_meta_row(row, name))
            .collect::<Result<Vec<_>, DBError>>()?;
        let scores = terms
            .iter()
            .map(|row| convert_term_score(row.4, &row.0))
            .collect::<Result<Vec<_>, DBError>>()?;

        for (row, score) in terms.into_iter().zip(scores) {
            let expression = row.0;
            // readings are optional in bank files, an empty one means "same as expression"
            let reading = if row.1.is_empty() {
                expression.clone()
            } else {
                row.1
            };
            let id = self.next_id;
            self.next_id += 1;
            self.terms.push(DatabaseTermEntry {
                id,
                expression,
                reading,
                definition_tags: row.2,
                rules: row.3,
                score,
                glossary: row.5,
                sequence: Some(row.6),
                term_tags: Some(row.7),
                dictionary: name.to_string(),
            });
        }
        self.term_meta.extend(term_meta);
        self.kanji.extend(kanji.into_iter().map(|row| DatabaseKanjiEntry {
            character: row.0,
            onyomi: row.1,
            kunyomi: row.2,
            tags: row.3,
            meanings: row.4,
            stats: row.5,
            dictionary: name.to_string(),
        }));
        self.kanji_meta.extend(kanji_meta.into_iter().filter_map(|row| {
            (row.1 == TermMetaModeType::Freq).then(|| DatabaseKanjiMetaRow {
                character: row.0,
                data: row.2,
                dictionary: name.to_string(),
            })
        }));
        self.tags
            .extend(tags.into_iter().map(|row| DictionaryDatabaseTag {
                name: row.0,
                category: row.1,
                order: row.2,
                notes: row.3,
                score: row.4,
                dictionary: name.to_string(),
            }));
        self.dictionaries.insert(name.to_string());
        log::debug!("installed dictionary {name}");
        Ok(())
    }

    /// Removes every row of `name`. Returns `false` when it was not installed.
    pub fn delete_dictionary(&mut self, name: &str) -> bool {
        if !self.dictionaries.shift_remove(name) {
            return false;
        }
        self.terms.retain(|row| row.dictionary != name);
        self.term_meta.retain(|row| row.dictionary != name);
        self.kanji.retain(|row| row.dictionary != name);
        self.kanji_meta.retain(|row| row.dictionary != name);
        self.tags.retain(|row| row.dictionary != name);
        true
    }
}

/// Scores are integral in bank files; anything else is rejected rather than truncated.
fn convert_term_score(score: f64, expression: &str) -> Result<i64, DBError> {
    const MAX_SAFE_INTEGER: f64 = 9007199254740991.0;
    if score.fract() != 0.0 || score.abs() > MAX_SAFE_INTEGER {
        return Err(DBError::Import(format!(
            "term {expression} has a non-integer score: {score}"
        )));
    }
    Ok(score as i64)
}

fn convert_term_meta_row(row: TermMetaBankRow, dictionary: &str) -> Result<DatabaseTermMetaRow, DBError> {
    let TermMetaBankRow(expression, mode, data) = row;
    let data = match mode {
        TermMetaModeType::Freq => DatabaseTermMetaData::Frequency(serde_json::from_value::<
            TermMetaFrequencyDataType,
        >(data)?),
        TermMetaModeType::Pitch => {
            DatabaseTermMetaData::Pitch(serde_json::from_value::<TermMetaPitchData>(data)?)
        }
        TermMetaModeType::Ipa => {
            DatabaseTermMetaData::Phonetic(serde_json::from_value::<TermMetaPhoneticData>(data)?)
        }
    };
    Ok(DatabaseTermMetaRow {
        expression,
        data,
        dictionary: dictionary.to_string(),
    })
}

fn split_optional_string_field(field: Option<&str>) -> Vec<String> {
    match field {
        Some(s) if !s.is_empty() => s.split(' ').map(String::from).collect(),
        _ => Vec::new(),
    }
}

fn key_matches(key: &str, item: &str, match_type: TermSourceMatchType) -> bool {
    match match_type {
        TermSourceMatchType::Exact => key == item,
        TermSourceMatchType::Prefix => key.starts_with(item),
        TermSourceMatchType::Suffix => key.ends_with(item),
    }
}

impl DictionaryDatabase for InMemoryDictionaryDatabase {
    fn find_terms_bulk(
        &self,
        term_list: &[String],
        dictionaries: &impl DictionarySet,
        match_type: TermSourceMatchType,
    ) -> Result<Vec<TermEntry>, DBError> {
        let mut visited: IndexSet<u64> = IndexSet::new();
        let mut results = Vec::new();
        for (item_index, item) in term_list.iter().enumerate() {
            // the expression index is searched before the reading index
            for match_source in [TermSourceMatchSource::Term, TermSourceMatchSource::Reading] {
                for row in &self.terms {
                    let key = match match_source {
                        TermSourceMatchSource::Term => &row.expression,
                        _ => &row.reading,
                    };
                    if !key_matches(key, item, match_type)
                        || !dictionaries.has(&row.dictionary)
                        || !visited.insert(row.id)
                    {
                        continue;
                    }
                    let row_match_type = if key == item {
                        TermSourceMatchType::Exact
                    } else {
                        match_type
                    };
                    results.push(row.clone().into_term_entry(match_source, row_match_type, item_index));
                }
            }
        }
        Ok(results)
    }

    fn find_terms_exact_bulk(
        &self,
        term_list: &[TermExactQueryRequest],
        dictionaries: &impl DictionarySet,
    ) -> Result<Vec<TermEntry>, DBError> {
        let mut results = Vec::new();
        for (index, TermExactQueryRequest { term, reading }) in term_list.iter().enumerate() {
            results.extend(
                self.terms
                    .iter()
                    .filter(|row| {
                        &row.expression == term
                            && &row.reading == reading
                            && dictionaries.has(&row.dictionary)
                    })
                    .map(|row| {
                        row.clone().into_term_entry(
                            TermSourceMatchSource::Term,
                            TermSourceMatchType::Exact,
                            index,
                        )
                    }),
            );
        }
        Ok(results)
    }

    fn find_terms_by_sequence_bulk(
        &self,
        items: &[SequenceQuery],
    ) -> Result<Vec<TermEntry>, DBError> {
        let mut results = Vec::new();
        for (index, SequenceQuery { query, dictionary }) in items.iter().enumerate() {
            results.extend(
                self.terms
                    .iter()
                    .filter(|row| row.sequence == Some(*query) && &row.dictionary == dictionary)
                    .map(|row| {
                        row.clone().into_term_entry(
                            TermSourceMatchSource::Sequence,
                            TermSourceMatchType::Exact,
                            index,
                        )
                    }),
            );
        }
        Ok(results)
    }

    fn find_term_meta_bulk(
        &self,
        term_list: &[String],
        dictionaries: &impl DictionarySet,
    ) -> Result<Vec<DatabaseTermMeta>, DBError> {
        let mut results = Vec::new();
        for (index, term) in term_list.iter().enumerate() {
            results.extend(
                self.term_meta
                    .iter()
                    .filter(|row| &row.expression == term && dictionaries.has(&row.dictionary))
                    .map(|row| DatabaseTermMeta {
                        index,
                        term: row.expression.clone(),
                        data: row.data.clone(),
                        dictionary: row.dictionary.clone(),
                    }),
            );
        }
        Ok(results)
    }

    fn find_kanji_bulk(
        &self,
        kanji_list: &[String],
        dictionaries: &impl DictionarySet,
    ) -> Result<Vec<KanjiEntry>, DBError> {
        let mut results = Vec::new();
        for (index, character) in kanji_list.iter().enumerate() {
            results.extend(
                self.kanji
                    .iter()
                    .filter(|row| &row.character == character && dictionaries.has(&row.dictionary))
                    .map(|row| KanjiEntry {
                        index,
                        character: row.character.clone(),
                        onyomi: split_optional_string_field(Some(&row.onyomi)),
                        kunyomi: split_optional_string_field(Some(&row.kunyomi)),
                        tags: split_optional_string_field(Some(&row.tags)),
                        definitions: row.meanings.clone(),
                        stats: row.stats.clone(),
                        dictionary: row.dictionary.clone(),
                    }),
            );
        }
        Ok(results)
    }

    fn find_kanji_meta_bulk(
        &self,
        kanji_list: &[String],
        dictionaries: &impl DictionarySet,
    ) -> Result<Vec<DatabaseKanjiMeta>, DBError> {
        let mut results = Vec::new();
        for (index, character) in kanji_list.iter().enumerate() {
            results.extend(
                self.kanji_meta
                    .iter()
                    .filter(|row| &row.character == character && dictionaries.has(&row.dictionary))
                    .map(|row| DatabaseKanjiMeta {
                        index,
                        character: row.character.clone(),
                        data: row.data.clone(),
                        dictionary: row.dictionary.clone(),
                    }),
            );
        }
        Ok(results)
    }

    fn find_tag_meta_bulk(
        &self,
        items: &[GenericQueryRequest],
    ) -> Result<Vec<Option<DictionaryDatabaseTag>>, DBError> {
        Ok(items
            .iter()
            .map(|GenericQueryRequest { query, dictionary }| {
                self.tags
                    .iter()
                    .find(|tag| &tag.name == query && &tag.dictionary == dictionary)
                    .cloned()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn db() -> InMemoryDictionaryDatabase {
        let mut db = InMemoryDictionaryDatabase::new();
        db.add_dictionary_json(
            "A",
            r#"{
                "terms": [
                    ["読む", "よむ", "v5", "v5", 10, ["to read"], 5, ""],
                    ["読み", "よみ", "n", "n", 1, ["reading"], 6, ""],
                    ["よむ", "", "", "", 0, ["kana only"], -1, ""]
                ],
                "tags": [["v5", "partOfSpeech", 0, "godan verb", 0]]
            }"#,
        )
        .unwrap();
        db
    }

    #[test]
    fn fractional_score_is_rejected() {
        let mut db = InMemoryDictionaryDatabase::new();
        let result = db.add_dictionary_json(
            "B",
            r#"{"terms": [["読む", "よむ", "", "", 1.5, ["to read"], 0, ""]]}"#,
        );
        assert!(matches!(result, Err(DBError::Import(_))));
        assert!(db.dictionaries().is_empty());

        db.add_dictionary_json(
            "B",
            r#"{"terms": [["読む", "よむ", "", "", -2.0, ["to read"], 0, ""]]}"#,
        )
        .unwrap();
        let dicts: IndexSet<String> = IndexSet::from(["B".to_string()]);
        let rows = db
            .find_terms_bulk(&["読む".into()], &dicts, TermSourceMatchType::Exact)
            .unwrap();
        assert_eq!(rows[0].score, -2);
    }

    #[test]
    fn terms_bulk_dedups_rows_across_indices() {
        let db = db();
        let dicts: IndexSet<String> = IndexSet::from(["A".to_string()]);
        let rows = db
            .find_terms_bulk(&["よむ".into()], &dicts, TermSourceMatchType::Exact)
            .unwrap();
        // expression index first: the kana-only row, then the reading match of 読む
        let found: Vec<(&str, TermSourceMatchSource)> = rows
            .iter()
            .map(|r| (r.term.as_str(), r.match_source))
            .collect();
        assert_eq!(
            found,
            vec![
                ("よむ", TermSourceMatchSource::Term),
                ("読む", TermSourceMatchSource::Reading),
            ]
        );
    }

    #[test]
    fn prefix_match_reports_exactness_per_row() {
        let db = db();
        let dicts: IndexSet<String> = IndexSet::from(["A".to_string()]);
        let rows = db
            .find_terms_bulk(&["読".into()], &dicts, TermSourceMatchType::Prefix)
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows
            .iter()
            .all(|r| r.match_type == TermSourceMatchType::Prefix));
    }

    #[test]
    fn tag_meta_is_index_aligned() {
        let db = db();
        let tags = db
            .find_tag_meta_bulk(&[
                GenericQueryRequest {
                    query: "missing".into(),
                    dictionary: "A".into(),
                },
                GenericQueryRequest {
                    query: "v5".into(),
                    dictionary: "A".into(),
                },
            ])
            .unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags[0].is_none());
        assert_eq!(tags[1].as_ref().map(|t| t.notes.as_str()), Some("godan verb"));
    }

    #[test]
    fn delete_dictionary_removes_rows() {
        let mut db = db();
        assert!(db.delete_dictionary("A"));
        let dicts: IndexSet<String> = IndexSet::from(["A".to_string()]);
        let rows = db
            .find_terms_bulk(&["読む".into()], &dicts, TermSourceMatchType::Exact)
            .unwrap();
        assert!(rows.is_empty());
        assert!(!db.delete_dictionary("A"));
    }
}
