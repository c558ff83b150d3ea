use thiserror::Error;

/// All possible `yomichan_translator` [std::error::Error] paths
#[derive(Error, Debug)]
pub enum YomichanError {
    #[error("(-)[<yc_error::translator>] -> \n{0}")]
    Translator(#[from] TranslatorError),
    #[error("(-)[<yc_error::db>] -> \n{0}")]
    Database(#[from] DBError),
    #[error("(-)[<yc_error::language>] -> \n{0}")]
    Language(#[from] LanguageTransformerError),
}

#[derive(Error, Debug)]
pub enum DBError {
    #[error("json err: {0}")]
    Json(#[from] serde_json::Error),
    #[error("query err: {0}")]
    Query(String),
    #[error("none found err: {0}")]
    NoneFound(String),
    #[error("import err: {0}")]
    Import(String),
}

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("db err: {0}")]
    Database(#[from] DBError),
    #[error("language transformer err: {0}")]
    Transformer(#[from] LanguageTransformerError),
    #[error("regex err: {0}")]
    Regex(#[from] RegexReplaceError),
    #[error("failed to create collator: {0}")]
    Collator(String),
}

impl From<fancy_regex::Error> for TranslatorError {
    fn from(e: fancy_regex::Error) -> Self {
        TranslatorError::Regex(RegexReplaceError::Regex(e))
    }
}

#[derive(Error, Debug)]
pub enum RegexReplaceError {
    #[error("regex err: {0}")]
    Regex(#[from] fancy_regex::Error),
}

/// Errors for [`crate::language::transformer::LanguageTransformer`].
#[derive(Error, Debug)]
pub enum LanguageTransformerError {
    #[error("invalid conditions for transform: {transform_id}.rules[{index}]: {source}")]
    InvalidConditions {
        source: ConditionError,
        transform_id: String,
        index: usize,
    },
    #[error("failed to build condition flags map: {0}")]
    ConditionsFlagMap(#[from] ConditionError),
    #[error("invalid rule pattern in transform {transform_id}: {source}")]
    Pattern {
        source: fancy_regex::Error,
        transform_id: String,
    },
}

#[derive(Error)]
pub enum ConditionError {
    #[error("map does not contain condition: ({condition:?}) at index {index}")]
    Missing { index: usize, condition: String },
    #[error("cycle detected in sub-rule declarations. the conditions [{conditions}] form a dependency cycle")]
    SubRuleCycle { conditions: String },
    #[error("maximum number of conditions was exceeded")]
    MaxConditions,
}

impl std::fmt::Debug for ConditionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({self})")
    }
}
