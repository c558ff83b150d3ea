use crate::language::transformer::LanguageTransformDescriptor;

/// The option a text processor is run with.
///
/// Each processor declares the settings it supports; the variant expander
/// runs it once per setting and keeps every distinct output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextProcessorSetting {
    Bool(bool),
    Bidirectional(BidirectionalPreProcessorOptions),
    /// `[collapse, collapse_fully]`
    Emphatic([bool; 2]),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BidirectionalPreProcessorOptions {
    Off,
    Direct,
    Inverse,
}

pub type TextProcessorFn = fn(&str, TextProcessorSetting) -> String;

/// Text `pre-` & `post-`processors are used during the translation process to
/// create alternate versions of the input text to search for.
///
/// This can be helpful when the input text doesn't exactly
/// match the term or expression found in the database.
///
/// When a language has multiple processors, the translator will generate
/// variants of the text by applying all combinations of the processors.
#[derive(Clone, Debug)]
pub struct TextProcessor {
    pub name: &'static str,
    pub description: &'static str,
    pub options: &'static [TextProcessorSetting],
    pub process: TextProcessorFn,
}

impl TextProcessor {
    pub fn process(&self, text: &str, setting: TextProcessorSetting) -> String {
        (self.process)(text, setting)
    }
}

#[derive(Clone, Debug)]
pub struct TextProcessorWithId {
    pub id: &'static str,
    pub processor: TextProcessor,
}

/// Helper function to normalize a reading before comparing it to another one.
pub type ReadingNormalizer = fn(&str) -> String;

/// Everything the translator needs to know about one language.
#[derive(Clone, Debug, Default)]
pub struct LanguageDescriptor {
    pub iso: String,
    pub iso639_3: String,
    pub name: String,
    pub example_text: String,
    pub text_preprocessors: Vec<TextProcessorWithId>,
    pub text_postprocessors: Vec<TextProcessorWithId>,
    pub reading_normalizer: Option<ReadingNormalizer>,
    pub language_transforms: Option<LanguageTransformDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageSummary {
    pub name: String,
    pub iso: String,
    pub iso639_3: String,
    pub example_text: String,
}

impl From<&LanguageDescriptor> for LanguageSummary {
    fn from(descriptor: &LanguageDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            iso: descriptor.iso.clone(),
            iso639_3: descriptor.iso639_3.clone(),
            example_text: descriptor.example_text.clone(),
        }
    }
}
