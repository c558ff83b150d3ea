pub mod dictionary_database;
pub mod memory_database;

pub use dictionary_database::{
    DatabaseKanjiMeta, DatabaseTermMeta, DatabaseTermMetaData, DictionaryDatabase,
    DictionaryDatabaseTag, DictionarySet, GenericQueryRequest, KanjiEntry, SequenceQuery,
    TermEntry, TermExactQueryRequest,
};
pub use memory_database::InMemoryDictionaryDatabase;
