pub mod cjk_utils;
pub mod descriptors;
pub mod language_d;
pub mod text_processors;
pub mod transformer;

pub mod ja {
    pub mod japanese;
    pub mod text_preprocessors;
    pub mod transforms;
}

pub mod en {
    pub mod transforms;
}
