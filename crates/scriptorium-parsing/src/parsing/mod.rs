//! Language detection for source files.

pub mod languages;

pub use languages::{LanguageConfig, get_language_config, get_language_from_extension};
