//! Error types for the agekit-core crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(
        "identifier generation exhausted after {attempts} attempts at {word_count} words; \
         retry with a larger word count"
    )]
    GenerationExhausted { attempts: usize, word_count: usize },

    #[error("invalid word count {word_count}: must be between 1 and {max}")]
    InvalidWordCount { word_count: usize, max: usize },

    #[error("parse error in {input:?}: {reason}")]
    Parse { input: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl CoreError {
    pub(crate) fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
