//! Crate-wide error handling.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by the selection-to-overlay pipeline.
#[derive(Error, Debug, Clone)]
pub enum TranslateError {
    /// The invocation carried no usable selection range.
    #[error("no text is selected")]
    NoSelection,

    /// Provider, credential, or model could not be resolved from settings.
    #[error("translation settings are incomplete: {0}")]
    MissingConfiguration(String),

    /// A single unit's translation request failed.
    #[error("translation request failed: {0}")]
    RequestFailed(String),

    /// A single unit's translation request exceeded its deadline.
    #[error("translation request timed out after {0:?}")]
    RequestTimeout(Duration),

    /// One or more units in a batch failed while siblings may have been
    /// spliced into the document already.
    #[error("{failed} of {total} translation units failed")]
    PartialBatchFailure { failed: usize, total: usize },

    /// The provider returned a response this crate could not decode.
    #[error("failed to parse provider response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TranslateError {
    fn from(error: reqwest::Error) -> Self {
        TranslateError::RequestFailed(error.to_string())
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(error: serde_json::Error) -> Self {
        TranslateError::Parse(error.to_string())
    }
}

impl From<toml::de::Error> for TranslateError {
    fn from(error: toml::de::Error) -> Self {
        TranslateError::MissingConfiguration(error.to_string())
    }
}

pub type TranslateResult<T> = Result<T, TranslateError>;
