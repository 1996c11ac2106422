//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::ContentValidationError;

/// Errors emitted by `Fetcher` implementations.
///
/// A failure for a single lecture or activity body is reported with this type
/// and stays local to that item.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("invalid locator: {0}")]
    InvalidLocator(String),
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Alias used where a fetch error concerns one lecture or activity body.
pub type FragmentLoadError = FetchError;

/// Errors emitted while loading the content document. Fatal for the session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentLoadError {
    #[error("content document unavailable: {0}")]
    Fetch(#[from] FetchError),
    #[error("content document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("content document is malformed: {0}")]
    Invalid(#[from] ContentValidationError),
}

/// The persisted progress blob could not be parsed.
///
/// Never fatal: the tracker logs it and starts from an empty state.
#[derive(Debug, Error)]
#[error("persisted progress is unreadable: {0}")]
pub struct PersistedStateParseError(#[from] pub serde_json::Error);

/// Errors emitted while building configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("content location is empty")]
    EmptyContentLocation,
    #[error("invalid content url {raw}: {source}")]
    InvalidUrl {
        raw: String,
        source: url::ParseError,
    },
    #[error("invalid {var} value: {raw}")]
    InvalidNumber { var: &'static str, raw: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while starting a course from configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseStartError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Content(#[from] ContentLoadError),
}
