//! Error types shared by the document, the controls and the registry.

use thiserror::Error;

/// Errors surfaced by control framework operations.
///
/// None of these occur while a correctly rendered control is being driven
/// through its public API; they indicate a document that no longer contains
/// the parts a control expects, or a bad request to the registry.
#[derive(Debug, Error)]
pub enum ControlError {
    /// An element looked up by id or handle is not in the document.
    #[error("element `{0}` not found in document")]
    ElementNotFound(String),

    /// The registry has no factory for the requested type.
    #[error("unknown control type `{0}`")]
    UnknownControlType(String),

    /// Structure building was requested twice.
    #[error("control `{0}` is already rendered")]
    AlreadyRendered(String),

    /// Options could not be decoded.
    #[error("invalid control options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ControlError>;
