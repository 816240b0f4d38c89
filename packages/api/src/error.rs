//! Error types for DSD query processing.

use thiserror::Error;

/// Main error type for the DSD libraries.
#[derive(Debug, Error)]
pub enum DsdError {
    /// The queryId parameter carries an unsupported URN.
    #[error("Invalid queryId [{0}]")]
    UnknownQueryKind(String),

    /// The inbound parameter map is structurally invalid.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A doctype identifier string matches none of the supported layouts.
    #[error("Invalid doctype {0}")]
    DoctypeFormat(String),

    /// An outbound HTTP request failed at the transport level.
    #[error("Directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The directory answered with a non-success status.
    #[error("Directory request failed with status {0}")]
    DirectoryUnavailable(u16),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// The RegRep transformation could not be applied.
    #[error("Transformation failed: {0}")]
    Transform(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DsdError {
    /// True for failures caused by the inbound request rather than a
    /// downstream system. The HTTP layer maps these to 400, everything
    /// else to 500.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            DsdError::UnknownQueryKind(_) | DsdError::InvalidQuery(_)
        )
    }
}

/// Result type alias for DSD operations.
pub type Result<T> = std::result::Result<T, DsdError>;
