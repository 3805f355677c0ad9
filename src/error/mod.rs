//! Error handling for the registry clients.

use std::io;

/// Boxed source error carried by transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Specialized error type for registry retrieval and mapping
#[derive(Debug, thiserror::Error)]
pub enum DawaError {
    /// Connection failure or broken response body
    #[error("Transport error for {url}: {source}")]
    Transport {
        /// Requested URL (API key redacted)
        url: String,
        /// Underlying transport error
        #[source]
        source: BoxError,
    },

    /// Upstream answered with a non-success status
    #[error("Request to {url} failed with HTTP status {status}")]
    HttpStatus {
        /// Requested URL (API key redacted)
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Upstream returned a syntactically valid but empty payload where a value was required
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// Malformed JSON
    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// An upstream identifier could not be parsed as a UUID
    #[error("Invalid identifier '{value}': {source}")]
    InvalidId {
        /// The raw identifier
        value: String,
        /// Parse failure
        #[source]
        source: uuid::Error,
    },

    /// An upstream status code has no mapping for the entity kind
    #[error("Could not convert {entity} status '{code}'")]
    UnknownStatus {
        /// Entity kind the code belongs to
        entity: &'static str,
        /// The raw status code
        code: String,
    },

    /// Geometry text was not a readable point
    #[error("Invalid geometry: {0}")]
    Geometry(String),

    /// A constructed record violates an invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// A page endpoint returned null
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// No eligible bulk file in the download catalog
    #[error("No downloadable file found for entity {0}")]
    FileNotFound(String),

    /// Archive could not be read
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading a body, file or directory
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The operation's cancellation token fired
    #[error("Operation cancelled")]
    Cancelled,

    /// Anything else, e.g. a failed blocking task
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DawaError {
    /// Create an empty-result error
    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::EmptyResult(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an unknown-status error for the given entity kind
    pub fn unknown_status(entity: &'static str, code: impl Into<String>) -> Self {
        Self::UnknownStatus {
            entity,
            code: code.into(),
        }
    }

    /// Wrap a transport failure
    pub fn transport(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Whether this error came from the cancellation token
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, DawaError>;
