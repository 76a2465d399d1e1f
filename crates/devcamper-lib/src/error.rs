use thiserror::Error;

/// Convenient result alias for the DevCamper library.
pub type Result<T> = std::result::Result<T, Error>;

/// A single field constraint violation reported by schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Coarse classification of a failure, used by the HTTP layer to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    UpstreamLookupFailure,
    Unexpected,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::UpstreamLookupFailure => "upstream_lookup_failure",
            ErrorKind::Unexpected => "unexpected",
        }
    }
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No record with the given identity exists in the collection.
    #[error("{resource} not found with id of {id}")]
    NotFound { resource: &'static str, id: String },

    /// Field constraints were violated on create or update.
    #[error("{}", join_messages(.errors))]
    Validation { errors: Vec<FieldError> },

    /// A path segment could not be parsed as a record identity.
    #[error("Malformed id '{value}'")]
    MalformedId { value: String },

    /// A unique field already holds the submitted value.
    #[error("Duplicate field value entered")]
    DuplicateKey { field: String },

    /// A request parameter outside the body could not be interpreted.
    #[error("{message}")]
    InvalidParameter { message: String },

    /// The geocoder returned no coordinates for a postal code.
    #[error("Could not resolve zipcode '{postal_code}' to a location")]
    UpstreamLookupFailure { postal_code: String },

    /// The geocoding service answered with a non-success status.
    #[error("geocoder returned status {code}: {message}")]
    Geocoder { code: i64, message: String },

    /// A stored document could not be decoded.
    #[error("corrupt document {id}: {message}")]
    CorruptDocument { id: String, message: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON encoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A blocking store task panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// Classify the error for status-code selection.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Validation { .. }
            | Error::MalformedId { .. }
            | Error::DuplicateKey { .. }
            | Error::InvalidParameter { .. } => ErrorKind::Validation,
            Error::UpstreamLookupFailure { .. } => ErrorKind::UpstreamLookupFailure,
            _ => ErrorKind::Unexpected,
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            message: message.into(),
        }
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
