//! Typed errors for citation resolution.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Terminal lookup failures.
///
/// Each variant carries enough context to build a well-formed
/// [`ResponseRecord`](crate::types::response::ResponseRecord); none of them
/// is fatal to the process.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The citation text could not be parsed into an article number.
    #[error("could not parse citation: {raw}")]
    InvalidCitation { raw: String },

    /// The name resolver found no acceptable candidate for the law name.
    #[error("no law matched name: {name}")]
    LawNotResolved {
        name: String,
        /// Raw candidate names the registry returned, if any.
        candidates: Vec<String>,
    },

    /// Every retrieval tier was exhausted without a match.
    #[error("{citation} not found in {law_name}")]
    ArticleNotFound {
        law_name: String,
        citation: String,
        available: Vec<String>,
        reference_url: String,
    },
}

/// Per-source upstream failures.
///
/// The retrieval orchestrator logs these and treats the tier as having
/// produced nothing; they are never re-raised to the caller.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Upstream did not answer within the tier timeout
    #[error("timeout waiting for {what}")]
    Timeout { what: String },

    /// The registry answered with its not-found marker
    #[error("registry reported no result")]
    RegistryNotFound,

    /// XML stream could not be read
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Snapshot file could not be read
    #[error("snapshot read error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// URL construction failed
    #[error("invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Upstream document did not have the expected shape
    #[error("malformed upstream document: {0}")]
    Malformed(String),
}

/// Result type alias for lookup operations.
pub type Result<T> = std::result::Result<T, LookupError>;

/// Result type alias for upstream source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
