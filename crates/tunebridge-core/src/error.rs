//! Error types for tunebridge.

use thiserror::Error;

/// Result type alias using tunebridge's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// How far an error reaches when it surfaces inside a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// Abort the whole process before any job starts.
    Process,
    /// Abort only the owning sync job.
    Job,
    /// Skip (or fall back for) the current item; the job continues.
    Item,
}

/// Core error type for tunebridge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication handshake with the destination catalog failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Reading a source playlist failed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Getting or creating the destination playlist failed
    #[error("Provision error: {0}")]
    Provision(String),

    /// AI extraction of song/artist failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Catalog search request failed
    #[error("Search error: {0}")]
    Search(String),

    /// Neither matcher tier accepted a candidate
    #[error("No match found for '{track}' by '{artist}'")]
    NoMatchFound { track: String, artist: String },

    /// Appending tracks to the destination playlist failed
    #[error("Add error: {0}")]
    Add(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify the error against the sync pipeline's abort/skip rules.
    ///
    /// | Scope | Variants |
    /// |-------|----------|
    /// | Process | `Config`, `Auth` |
    /// | Job | `Fetch`, `Provision` |
    /// | Item | everything else |
    pub fn scope(&self) -> ErrorScope {
        match self {
            Error::Config(_) | Error::Auth(_) => ErrorScope::Process,
            Error::Fetch(_) | Error::Provision(_) => ErrorScope::Job,
            _ => ErrorScope::Item,
        }
    }

    /// Returns true if the error aborts the whole process.
    pub fn is_fatal(&self) -> bool {
        self.scope() == ErrorScope::Process
    }

    /// Build a `NoMatchFound` carrying the attempted strings.
    pub fn no_match(track: impl Into<String>, artist: impl Into<String>) -> Self {
        Error::NoMatchFound {
            track: track.into(),
            artist: artist.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
