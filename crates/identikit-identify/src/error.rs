//! Error types for identification runs.

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an identification run.
///
/// Any of these returned from inside the transaction rolls back every write
/// made during the run.
#[derive(Debug, Error)]
pub enum IdentifyError {
    /// A scraped reference carried a stored ID that is not a valid integer.
    #[error("error converting {kind} ID {value}: {source}")]
    ParseId {
        kind: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// Creating a missing performer, studio or tag failed.
    #[error("error creating {kind}: {source}")]
    Create {
        kind: &'static str,
        #[source]
        source: identikit_core::Error,
    },

    /// A scraped scene date could not be parsed.
    #[error("error parsing date {value}: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: identikit_core::Error,
    },

    /// A scraped image payload could not be decoded.
    #[error("error processing image input: {0}")]
    ImageDecode(String),

    /// A read or write against the store failed.
    #[error("storage error: {0}")]
    Store(#[from] identikit_core::Error),
}

impl IdentifyError {
    pub(crate) fn parse_id(kind: &'static str, value: &str, source: ParseIntError) -> Self {
        Self::ParseId {
            kind,
            value: value.to_string(),
            source,
        }
    }

    pub(crate) fn create(kind: &'static str) -> impl FnOnce(identikit_core::Error) -> Self {
        move |source| Self::Create { kind, source }
    }
}

/// Convenience alias for identification results.
pub type IdentifyResult<T> = std::result::Result<T, IdentifyError>;

/// A failure inside a single scrape source.
///
/// The dispatcher logs these and moves on to the next source; they never
/// abort a run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Reading a source's backing data failed.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source returned data that could not be parsed.
    #[error("malformed result in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Any other source-specific failure.
    #[error("{source_name}: {message}")]
    Source {
        source_name: String,
        message: String,
    },
}
