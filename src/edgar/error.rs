//! Error types for the filing pipeline.
//!
//! Every stage returns its own error type so callers can decide per stage
//! what is fatal. None of them is fatal to the process: the brief renders a
//! placeholder for whatever slice failed and carries on.
//!
//! ```text
//! PipelineError
//! ├── AcquisitionError  (archive lookup, download, artifact store)
//! ├── UnwrapError       (submission envelope)
//! └── LocatorError      (per-section extraction, surfaced separately)
//! ```

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while retrieving a filing from the archive or the artifact store.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The archive has no such ticker, or the ticker never filed this form.
    #[error("no {filing_type} filing found for {ticker}")]
    NotFound { ticker: String, filing_type: String },

    /// Network failure, timeout or a server-side status. Retryable.
    #[error("transient fetch error for {url}: {reason}")]
    TransientFetchError { url: String, reason: String },

    /// The local artifact could not be written or read back.
    #[error("artifact store error at {}: {source}", .path.display())]
    StorageError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Ticker or filing type violates the request constraints.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AcquisitionError {
    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AcquisitionError::TransientFetchError { .. })
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AcquisitionError::StorageError {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn transient(url: impl Into<String>, reason: impl ToString) -> Self {
        AcquisitionError::TransientFetchError {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnwrapError {
    #[error("submission contains no <DOCUMENT> container")]
    NoEmbeddedDocument,
}

/// Failure to isolate a named section from normalized filing text.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum LocatorError {
    /// Fewer start-marker occurrences than the configured occurrence index.
    #[error("{section}: {}", not_found_message(.found, .required))]
    SectionNotFound {
        section: String,
        found: usize,
        required: usize,
    },

    /// The start marker resolved but no end marker follows it.
    #[error("{section}: could not find the end of the section")]
    SectionBoundaryNotFound { section: String },

    /// The bounded excerpt is too small to be a real section body.
    #[error("{section}: section appears too short after extraction ({length} < {minimum} characters)")]
    SectionTooShort {
        section: String,
        length: usize,
        minimum: usize,
    },
}

fn not_found_message(found: &usize, required: &usize) -> String {
    if *found == 0 {
        "section marker not present in filing".to_string()
    } else {
        format!(
            "found {} of {} required marker occurrences (only the table of contents entry?)",
            found, required
        )
    }
}

/// Errors from the fetch-and-unwrap half of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Unwrap(#[from] UnwrapError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages_differ_by_count() {
        let absent = LocatorError::SectionNotFound {
            section: "Risk Factors".to_string(),
            found: 0,
            required: 2,
        };
        let toc_only = LocatorError::SectionNotFound {
            section: "Risk Factors".to_string(),
            found: 1,
            required: 2,
        };
        assert!(absent.to_string().contains("not present"));
        assert!(toc_only.to_string().contains("table of contents"));
    }

    #[test]
    fn test_only_transient_errors_are_retryable() {
        assert!(AcquisitionError::transient("https://www.sec.gov", "timed out").is_retryable());
        assert!(!AcquisitionError::NotFound {
            ticker: "NVDA".to_string(),
            filing_type: "10-K".to_string(),
        }
        .is_retryable());
        assert!(!AcquisitionError::InvalidRequest("empty ticker".to_string()).is_retryable());
    }
}
