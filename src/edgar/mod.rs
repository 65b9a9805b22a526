//! SEC EDGAR filing acquisition and section extraction.

pub mod acquire;
pub mod archive;
pub mod error;
pub mod filing;
pub mod parsing;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod tickers;

pub use acquire::FilingFetcher;
pub use archive::{EdgarArchive, FilingArchive};
pub use error::{AcquisitionError, LocatorError, PipelineError, UnwrapError};
pub use filing::FilingRef;
pub use pipeline::{ExtractedFiling, FilingPipeline, SectionOutcome};
pub use report::ReportType;
pub use store::{ArtifactKey, ArtifactStore};
pub use tickers::Ticker;

use crate::utils::rate_limit::RateLimiter;

pub fn rate_limiter() -> &'static RateLimiter {
    RateLimiter::edgar()
}
