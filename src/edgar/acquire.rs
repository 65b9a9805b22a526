use std::str::FromStr;
use std::sync::Arc;

use super::archive::FilingArchive;
use super::error::AcquisitionError;
use super::filing::FilingRef;
use super::parsing::FilingSubmission;
use super::report::ReportType;
use super::store::{ArtifactKey, ArtifactStore, SUBMISSION_ARTIFACT};
use super::tickers::Ticker;
use crate::utils::http::decode_text;

/// Fetches the latest filing of a form and keeps the raw submission in the
/// artifact store.
#[derive(Clone)]
pub struct FilingFetcher {
    archive: Arc<dyn FilingArchive>,
    store: ArtifactStore,
}

impl FilingFetcher {
    pub fn new(archive: Arc<dyn FilingArchive>, store: ArtifactStore) -> Self {
        Self { archive, store }
    }

    pub fn archive(&self) -> &Arc<dyn FilingArchive> {
        &self.archive
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Validates the request, then delegates to [`FilingFetcher::fetch`].
    pub async fn fetch_latest(
        &self,
        ticker: &str,
        filing_type: &str,
    ) -> Result<FilingSubmission, AcquisitionError> {
        let ticker = Ticker::new(ticker)?;
        let report_type = ReportType::from_str(filing_type)?;
        self.fetch(&ticker, report_type).await
    }

    /// The archive is always asked which filing is latest; the submission
    /// body is downloaded only if the store does not hold it yet.
    pub async fn fetch(
        &self,
        ticker: &Ticker,
        report_type: ReportType,
    ) -> Result<FilingSubmission, AcquisitionError> {
        let filing = self.archive.latest_filing(ticker, report_type).await?;
        log::debug!(
            "Latest {} for {}: {} filed {}",
            report_type,
            ticker,
            filing.accession_number,
            filing.filing_date
        );

        let key = ArtifactKey::new(ticker.clone(), report_type, filing.filing_date);
        let content = match self.store.get(&key, SUBMISSION_ARTIFACT)? {
            Some(bytes) => {
                log::info!(
                    "Using cached submission {}",
                    self.store.path(&key, SUBMISSION_ARTIFACT).display()
                );
                decode_text(&bytes)
            }
            None => {
                let content = self.archive.download_submission(&filing).await?;
                self.store
                    .put(&key, SUBMISSION_ARTIFACT, content.as_bytes())?;
                content
            }
        };

        Ok(submission_from(filing, content))
    }

    pub async fn recent_filings(
        &self,
        ticker: &str,
        limit: usize,
    ) -> Result<Vec<FilingRef>, AcquisitionError> {
        let ticker = Ticker::new(ticker)?;
        self.archive.recent_filings(&ticker, limit).await
    }
}

fn submission_from(filing: FilingRef, content: String) -> FilingSubmission {
    FilingSubmission {
        ticker: filing.ticker,
        report_type: filing.report_type,
        filing_date: filing.filing_date,
        accession_number: filing.accession_number,
        content,
    }
}
