use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

use super::error::AcquisitionError;
use super::filing::{submissions_url, CompanyFilings, FilingRef};
use super::report::ReportType;
use super::tickers::{Ticker, TickerMaps, TICKERS_FILE, TICKER_URL};
use crate::utils::dirs;
use crate::utils::http::{self, FetchError};

/// The regulatory filing archive, as the pipeline sees it.
#[async_trait]
pub trait FilingArchive: Send + Sync {
    /// Most recent filing of `report_type`. `NotFound` when the ticker is
    /// unknown or has never filed that form.
    async fn latest_filing(
        &self,
        ticker: &Ticker,
        report_type: ReportType,
    ) -> Result<FilingRef, AcquisitionError>;

    /// Most recent periodic filings of any supported form, newest first.
    async fn recent_filings(
        &self,
        ticker: &Ticker,
        limit: usize,
    ) -> Result<Vec<FilingRef>, AcquisitionError>;

    /// Raw submission envelope text.
    async fn download_submission(&self, filing: &FilingRef) -> Result<String, AcquisitionError>;
}

/// SEC EDGAR over HTTPS.
pub struct EdgarArchive {
    client: Client,
    user_agent: String,
    data_dir: PathBuf,
    tickers: RwLock<Option<Arc<TickerMaps>>>,
}

impl EdgarArchive {
    pub fn new(client: Client, user_agent: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            data_dir: data_dir.into(),
            tickers: RwLock::new(None),
        }
    }

    fn tickers_path(&self) -> PathBuf {
        dirs::edgar_dir(&self.data_dir).join(TICKERS_FILE)
    }

    pub async fn ticker_maps(&self) -> Result<Arc<TickerMaps>, AcquisitionError> {
        if let Some(cache) = self.tickers.read().await.as_ref() {
            return Ok(cache.clone());
        }

        let mut write_guard = self.tickers.write().await;
        if let Some(cache) = write_guard.as_ref() {
            return Ok(cache.clone());
        }

        let maps = Arc::new(self.load_ticker_maps().await?);
        log::info!("Loaded {} tickers", maps.len());
        *write_guard = Some(maps.clone());
        Ok(maps)
    }

    async fn load_ticker_maps(&self) -> Result<TickerMaps, AcquisitionError> {
        let path = self.tickers_path();

        if path.exists() {
            log::debug!("Using existing tickers file at {:?}", path);
            let json = std::fs::read_to_string(&path)
                .map_err(|e| AcquisitionError::storage(&path, e))?;
            match TickerMaps::from_json(&json) {
                Ok(maps) => return Ok(maps),
                Err(e) => log::warn!("Cached tickers file is unreadable ({}), refetching", e),
            }
        }

        log::debug!("Downloading tickers from {}", TICKER_URL);
        let url = Url::parse(TICKER_URL).map_err(|e| AcquisitionError::transient(TICKER_URL, e))?;
        http::fetch_and_save(
            &self.client,
            &url,
            &path,
            &self.user_agent,
            &mime::APPLICATION_JSON,
            super::rate_limiter(),
        )
        .await
        .map_err(|e| fetch_error(e, None))?;

        let json =
            std::fs::read_to_string(&path).map_err(|e| AcquisitionError::storage(&path, e))?;
        TickerMaps::from_json(&json).map_err(|e| AcquisitionError::transient(TICKER_URL, e))
    }

    async fn company_filings(
        &self,
        ticker: &Ticker,
        filing_type: &str,
    ) -> Result<CompanyFilings, AcquisitionError> {
        let not_found = || AcquisitionError::NotFound {
            ticker: ticker.to_string(),
            filing_type: filing_type.to_string(),
        };

        let maps = self.ticker_maps().await?;
        let cik = maps.cik_for(ticker).ok_or_else(not_found)?;
        log::debug!("Resolved {} to CIK {}", ticker, cik);

        let url = submissions_url(cik).map_err(|e| AcquisitionError::transient(cik, e))?;
        let body = http::fetch_bytes(
            &self.client,
            &url,
            &self.user_agent,
            &mime::APPLICATION_JSON,
            super::rate_limiter(),
        )
        .await
        .map_err(|e| fetch_error(e, Some(not_found())))?;

        serde_json::from_slice(&body).map_err(|e| {
            log::error!("Failed to parse filings JSON from {}: {}", url, e);
            AcquisitionError::transient(url.as_str(), e)
        })
    }
}

/// 404 means the archive has nothing under that name; every other HTTP or
/// network failure may clear up on retry.
fn fetch_error(err: FetchError, not_found: Option<AcquisitionError>) -> AcquisitionError {
    if let (true, Some(not_found)) = (err.is_not_found(), not_found) {
        return not_found;
    }
    match err {
        FetchError::Io { path, source } => AcquisitionError::storage(path, source),
        FetchError::Status { url, status } => AcquisitionError::transient(url, status),
        FetchError::Network { url, source } => AcquisitionError::transient(url, source),
        FetchError::RateLimiterClosed => AcquisitionError::transient("", "rate limiter closed"),
    }
}

#[async_trait]
impl FilingArchive for EdgarArchive {
    async fn latest_filing(
        &self,
        ticker: &Ticker,
        report_type: ReportType,
    ) -> Result<FilingRef, AcquisitionError> {
        let filings = self.company_filings(ticker, report_type.as_str()).await?;
        filings
            .latest_of_type(ticker, report_type)
            .ok_or_else(|| AcquisitionError::NotFound {
                ticker: ticker.to_string(),
                filing_type: report_type.to_string(),
            })
    }

    async fn recent_filings(
        &self,
        ticker: &Ticker,
        limit: usize,
    ) -> Result<Vec<FilingRef>, AcquisitionError> {
        let filings = self.company_filings(ticker, "periodic").await?;
        Ok(filings
            .periodic_filings(ticker)
            .into_iter()
            .take(limit)
            .collect())
    }

    async fn download_submission(&self, filing: &FilingRef) -> Result<String, AcquisitionError> {
        let url = filing
            .submission_url()
            .map_err(|e| AcquisitionError::transient(&filing.accession_number, e))?;
        log::info!(
            "Downloading {} {} filed {} from {}",
            filing.ticker,
            filing.report_type,
            filing.filing_date,
            url
        );

        let body = http::fetch_bytes(
            &self.client,
            &url,
            &self.user_agent,
            &mime::TEXT_PLAIN,
            super::rate_limiter(),
        )
        .await
        .map_err(|e| {
            fetch_error(
                e,
                Some(AcquisitionError::NotFound {
                    ticker: filing.ticker.to_string(),
                    filing_type: filing.report_type.to_string(),
                }),
            )
        })?;

        Ok(http::decode_text(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_not_found_status_maps_to_not_found() {
        let err = FetchError::Status {
            url: "https://data.sec.gov/submissions/CIK0000000001.json".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        let mapped = fetch_error(
            err,
            Some(AcquisitionError::NotFound {
                ticker: "ZZZZ".to_string(),
                filing_type: "10-K".to_string(),
            }),
        );
        assert!(matches!(mapped, AcquisitionError::NotFound { .. }));
    }

    #[test]
    fn test_missing_ticker_file_keeps_its_url() {
        let err = FetchError::Status {
            url: TICKER_URL.to_string(),
            status: StatusCode::NOT_FOUND,
        };
        match fetch_error(err, None) {
            AcquisitionError::TransientFetchError { url, reason } => {
                assert_eq!(url, TICKER_URL);
                assert!(reason.contains("404"));
            }
            other => panic!("expected TransientFetchError, got {:?}", other),
        }
    }

    #[test]
    fn test_server_errors_are_retryable() {
        for status in [StatusCode::TOO_MANY_REQUESTS, StatusCode::SERVICE_UNAVAILABLE] {
            let err = FetchError::Status {
                url: "https://www.sec.gov".to_string(),
                status,
            };
            assert!(fetch_error(err, None).is_retryable());
        }
    }

    #[tokio::test]
    async fn test_cached_ticker_file_is_used() {
        let tmp = tempfile::tempdir().unwrap();
        let edgar_dir = dirs::edgar_dir(tmp.path());
        std::fs::create_dir_all(&edgar_dir).unwrap();
        std::fs::write(
            edgar_dir.join(TICKERS_FILE),
            r#"{"0": {"cik_str": 1045810, "ticker": "NVDA", "title": "NVIDIA CORP"}}"#,
        )
        .unwrap();

        let archive = EdgarArchive::new(Client::new(), "test@example.com", tmp.path());
        let maps = archive.ticker_maps().await.unwrap();
        assert_eq!(
            maps.cik_for(&Ticker::new("NVDA").unwrap()),
            Some("0001045810")
        );
    }
}
