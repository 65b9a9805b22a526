use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::error::AcquisitionError;

pub const TICKER_URL: &str = "https://www.sec.gov/files/company_tickers.json";
pub const TICKERS_FILE: &str = "company_tickers.json";

/// Exchange symbol, upper case. Share classes keep their hyphen (`BRK-B`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn new(ticker: impl AsRef<str>) -> Result<Self, AcquisitionError> {
        let raw = ticker.as_ref().trim();
        let uppercase_ticker = raw.to_uppercase();
        if uppercase_ticker.is_empty() {
            return Err(AcquisitionError::InvalidRequest(
                "ticker cannot be empty".to_string(),
            ));
        }
        // Hyphens only join alphanumeric runs: `BRK-B`, never `-A` or `A-`.
        let well_formed = uppercase_ticker
            .split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
        if !well_formed {
            return Err(AcquisitionError::InvalidRequest(format!(
                "ticker must be alphanumeric, with hyphens only between characters: {:?}",
                raw
            )));
        }
        Ok(Ticker(uppercase_ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Ticker {
    type Err = AcquisitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ticker::new(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Ticker::new(s).map_err(|e| e.to_string())
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

#[derive(Debug, Deserialize)]
struct TickerRecord {
    cik_str: u64,
    ticker: String,
    title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    /// Zero-padded to ten digits, as the submissions API expects.
    pub cik: String,
    pub name: String,
}

/// Ticker to CIK lookup built from the archive's `company_tickers.json`.
#[derive(Debug, Clone, Default)]
pub struct TickerMaps {
    ticker_to_cik: HashMap<Ticker, CompanyRecord>,
}

impl TickerMaps {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: HashMap<String, TickerRecord> = serde_json::from_str(json)?;
        log::debug!("Found {} ticker entries", records.len());

        let mut ticker_to_cik = HashMap::with_capacity(records.len());
        for record in records.into_values() {
            let ticker = match Ticker::new(&record.ticker) {
                Ok(ticker) => ticker,
                Err(_) => {
                    log::debug!("Skipping unusable ticker {:?}", record.ticker);
                    continue;
                }
            };
            ticker_to_cik.insert(
                ticker,
                CompanyRecord {
                    cik: format!("{:010}", record.cik_str),
                    name: record.title,
                },
            );
        }

        Ok(TickerMaps { ticker_to_cik })
    }

    pub fn insert(&mut self, ticker: Ticker, cik: u64, name: impl Into<String>) {
        self.ticker_to_cik.insert(
            ticker,
            CompanyRecord {
                cik: format!("{:010}", cik),
                name: name.into(),
            },
        );
    }

    pub fn get(&self, ticker: &Ticker) -> Option<&CompanyRecord> {
        self.ticker_to_cik.get(ticker)
    }

    pub fn cik_for(&self, ticker: &Ticker) -> Option<&str> {
        self.get(ticker).map(|record| record.cik.as_str())
    }

    pub fn len(&self) -> usize {
        self.ticker_to_cik.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticker_to_cik.is_empty()
    }
}
