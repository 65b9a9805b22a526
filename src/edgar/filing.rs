use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

use super::report::ReportType;
use super::tickers::Ticker;

pub const EDGAR_DATA_URL: &str = "https://data.sec.gov";
pub const EDGAR_ARCHIVES_URL: &str = "https://www.sec.gov/Archives/edgar/data";

/// `submissions/CIK##########.json`, trimmed to the fields the pipeline reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyFilings {
    pub cik: String,
    pub name: String,
    #[serde(default)]
    pub tickers: Vec<String>,
    pub filings: FilingsData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingsData {
    pub recent: FilingEntry,
}

/// Column-oriented: index `i` of every vector describes the same filing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilingEntry {
    #[serde(rename = "accessionNumber")]
    pub accession_number: Vec<String>,
    #[serde(rename = "filingDate")]
    pub filing_date: Vec<String>,
    #[serde(rename = "reportDate", default)]
    pub report_date: Vec<String>,
    #[serde(rename = "form")]
    pub form: Vec<String>,
    #[serde(rename = "primaryDocument", default)]
    pub primary_document: Vec<String>,
}

/// One filing in the archive, enough to download it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRef {
    pub ticker: Ticker,
    pub cik: String,
    pub company_name: String,
    pub report_type: ReportType,
    pub accession_number: String,
    pub filing_date: NaiveDate,
    pub report_date: Option<NaiveDate>,
    pub primary_document: Option<String>,
}

impl FilingRef {
    fn folder_url(&self) -> String {
        format!(
            "{}/{}/{}",
            EDGAR_ARCHIVES_URL,
            self.cik.trim_start_matches('0'),
            self.accession_number.replace('-', "")
        )
    }

    /// The complete submission text file (`<accession>.txt`).
    pub fn submission_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}/{}.txt",
            self.folder_url(),
            self.accession_number
        ))
    }

    pub fn index_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}/{}-index.htm",
            self.folder_url(),
            self.accession_number
        ))
    }
}

pub fn submissions_url(cik: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/submissions/CIK{:0>10}.json",
        EDGAR_DATA_URL, cik
    ))
}

impl CompanyFilings {
    /// Every supported periodic filing, newest first. Other forms and rows
    /// with an unreadable filing date are skipped.
    pub fn periodic_filings(&self, ticker: &Ticker) -> Vec<FilingRef> {
        let recent = &self.filings.recent;
        let mut filings: Vec<FilingRef> = recent
            .form
            .iter()
            .enumerate()
            .filter_map(|(i, form)| {
                let report_type = ReportType::from_str(form).ok()?;
                let accession_number = recent.accession_number.get(i)?.clone();
                let filing_date = recent
                    .filing_date
                    .get(i)
                    .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())?;
                let report_date = recent
                    .report_date
                    .get(i)
                    .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
                let primary_document = recent
                    .primary_document
                    .get(i)
                    .filter(|d| !d.is_empty())
                    .cloned();

                Some(FilingRef {
                    ticker: ticker.clone(),
                    cik: format!("{:0>10}", self.cik),
                    company_name: self.name.clone(),
                    report_type,
                    accession_number,
                    filing_date,
                    report_date,
                    primary_document,
                })
            })
            .collect();

        filings.sort_by(|a, b| b.filing_date.cmp(&a.filing_date));
        filings
    }

    pub fn latest_of_type(&self, ticker: &Ticker, report_type: ReportType) -> Option<FilingRef> {
        self.periodic_filings(ticker)
            .into_iter()
            .find(|f| f.report_type == report_type)
    }
}
