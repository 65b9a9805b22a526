use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::edgar::report::ReportType;
use crate::edgar::tickers::Ticker;

/// Raw filing envelope as downloaded from the archive.
#[derive(Debug, Clone)]
pub struct FilingSubmission {
    pub ticker: Ticker,
    pub report_type: ReportType,
    pub filing_date: NaiveDate,
    pub accession_number: String,
    pub content: String,
}

impl FilingSubmission {
    pub fn size_kb(&self) -> f64 {
        self.content.len() as f64 / 1024.0
    }
}

/// The primary document pulled out of a submission envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedDocument {
    pub doc_type: Option<String>,
    pub filename: Option<String>,
    pub description: Option<String>,
    pub raw_markup: String,
}

impl EmbeddedDocument {
    pub fn from_markup(raw_markup: impl Into<String>) -> Self {
        Self {
            doc_type: None,
            filename: None,
            description: None,
            raw_markup: raw_markup.into(),
        }
    }

    pub fn size_kb(&self) -> f64 {
        self.raw_markup.len() as f64 / 1024.0
    }
}

/// Flat, whitespace-collapsed text of a filing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Wraps text that is already flat. Use [`super::text::normalize`] for markup.
    pub fn new(text: impl Into<String>) -> Self {
        NormalizedText(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bounded slice of a filing for one named section.
///
/// `start` and `end` are byte offsets into the [`NormalizedText`] the excerpt
/// was cut from; `raw_excerpt` is the cleaned, possibly truncated, body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionExcerpt {
    pub section: String,
    pub raw_excerpt: String,
    pub truncated: bool,
    pub start: usize,
    pub end: usize,
}

impl SectionExcerpt {
    pub fn char_len(&self) -> usize {
        self.raw_excerpt.chars().count()
    }
}

/// A metadata value that may legitimately be absent from a filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataField {
    Found(String),
    NotFound,
}

impl MetadataField {
    pub fn as_option(&self) -> Option<&str> {
        match self {
            MetadataField::Found(value) => Some(value),
            MetadataField::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, MetadataField::Found(_))
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataField::Found(value) => write!(f, "{}", value),
            MetadataField::NotFound => write!(f, "Not found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingMetadata {
    pub fiscal_year_end: MetadataField,
    /// Set when `fiscal_year_end` reads as a calendar date.
    pub fiscal_year_end_date: Option<NaiveDate>,
    pub document_size_kb: f64,
}

/// Key/value pairs from the `<SEC-HEADER>` block of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionHeader {
    pub entries: Vec<(String, String)>,
}

impl SubmissionHeader {
    /// First value whose key matches `key`, ignoring case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn company_name(&self) -> Option<&str> {
        self.get("COMPANY CONFORMED NAME")
    }

    pub fn period_of_report(&self) -> Option<&str> {
        self.get("CONFORMED PERIOD OF REPORT")
    }

    pub fn fiscal_year_end(&self) -> Option<&str> {
        self.get("FISCAL YEAR END")
    }
}
