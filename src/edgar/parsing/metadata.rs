use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{FilingMetadata, MetadataField, NormalizedText};

static FISCAL_YEAR_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)fiscal\s+year\s+ended?\s+(\w+\s+\d+,?\s+\d{4})")
        .expect("valid fiscal year regex")
});

const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%B %d %Y", "%b %d, %Y", "%b %d %Y"];

/// Reads the fiscal year end date from the cover page wording
/// ("for the fiscal year ended January 28, 2024").
///
/// Only the first phrase is used. The captured text is kept verbatim; the
/// parsed date is filled in when it reads as a calendar date. The size is
/// that of the text; callers holding the raw document may overwrite it.
pub fn extract_metadata(text: &NormalizedText) -> FilingMetadata {
    let document_size_kb = text.len() as f64 / 1024.0;

    let captured = FISCAL_YEAR_END_RE
        .captures(text.as_str())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    match captured {
        Some(value) => {
            let date = parse_date(&value);
            log::debug!("Fiscal year end: {} (parsed: {:?})", value, date);
            FilingMetadata {
                fiscal_year_end: MetadataField::Found(value),
                fiscal_year_end_date: date,
                document_size_kb,
            }
        }
        None => {
            log::debug!("No fiscal year end phrase in filing text");
            FilingMetadata {
                fiscal_year_end: MetadataField::NotFound,
                fiscal_year_end_date: None,
                document_size_kb,
            }
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_fiscal_year_end() {
        let text = NormalizedText::new(
            "ANNUAL REPORT PURSUANT TO SECTION 13 For the fiscal year ended January 28, 2024 OR",
        );
        let metadata = extract_metadata(&text);
        assert_eq!(
            metadata.fiscal_year_end,
            MetadataField::Found("January 28, 2024".to_string())
        );
        assert_eq!(
            metadata.fiscal_year_end_date,
            NaiveDate::from_ymd_opt(2024, 1, 28)
        );
    }

    #[test]
    fn test_accepts_end_and_missing_comma() {
        let text = NormalizedText::new("For the Fiscal Year End September 30 2023");
        let metadata = extract_metadata(&text);
        assert_eq!(metadata.fiscal_year_end.as_option(), Some("September 30 2023"));
        assert_eq!(
            metadata.fiscal_year_end_date,
            NaiveDate::from_ymd_opt(2023, 9, 30)
        );
    }

    #[test]
    fn test_first_phrase_wins() {
        let text = NormalizedText::new(
            "fiscal year ended December 31, 2023 compared to fiscal year ended December 31, 2022",
        );
        assert_eq!(
            extract_metadata(&text).fiscal_year_end.as_option(),
            Some("December 31, 2023")
        );
    }

    #[test]
    fn test_missing_phrase_is_not_found() {
        let metadata = extract_metadata(&NormalizedText::new("quarterly report for the period"));
        assert_eq!(metadata.fiscal_year_end, MetadataField::NotFound);
        assert!(metadata.fiscal_year_end_date.is_none());
        assert_eq!(metadata.fiscal_year_end.to_string(), "Not found");
        assert!(metadata.document_size_kb > 0.0);
    }

    #[test]
    fn test_unparseable_date_keeps_text() {
        let metadata = extract_metadata(&NormalizedText::new("fiscal year ended Q4 28, 2024"));
        assert_eq!(metadata.fiscal_year_end.as_option(), Some("Q4 28, 2024"));
        assert!(metadata.fiscal_year_end_date.is_none());
    }
}
