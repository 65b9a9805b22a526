use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::SubmissionHeader;

static SEC_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:SEC-HEADER|IMS-HEADER)>(.*?)</(?:SEC-HEADER|IMS-HEADER)>")
        .expect("valid header regex")
});

/// Reads the `KEY: value` lines of the submission's `<SEC-HEADER>` block.
///
/// Group lines such as `FILER:` carry no value and are skipped, as are
/// embedded tags like `<ACCEPTANCE-DATETIME>`. A submission without a header
/// yields an empty result.
pub fn parse_sec_header(submission: &str) -> SubmissionHeader {
    let mut entries = Vec::new();

    if let Some(header) = SEC_HEADER_RE.captures(submission).and_then(|c| c.get(1)) {
        for line in header.as_str().lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('<') {
                continue;
            }
            if let Some(colon_idx) = line.find(':') {
                let key = line[..colon_idx].trim();
                let value = line[colon_idx + 1..].trim();
                if key.is_empty() || value.is_empty() {
                    continue;
                }
                entries.push((key.to_string(), decode_html_entities(value).into_owned()));
            }
        }
    }

    log::debug!("Parsed {} submission header entries", entries.len());
    SubmissionHeader { entries }
}
