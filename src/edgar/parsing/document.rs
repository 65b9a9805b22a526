use once_cell::sync::Lazy;
use regex::Regex;

use super::types::EmbeddedDocument;
use crate::edgar::error::UnwrapError;

static DOCUMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<DOCUMENT>(.*?)</DOCUMENT>").expect("valid document regex"));

// The closing tag is optional: truncated submissions run to the end of the container.
static TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<TEXT>(.*?)(?:</TEXT>|\z)").expect("valid text regex"));

const ELEMENTS_LIST: &[(&str, &str)] = &[
    ("TYPE", "<TYPE>"),
    ("FILENAME", "<FILENAME>"),
    ("DESCRIPTION", "<DESCRIPTION>"),
];

/// Pulls the primary document out of a raw submission envelope.
///
/// The envelope may carry several `<DOCUMENT>` containers (the report itself,
/// exhibits, XBRL instances, graphics). The container with the most
/// characters is taken as the primary document; on a tie the earliest wins.
pub fn unwrap(submission: &str) -> Result<EmbeddedDocument, UnwrapError> {
    let mut largest: Option<(&str, usize)> = None;

    for (i, container) in DOCUMENT_RE.captures_iter(submission).enumerate() {
        let body = container.get(1).map(|m| m.as_str()).unwrap_or("");
        let length = body.chars().count();
        log::debug!("Found document container {} with {} characters", i, length);

        match largest {
            Some((_, best)) if best >= length => {}
            _ => largest = Some((body, length)),
        }
    }

    let (container, length) = largest.ok_or(UnwrapError::NoEmbeddedDocument)?;
    log::debug!("Selected primary document with {} characters", length);

    Ok(parse_container(container))
}

/// Every document container in the submission, in order of appearance.
pub fn list_documents(submission: &str) -> Vec<EmbeddedDocument> {
    DOCUMENT_RE
        .captures_iter(submission)
        .filter_map(|caps| caps.get(1))
        .map(|container| parse_container(container.as_str()))
        .collect()
}

fn parse_container(container: &str) -> EmbeddedDocument {
    let (header, raw_markup) = match TEXT_RE.captures(container) {
        Some(caps) => {
            let header_end = caps.get(0).map(|m| m.start()).unwrap_or(0);
            let body = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            (&container[..header_end], body)
        }
        None => (container, container),
    };

    EmbeddedDocument {
        doc_type: element_value(header, "TYPE"),
        filename: element_value(header, "FILENAME"),
        description: element_value(header, "DESCRIPTION"),
        raw_markup: raw_markup.to_string(),
    }
}

fn element_value(header: &str, element: &str) -> Option<String> {
    let (_, tag) = ELEMENTS_LIST.iter().find(|(name, _)| *name == element)?;
    header
        .split(tag)
        .nth(1)
        .and_then(|s| s.split(|c: char| c == '\n' || c == '<').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(doc_type: &str, body: &str) -> String {
        format!(
            "<DOCUMENT>\n<TYPE>{}\n<SEQUENCE>1\n<FILENAME>{}.htm\n<TEXT>\n{}\n</TEXT>\n</DOCUMENT>\n",
            doc_type,
            doc_type.to_lowercase(),
            body
        )
    }

    #[test]
    fn test_unwrap_selects_largest_document() {
        let exhibit = "x".repeat(500);
        let report = "y".repeat(50_000);
        let submission = format!(
            "<SEC-DOCUMENT>\n{}{}</SEC-DOCUMENT>",
            container("EX-21", &exhibit),
            container("10-K", &report)
        );

        let doc = unwrap(&submission).unwrap();
        assert_eq!(doc.raw_markup.trim(), report);
        assert_eq!(doc.doc_type.as_deref(), Some("10-K"));
        assert_eq!(doc.filename.as_deref(), Some("10-k.htm"));
    }

    #[test]
    fn test_unwrap_tie_keeps_first() {
        let submission = format!(
            "{}{}",
            container("10-K", "first body"),
            container("10-Q", "other body")
        );
        let doc = unwrap(&submission).unwrap();
        assert_eq!(doc.raw_markup.trim(), "first body");
        assert_eq!(doc.doc_type.as_deref(), Some("10-K"));
    }

    #[test]
    fn test_unwrap_missing_text_close_takes_remainder() {
        let submission =
            "<DOCUMENT>\n<TYPE>10-K\n<TEXT>\n<html>Item 1A risk</html>\ntrailing part\n</DOCUMENT>";
        let doc = unwrap(submission).unwrap();
        assert!(doc.raw_markup.contains("<html>Item 1A risk</html>"));
        assert!(doc.raw_markup.contains("trailing part"));
    }

    #[test]
    fn test_unwrap_without_text_tag_returns_container() {
        let submission = "<DOCUMENT>\n<TYPE>10-K\nplain body\n</DOCUMENT>";
        let doc = unwrap(submission).unwrap();
        assert!(doc.raw_markup.contains("plain body"));
    }

    #[test]
    fn test_unwrap_no_documents() {
        assert_eq!(
            unwrap("<SEC-HEADER>nothing here</SEC-HEADER>").unwrap_err(),
            UnwrapError::NoEmbeddedDocument
        );
    }

    #[test]
    fn test_unwrap_is_case_sensitive() {
        let submission = "<document><text>lowercase</text></document>";
        assert!(unwrap(submission).is_err());
    }

    #[test]
    fn test_list_documents_in_order() {
        let submission = format!(
            "{}{}",
            container("10-K", "report"),
            container("EX-31.1", "certification")
        );
        let docs = list_documents(&submission);
        let types: Vec<_> = docs.iter().map(|d| d.doc_type.clone().unwrap()).collect();
        assert_eq!(types, vec!["10-K", "EX-31.1"]);
    }
}
