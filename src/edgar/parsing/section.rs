use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

use super::text::{collapse_whitespace, strip_page_number};
use super::types::{NormalizedText, SectionExcerpt};
use crate::edgar::error::LocatorError;
use crate::edgar::report::ReportType;

pub const DEFAULT_MIN_LENGTH: usize = 1_000;

/// Filings list every item once in the table of contents before the real
/// header, so the second marker occurrence is the section itself.
pub const DEFAULT_OCCURRENCE: usize = 2;

pub const RISK_FACTORS_MAX_LENGTH: usize = 15_000;
pub const MDA_MAX_LENGTH: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum SectionKind {
    RiskFactors,
    ManagementDiscussion,
}

impl SectionKind {
    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::RiskFactors => "Risk Factors",
            SectionKind::ManagementDiscussion => "MD&A",
        }
    }

    pub fn item(&self, report_type: ReportType) -> &'static str {
        match (self, report_type.is_quarterly()) {
            (SectionKind::RiskFactors, false) => "Item 1A",
            (SectionKind::RiskFactors, true) => "Part II, Item 1A",
            (SectionKind::ManagementDiscussion, false) => "Item 7",
            (SectionKind::ManagementDiscussion, true) => "Part I, Item 2",
        }
    }

    /// Marker set for this item in the given form, with the given excerpt cap.
    ///
    /// Quarterly reports number their items differently: MD&A is Part I
    /// Item 2 and Risk Factors is Part II Item 1A. Their start markers also
    /// require the item title, since a 10-Q repeats `Item 2` in both parts
    /// and cross-references annual-report items by number.
    pub fn spec(&self, report_type: ReportType, max_length: usize) -> SectionSpec {
        let spec = match (self, report_type.is_quarterly()) {
            (SectionKind::RiskFactors, false) => SectionSpec::new(
                self.title(),
                r"\bitem\s+1a\b",
                &[r"\bitem\s+1b\b"],
                r"item\s+1a\s*[.:]?\s*risk\s+factors\s*[.:]?",
                max_length,
            ),
            (SectionKind::RiskFactors, true) => SectionSpec::new(
                self.title(),
                r"\bitem\s+1a\s*[.:]?\s*risk\s+factors\b",
                &[r"\bitem\s+2\b"],
                r"item\s+1a\s*[.:]?\s*risk\s+factors\s*[.:]?",
                max_length,
            ),
            (SectionKind::ManagementDiscussion, false) => SectionSpec::new(
                self.title(),
                r"\bitem\s+7\b",
                &[r"\bitem\s+7a\b", r"\bitem\s+8\b"],
                r"item\s+7\s*[.:]?.{0,200}?results\s+of\s+operations\s*[.:]?",
                max_length,
            ),
            (SectionKind::ManagementDiscussion, true) => SectionSpec::new(
                self.title(),
                r"\bitem\s+2\s*[.:]?\s*management\S*\s+discussion\b",
                &[r"\bitem\s+3\b", r"\bitem\s+4\b"],
                r"item\s+2\s*[.:]?.{0,200}?results\s+of\s+operations\s*[.:]?",
                max_length,
            ),
        };
        spec.expect("built-in section patterns compile")
    }

    pub fn default_max_length(&self) -> usize {
        match self {
            SectionKind::RiskFactors => RISK_FACTORS_MAX_LENGTH,
            SectionKind::ManagementDiscussion => MDA_MAX_LENGTH,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// How to find one section: where it starts, what may end it, and how much
/// of it to keep.
///
/// All patterns are compiled case-insensitively. `header_strip` is anchored
/// to the start of the excerpt.
#[derive(Debug, Clone)]
pub struct SectionSpec {
    pub name: String,
    pub start_marker: Regex,
    /// Tried in order; the first pattern that matches at all wins, even if a
    /// later pattern matches closer to the start.
    pub end_markers: Vec<Regex>,
    pub header_strip: Regex,
    pub max_length: usize,
    pub min_length: usize,
    /// 1-based index of the start-marker match taken as the real header.
    pub occurrence: usize,
}

impl SectionSpec {
    pub fn new(
        name: &str,
        start_marker: &str,
        end_markers: &[&str],
        header_strip: &str,
        max_length: usize,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_string(),
            start_marker: case_insensitive(start_marker)?,
            end_markers: end_markers
                .iter()
                .map(|pattern| case_insensitive(pattern))
                .collect::<Result<Vec<_>, _>>()?,
            header_strip: case_insensitive(&format!(r"\A(?:{})\s*", header_strip))?,
            max_length,
            min_length: DEFAULT_MIN_LENGTH,
            occurrence: DEFAULT_OCCURRENCE,
        })
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_occurrence(mut self, occurrence: usize) -> Self {
        self.occurrence = occurrence.max(1);
        self
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Cuts one section out of normalized filing text.
///
/// The `occurrence`-th start-marker match is taken as the section header.
/// This assumes exactly one earlier reference (the table of contents); a
/// filing with none, or with several cross-references before the header,
/// resolves to the wrong place.
pub fn locate_section(
    text: &NormalizedText,
    spec: &SectionSpec,
) -> Result<SectionExcerpt, LocatorError> {
    let text = text.as_str();
    let occurrence = spec.occurrence.max(1);

    let matches: Vec<_> = spec.start_marker.find_iter(text).collect();
    log::debug!(
        "{}: found {} start marker occurrences",
        spec.name,
        matches.len()
    );

    if matches.len() < occurrence {
        return Err(LocatorError::SectionNotFound {
            section: spec.name.clone(),
            found: matches.len(),
            required: occurrence,
        });
    }

    let start_match = matches[occurrence - 1];
    let start_pos = start_match.start();
    let search_from = start_match.end();
    let following = &text[search_from..];

    let end_pos = spec
        .end_markers
        .iter()
        .find_map(|marker| marker.find(following))
        .map(|m| search_from + m.start())
        .ok_or_else(|| LocatorError::SectionBoundaryNotFound {
            section: spec.name.clone(),
        })?;

    log::debug!(
        "{}: extracted from position {} to {}",
        spec.name,
        start_pos,
        end_pos
    );

    let cleaned = collapse_whitespace(&text[start_pos..end_pos]);
    let stripped = spec.header_strip.replace(&cleaned, "");
    let body = strip_page_number(stripped.trim());

    let length = body.chars().count();
    if length < spec.min_length {
        return Err(LocatorError::SectionTooShort {
            section: spec.name.clone(),
            length,
            minimum: spec.min_length,
        });
    }

    let (raw_excerpt, truncated) = truncate_chars(&body, spec.max_length);
    if truncated {
        log::debug!(
            "{}: truncated from {} to {} characters",
            spec.name,
            length,
            spec.max_length
        );
    }

    Ok(SectionExcerpt {
        section: spec.name.clone(),
        raw_excerpt: raw_excerpt.to_string(),
        truncated,
        start: start_pos,
        end: end_pos,
    })
}

fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}
