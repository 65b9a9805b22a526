use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use strum::IntoEnumIterator;

use super::acquire::FilingFetcher;
use super::error::{LocatorError, PipelineError, UnwrapError};
use super::parsing::{
    self, EmbeddedDocument, FilingMetadata, FilingSubmission, SectionExcerpt, SectionKind,
    SectionSpec,
};
use super::report::ReportType;
use super::store::{ArtifactKey, DOCUMENT_ARTIFACT};
use super::tickers::Ticker;

#[derive(Debug, Clone, Serialize)]
pub struct SectionOutcome {
    pub kind: SectionKind,
    pub result: Result<SectionExcerpt, LocatorError>,
}

/// Everything the brief needs from one filing.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedFiling {
    pub ticker: Ticker,
    pub report_type: ReportType,
    pub filing_date: NaiveDate,
    pub accession_number: String,
    pub company_name: Option<String>,
    pub period_of_report: Option<String>,
    pub metadata: FilingMetadata,
    pub document_path: Option<PathBuf>,
    pub sections: Vec<SectionOutcome>,
}

impl ExtractedFiling {
    pub fn section(&self, kind: SectionKind) -> Option<&Result<SectionExcerpt, LocatorError>> {
        self.sections
            .iter()
            .find(|outcome| outcome.kind == kind)
            .map(|outcome| &outcome.result)
    }

    pub fn excerpt(&self, kind: SectionKind) -> Option<&SectionExcerpt> {
        self.section(kind).and_then(|result| result.as_ref().ok())
    }
}

/// Fetch, unwrap, normalize, then locate each configured section.
///
/// Section markers follow the form being extracted; a spec set with
/// [`FilingPipeline::with_section`] replaces them for every form.
/// Section failures are recorded per section and never fail the run.
pub struct FilingPipeline {
    fetcher: FilingFetcher,
    risk_factors_max: usize,
    mda_max: usize,
    overrides: HashMap<SectionKind, SectionSpec>,
}

impl FilingPipeline {
    /// Risk Factors and MD&A with their default caps.
    pub fn new(fetcher: FilingFetcher) -> Self {
        Self::with_section_limits(
            fetcher,
            SectionKind::RiskFactors.default_max_length(),
            SectionKind::ManagementDiscussion.default_max_length(),
        )
    }

    pub fn with_section_limits(fetcher: FilingFetcher, risk_factors: usize, mda: usize) -> Self {
        Self {
            fetcher,
            risk_factors_max: risk_factors,
            mda_max: mda,
            overrides: HashMap::new(),
        }
    }

    pub fn with_section(mut self, kind: SectionKind, spec: SectionSpec) -> Self {
        self.overrides.insert(kind, spec);
        self
    }

    /// Specs used to section a filing of `report_type`, in output order.
    pub fn section_specs(&self, report_type: ReportType) -> Vec<(SectionKind, SectionSpec)> {
        SectionKind::iter()
            .map(|kind| {
                let spec = match self.overrides.get(&kind) {
                    Some(spec) => spec.clone(),
                    None => kind.spec(report_type, self.max_length(kind)),
                };
                (kind, spec)
            })
            .collect()
    }

    fn max_length(&self, kind: SectionKind) -> usize {
        match kind {
            SectionKind::RiskFactors => self.risk_factors_max,
            SectionKind::ManagementDiscussion => self.mda_max,
        }
    }

    pub fn fetcher(&self) -> &FilingFetcher {
        &self.fetcher
    }

    pub async fn run(&self, ticker: &str, filing_type: &str) -> Result<ExtractedFiling, PipelineError> {
        let submission = self.fetcher.fetch_latest(ticker, filing_type).await?;
        log::info!(
            "Fetched {} {} ({:.1} KB)",
            submission.ticker,
            submission.report_type,
            submission.size_kb()
        );

        let document = parsing::unwrap(&submission.content)?;
        let document_path = self.cache_document(&submission, &document);

        let mut filing = self.extract_document(&submission, &document);
        filing.document_path = document_path;
        Ok(filing)
    }

    /// The synchronous half of [`FilingPipeline::run`], for a submission
    /// already in hand.
    pub fn extract(&self, submission: &FilingSubmission) -> Result<ExtractedFiling, UnwrapError> {
        let document = parsing::unwrap(&submission.content)?;
        Ok(self.extract_document(submission, &document))
    }

    fn extract_document(
        &self,
        submission: &FilingSubmission,
        document: &EmbeddedDocument,
    ) -> ExtractedFiling {
        let header = parsing::parse_sec_header(&submission.content);
        let text = parsing::normalize(document);
        log::debug!("Normalized document to {} characters", text.len());

        let mut metadata = parsing::extract_metadata(&text);
        metadata.document_size_kb = document.size_kb();

        let sections = self
            .section_specs(submission.report_type)
            .into_iter()
            .map(|(kind, spec)| {
                let result = parsing::locate_section(&text, &spec);
                match &result {
                    Ok(excerpt) => log::info!(
                        "{}: {} characters{}",
                        kind,
                        excerpt.char_len(),
                        if excerpt.truncated { " (truncated)" } else { "" }
                    ),
                    Err(e) => log::warn!("{}", e),
                }
                SectionOutcome { kind, result }
            })
            .collect();

        ExtractedFiling {
            ticker: submission.ticker.clone(),
            report_type: submission.report_type,
            filing_date: submission.filing_date,
            accession_number: submission.accession_number.clone(),
            company_name: header.company_name().map(str::to_string),
            period_of_report: header.period_of_report().map(str::to_string),
            metadata,
            document_path: None,
            sections,
        }
    }

    fn cache_document(
        &self,
        submission: &FilingSubmission,
        document: &EmbeddedDocument,
    ) -> Option<PathBuf> {
        let key = ArtifactKey::new(
            submission.ticker.clone(),
            submission.report_type,
            submission.filing_date,
        );
        match self
            .fetcher
            .store()
            .put(&key, DOCUMENT_ARTIFACT, document.raw_markup.as_bytes())
        {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Could not cache extracted document: {}", e);
                None
            }
        }
    }
}
