#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use research::edgar::{AcquisitionError, FilingArchive, FilingRef, ReportType, Ticker};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn sentence_block(sentence: &str, repeat: usize) -> String {
    vec![sentence; repeat].join(" ")
}

/// A complete 10-K envelope: header, a table of contents that mentions every
/// item once, the real item headings, and a small exhibit.
pub fn ten_k_submission() -> String {
    let risk = sentence_block(
        "Our business depends on demand for accelerated computing and may suffer if that demand weakens.",
        30,
    );
    let mda = sentence_block(
        "Revenue increased year over year driven by data center sales and higher gross margin.",
        30,
    );

    format!(
        "<SEC-DOCUMENT>0000000001-24-000001.txt : 20240221
<SEC-HEADER>0000000001-24-000001.hdr.sgml : 20240221
CONFORMED SUBMISSION TYPE:\t10-K
CONFORMED PERIOD OF REPORT:\t20240128
FILER:
\tCOMPANY DATA:
\t\tCOMPANY CONFORMED NAME:\t\t\tEXAMPLE SEMICONDUCTOR CORP
\t\tFISCAL YEAR END:\t\t\t0128
</SEC-HEADER>
<DOCUMENT>
<TYPE>10-K
<FILENAME>exmp-20240128.htm
<TEXT>
<html><body>
<p>Annual report for the fiscal year ended January 28, 2024</p>
<table>
<tr><td>Item 1A.</td><td>Risk Factors</td><td>12</td></tr>
<tr><td>Item 1B.</td><td>Unresolved Staff Comments</td><td>30</td></tr>
<tr><td>Item 7.</td><td>Management&#8217;s Discussion and Analysis of Financial Condition and Results of Operations</td><td>35</td></tr>
<tr><td>Item 7A.</td><td>Quantitative and Qualitative Disclosures About Market Risk</td><td>50</td></tr>
<tr><td>Item 8.</td><td>Financial Statements and Supplementary Data</td><td>52</td></tr>
</table>
<p>Item 1A. Risk Factors</p>
<p>{risk}</p>
<p>12</p>
<p>Item 1B. Unresolved Staff Comments</p>
<p>None.</p>
<p>Item 7. Management&#8217;s Discussion and Analysis of Financial Condition and Results of Operations</p>
<p>{mda}</p>
<p>Item 7A. Quantitative and Qualitative Disclosures About Market Risk</p>
<p>Interest rate exposure is limited.</p>
<p>Item 8. Financial Statements and Supplementary Data</p>
</body></html>
</TEXT>
</DOCUMENT>
<DOCUMENT>
<TYPE>EX-21.1
<FILENAME>ex21.htm
<TEXT>
<html><body><p>Subsidiaries of the registrant.</p></body></html>
</TEXT>
</DOCUMENT>
</SEC-DOCUMENT>
",
        risk = risk,
        mda = mda
    )
}

/// A 10-Q envelope. Part I cross-references the annual report's Item 7
/// before the quarterly MD&A, and both parts have an Item 2.
pub fn ten_q_submission() -> String {
    let mda = sentence_block(
        "Quarterly revenue grew on data center demand while operating expenses rose with headcount.",
        30,
    );
    let risk = sentence_block(
        "Export controls introduced this quarter may limit sales of our products in certain regions.",
        30,
    );

    format!(
        "<SEC-DOCUMENT>0000000001-24-000020.txt : 20240529
<SEC-HEADER>0000000001-24-000020.hdr.sgml : 20240529
CONFORMED SUBMISSION TYPE:\t10-Q
CONFORMED PERIOD OF REPORT:\t20240428
FILER:
\tCOMPANY DATA:
\t\tCOMPANY CONFORMED NAME:\t\t\tEXAMPLE SEMICONDUCTOR CORP
</SEC-HEADER>
<DOCUMENT>
<TYPE>10-Q
<FILENAME>exmp-20240428.htm
<TEXT>
<html><body>
<p>Quarterly report for the quarterly period ended April 28, 2024</p>
<table>
<tr><td>PART I</td><td>Item 1.</td><td>Financial Statements</td><td>3</td></tr>
<tr><td>Item 2.</td><td>Management&#8217;s Discussion and Analysis of Financial Condition and Results of Operations</td><td>18</td></tr>
<tr><td>Item 3.</td><td>Quantitative and Qualitative Disclosures About Market Risk</td><td>27</td></tr>
<tr><td>Item 4.</td><td>Controls and Procedures</td><td>28</td></tr>
<tr><td>PART II</td><td>Item 1.</td><td>Legal Proceedings</td><td>29</td></tr>
<tr><td>Item 1A.</td><td>Risk Factors</td><td>29</td></tr>
<tr><td>Item 2.</td><td>Unregistered Sales of Equity Securities and Use of Proceeds</td><td>31</td></tr>
</table>
<p>PART I</p>
<p>Item 1. Financial Statements</p>
<p>Critical accounting estimates are described in Item 7 of our Annual Report on Form 10-K.</p>
<p>Segment definitions are unchanged from Item 7 of our Annual Report on Form 10-K.</p>
<p>Item 2. Management&#8217;s Discussion and Analysis of Financial Condition and Results of Operations</p>
<p>{mda}</p>
<p>See Part I, Item 1A, Risk Factors of our Annual Report on Form 10-K.</p>
<p>Item 3. Quantitative and Qualitative Disclosures About Market Risk</p>
<p>No material changes.</p>
<p>Item 4. Controls and Procedures</p>
<p>Disclosure controls are effective.</p>
<p>PART II</p>
<p>Item 1. Legal Proceedings</p>
<p>None.</p>
<p>Item 1A. Risk Factors</p>
<p>{risk}</p>
<p>Item 2. Unregistered Sales of Equity Securities and Use of Proceeds</p>
<p>None.</p>
</body></html>
</TEXT>
</DOCUMENT>
</SEC-DOCUMENT>
",
        mda = mda,
        risk = risk
    )
}

pub fn filing_ref(ticker: &str, report_type: ReportType, filing_date: NaiveDate) -> FilingRef {
    FilingRef {
        ticker: Ticker::new(ticker).unwrap(),
        cik: "0000000001".to_string(),
        company_name: "EXAMPLE SEMICONDUCTOR CORP".to_string(),
        report_type,
        accession_number: format!("0000000001-{}", filing_date.format("%y%m%d")),
        filing_date,
        report_date: None,
        primary_document: Some("exmp.htm".to_string()),
    }
}

/// In-memory archive. Every filing serves the same submission text.
pub struct FakeArchive {
    filings: Vec<FilingRef>,
    content: Mutex<String>,
    downloads: AtomicUsize,
}

impl FakeArchive {
    pub fn new(filings: Vec<FilingRef>, content: String) -> Self {
        Self {
            filings,
            content: Mutex::new(content),
            downloads: AtomicUsize::new(0),
        }
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn set_content(&self, content: String) {
        *self.content.lock().unwrap() = content;
    }
}

#[async_trait]
impl FilingArchive for FakeArchive {
    async fn latest_filing(
        &self,
        ticker: &Ticker,
        report_type: ReportType,
    ) -> Result<FilingRef, AcquisitionError> {
        self.filings
            .iter()
            .filter(|f| &f.ticker == ticker && f.report_type == report_type)
            .max_by_key(|f| f.filing_date)
            .cloned()
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
        let mut filings: Vec<FilingRef> = self
            .filings
            .iter()
            .filter(|f| &f.ticker == ticker)
            .cloned()
            .collect();
        filings.sort_by(|a, b| b.filing_date.cmp(&a.filing_date));
        filings.truncate(limit);
        Ok(filings)
    }

    async fn download_submission(&self, _filing: &FilingRef) -> Result<String, AcquisitionError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(self.content.lock().unwrap().clone())
    }
}
