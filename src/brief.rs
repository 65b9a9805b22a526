//! Research brief assembly and rendering.
//!
//! Market data for the primary ticker is the only hard requirement. Every
//! other slice (news, fundamentals, peers, filing sections, each model call)
//! degrades to a "section unavailable" placeholder on failure.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;

use crate::analysis::{self, SummaryInputs};
use crate::edgar::parsing::{MetadataField, SectionKind};
use crate::edgar::{FilingPipeline, FilingRef, ReportType, Ticker};
use crate::llm::CompletionService;
use crate::market::{self, Fundamentals, MarketDataProvider, PeerQuote, StockSnapshot};
use crate::news::{NewsArticle, NewsProvider};
use crate::utils::progress::ProgressTracker;

pub const DISCLAIMER: &str =
    "Disclaimer: AI-generated for informational purposes only. Not investment advice.";

pub const HEADLINES_SHOWN: usize = 5;
pub const FILINGS_SHOWN: usize = 3;

/// A narrative section of the brief, or why it is missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Narrative {
    Ready(String),
    Unavailable(String),
}

impl Narrative {
    pub fn unavailable(reason: impl ToString) -> Self {
        Narrative::Unavailable(reason.to_string())
    }

    pub fn from_result(what: &str, result: Result<String>) -> Self {
        match result {
            Ok(text) => Narrative::Ready(text),
            Err(e) => {
                log::warn!("{} unavailable: {:#}", what, e);
                Narrative::Unavailable(format!("{:#}", e))
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Narrative::Ready(text) => Some(text),
            Narrative::Unavailable(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Narrative::Ready(_))
    }

    fn render(&self) -> String {
        match self {
            Narrative::Ready(text) => text.trim().to_string(),
            Narrative::Unavailable(reason) => format!("[Section unavailable: {}]", reason),
        }
    }
}

/// Filing-derived part of the brief.
#[derive(Debug, Clone, Serialize)]
pub struct FilingSummary {
    pub report_type: ReportType,
    pub company_name: Option<String>,
    pub filing_date: Option<String>,
    pub fiscal_year_end: MetadataField,
    pub risk_factors: Narrative,
    pub mda: Narrative,
}

impl FilingSummary {
    fn unavailable(report_type: ReportType, reason: &str) -> Self {
        Self {
            report_type,
            company_name: None,
            filing_date: None,
            fiscal_year_end: MetadataField::NotFound,
            risk_factors: Narrative::unavailable(reason),
            mda: Narrative::unavailable(reason),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchBrief {
    pub ticker: Ticker,
    pub generated_at: DateTime<Local>,
    pub snapshot: StockSnapshot,
    pub fundamentals: Option<Fundamentals>,
    pub peers: Vec<PeerQuote>,
    pub headlines: Vec<NewsArticle>,
    pub recent_filings: Vec<FilingRef>,
    pub executive_summary: Narrative,
    pub price_action: Narrative,
    pub sentiment: Narrative,
    pub risks_catalysts: Narrative,
    pub fundamentals_analysis: Narrative,
    pub filing: Option<FilingSummary>,
}

#[derive(Debug, Clone)]
pub struct BriefRequest {
    pub ticker: Ticker,
    pub peers: Vec<Ticker>,
    /// `None` skips the filing sections entirely.
    pub filing_type: Option<ReportType>,
}

impl BriefRequest {
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            peers: Vec::new(),
            filing_type: Some(ReportType::Form10K),
        }
    }

    pub fn with_peers(mut self, peers: Vec<Ticker>) -> Self {
        self.peers = peers;
        self
    }

    pub fn with_filing(mut self, filing_type: Option<ReportType>) -> Self {
        self.filing_type = filing_type;
        self
    }
}

/// Holds the collaborators a brief is assembled from.
pub struct ResearchDesk {
    market: Arc<dyn MarketDataProvider>,
    news: Option<Arc<dyn NewsProvider>>,
    llm: Arc<dyn CompletionService>,
    filings: Option<Arc<FilingPipeline>>,
}

impl ResearchDesk {
    pub fn new(market: Arc<dyn MarketDataProvider>, llm: Arc<dyn CompletionService>) -> Self {
        Self {
            market,
            news: None,
            llm,
            filings: None,
        }
    }

    pub fn with_news(mut self, news: Arc<dyn NewsProvider>) -> Self {
        self.news = Some(news);
        self
    }

    pub fn with_filings(mut self, pipeline: Arc<FilingPipeline>) -> Self {
        self.filings = Some(pipeline);
        self
    }

    pub async fn build(
        &self,
        request: &BriefRequest,
        progress: &ProgressTracker,
    ) -> Result<ResearchBrief> {
        let ticker = &request.ticker;
        let llm = self.llm.as_ref();

        progress.step("Fetching market data");
        let snapshot = self
            .market
            .stock_snapshot(ticker)
            .await
            .with_context(|| format!("market data for {} is required", ticker))?;

        let fundamentals = match self.market.fundamentals(ticker).await {
            Ok(f) => Some(f),
            Err(e) => {
                log::warn!("Fundamentals unavailable for {}: {:#}", ticker, e);
                None
            }
        };

        let peers = if request.peers.is_empty() {
            Vec::new()
        } else {
            progress.step("Comparing peers");
            market::peer_comparison(self.market.as_ref(), &snapshot, &request.peers).await
        };

        progress.step("Fetching news");
        let news_query = fundamentals
            .as_ref()
            .map(|f| f.company_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| ticker.to_string());
        let headlines: Result<Vec<NewsArticle>> = match &self.news {
            Some(news) => news.company_news(&news_query).await,
            None => Err(anyhow::anyhow!("no news provider configured")),
        };

        let filing = match (&self.filings, request.filing_type) {
            (Some(pipeline), Some(filing_type)) => {
                progress.step("Extracting SEC filing sections");
                Some(self.summarize_filing(pipeline, ticker, filing_type).await)
            }
            _ => None,
        };
        let recent_filings = match &self.filings {
            Some(pipeline) => pipeline
                .fetcher()
                .recent_filings(ticker.as_str(), FILINGS_SHOWN)
                .await
                .unwrap_or_else(|e| {
                    log::warn!("Recent filings unavailable for {}: {}", ticker, e);
                    Vec::new()
                }),
            None => Vec::new(),
        };

        progress.step("Running analysis");
        let (sentiment, risks_catalysts) = match &headlines {
            Ok(articles) if !articles.is_empty() => futures::join!(
                analysis::analyze_news_sentiment(llm, ticker, articles),
                analysis::identify_risks_catalysts(llm, ticker, articles, &snapshot)
            ),
            Ok(_) => (
                Err(anyhow::anyhow!("no recent news")),
                Err(anyhow::anyhow!("no recent news")),
            ),
            Err(e) => (
                Err(anyhow::anyhow!("news unavailable: {:#}", e)),
                Err(anyhow::anyhow!("news unavailable: {:#}", e)),
            ),
        };
        let sentiment = Narrative::from_result("News sentiment", sentiment);
        let risks_catalysts = Narrative::from_result("Risks & catalysts", risks_catalysts);

        let (price_action, fundamentals_analysis) = futures::join!(
            analysis::analyze_price_action(llm, ticker, &snapshot, &peers),
            async {
                match &fundamentals {
                    Some(f) => analysis::analyze_fundamentals(llm, ticker, f).await,
                    None => Err(anyhow::anyhow!("fundamental data unavailable")),
                }
            }
        );
        let price_action = Narrative::from_result("Price action", price_action);
        let fundamentals_analysis = Narrative::from_result("Fundamentals", fundamentals_analysis);

        progress.step("Writing executive summary");
        let inputs = SummaryInputs {
            sentiment: sentiment.text(),
            price_action: price_action.text(),
            risks_catalysts: risks_catalysts.text(),
            fundamentals: fundamentals_analysis.text(),
            filing_risks: filing.as_ref().and_then(|f| f.risk_factors.text()),
        };
        let executive_summary = Narrative::from_result(
            "Executive summary",
            analysis::generate_executive_summary(llm, ticker, &inputs).await,
        );

        progress.finish("Report generated");

        Ok(ResearchBrief {
            ticker: ticker.clone(),
            generated_at: Local::now(),
            snapshot,
            fundamentals,
            peers,
            headlines: headlines.unwrap_or_default(),
            recent_filings,
            executive_summary,
            price_action,
            sentiment,
            risks_catalysts,
            fundamentals_analysis,
            filing,
        })
    }

    async fn summarize_filing(
        &self,
        pipeline: &FilingPipeline,
        ticker: &Ticker,
        filing_type: ReportType,
    ) -> FilingSummary {
        let filing = match pipeline.run(ticker.as_str(), filing_type.as_str()).await {
            Ok(filing) => filing,
            Err(e) => {
                log::warn!("Filing unavailable for {}: {}", ticker, e);
                return FilingSummary::unavailable(filing_type, &e.to_string());
            }
        };

        let llm = self.llm.as_ref();
        let risk_factors = match filing.section(SectionKind::RiskFactors) {
            Some(Ok(excerpt)) => Narrative::from_result(
                "Risk Factors",
                analysis::summarize_risk_factors(llm, ticker, filing.report_type, excerpt).await,
            ),
            Some(Err(e)) => Narrative::unavailable(e),
            None => Narrative::unavailable("section not requested"),
        };
        let mda = match filing.section(SectionKind::ManagementDiscussion) {
            Some(Ok(excerpt)) => Narrative::from_result(
                "MD&A",
                analysis::summarize_mda(llm, ticker, filing.report_type, excerpt).await,
            ),
            Some(Err(e)) => Narrative::unavailable(e),
            None => Narrative::unavailable("section not requested"),
        };

        FilingSummary {
            report_type: filing.report_type,
            company_name: filing.company_name.clone(),
            filing_date: Some(filing.filing_date.format("%Y-%m-%d").to_string()),
            fiscal_year_end: filing.metadata.fiscal_year_end.clone(),
            risk_factors,
            mda,
        }
    }
}

impl ResearchBrief {
    /// Plain-text rendering, one heading per section.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let s = &self.snapshot;

        let _ = writeln!(out, "{} Research Brief", self.ticker);
        let _ = writeln!(
            out,
            "Generated: {}\n",
            self.generated_at.format("%B %d, %Y at %H:%M")
        );

        section(&mut out, "Executive Summary", &self.executive_summary.render());

        let metrics = format!(
            "Current Price: ${:.2} ({:+.2}%)\n30-Day High: ${:.2}\n30-Day Low: ${:.2}\nAvg Volume: {:.1}M\nAs of: {}",
            s.current_price,
            s.price_change_pct_30d,
            s.high_30d,
            s.low_30d,
            s.avg_volume_30d / 1e6,
            s.last_updated
        );
        section(&mut out, "Key Metrics (30-Day)", &metrics);

        section(&mut out, "Price Action Analysis", &self.price_action.render());
        section(&mut out, "News Sentiment", &self.sentiment.render());

        if !self.headlines.is_empty() {
            let mut headlines = String::new();
            for (i, article) in self.headlines.iter().take(HEADLINES_SHOWN).enumerate() {
                let _ = writeln!(headlines, "{}. [{}] {}", i + 1, article.source, article.title);
                if let Some(url) = &article.url {
                    let _ = writeln!(headlines, "   {}", url);
                }
            }
            section(
                &mut out,
                &format!("Recent Headlines ({} articles)", self.headlines.len()),
                headlines.trim_end(),
            );
        }

        section(&mut out, "Risks & Catalysts", &self.risks_catalysts.render());

        let mut fundamentals = String::new();
        if let Some(f) = &self.fundamentals {
            let _ = writeln!(
                fundamentals,
                "{} | {} | {}\nMarket Cap: {} | P/E: {:.2} | P/S: {:.2} | P/B: {:.2}\n\
                 Profit Margin: {:.2}% | ROE: {:.2}% | Revenue Growth (YoY): {:.2}%\n",
                f.company_name,
                f.sector,
                f.industry,
                f.market_cap_formatted(),
                f.pe_ratio,
                f.price_to_sales,
                f.price_to_book,
                f.profit_margin,
                f.roe,
                f.revenue_growth_yoy,
            );
        }
        fundamentals.push_str(&self.fundamentals_analysis.render());
        section(&mut out, "Fundamentals", &fundamentals);

        if !self.peers.is_empty() {
            let peers = self
                .peers
                .iter()
                .map(|p| {
                    format!(
                        "{}{}: ${:.2} ({:+.2}%)",
                        p.ticker,
                        if p.is_primary { " *" } else { "" },
                        p.price,
                        p.change_30d_pct
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            section(&mut out, "Peer Comparison", &peers);
        }

        if let Some(filing) = &self.filing {
            let mut body = String::new();
            let _ = writeln!(
                body,
                "{} filed {} | Fiscal Year End: {}",
                filing.report_type,
                filing.filing_date.as_deref().unwrap_or("N/A"),
                filing.fiscal_year_end
            );
            if let Some(name) = &filing.company_name {
                let _ = writeln!(body, "Registrant: {}", name);
            }
            let _ = write!(
                body,
                "\nRisk Factors:\n{}\n\nMD&A:\n{}",
                filing.risk_factors.render(),
                filing.mda.render()
            );
            section(&mut out, "SEC Filing Analysis", &body);
        }

        if !self.recent_filings.is_empty() {
            let filings = self
                .recent_filings
                .iter()
                .take(FILINGS_SHOWN)
                .map(|f| {
                    let link = f.index_url().map(|u| u.to_string()).unwrap_or_default();
                    format!("{} - {}\n   {}", f.report_type, f.filing_date, link)
                })
                .collect::<Vec<_>>()
                .join("\n");
            section(&mut out, "SEC Filings", &filings);
        }

        out.push_str(DISCLAIMER);
        out.push('\n');
        out
    }
}

fn section(out: &mut String, title: &str, body: &str) {
    let _ = writeln!(out, "## {}\n{}\n", title, body);
}
