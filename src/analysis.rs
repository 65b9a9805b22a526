//! Prompts for each narrative section of a brief, and the calls that run them.
//!
//! Builders are pure so the prompt text can be checked without a model.

use anyhow::Result;
use std::fmt::Write;

use crate::edgar::parsing::{SectionExcerpt, SectionKind};
use crate::edgar::{ReportType, Ticker};
use crate::llm::{CompletionRequest, CompletionService};
use crate::market::{Fundamentals, PeerQuote, StockSnapshot};
use crate::news::NewsArticle;

pub const SENTIMENT_ARTICLES: usize = 5;

pub const SENTIMENT_MAX_TOKENS: u32 = 1000;
pub const PRICE_ACTION_MAX_TOKENS: u32 = 800;
pub const RISKS_CATALYSTS_MAX_TOKENS: u32 = 1000;
pub const FUNDAMENTALS_MAX_TOKENS: u32 = 1000;
pub const FILING_SECTION_MAX_TOKENS: u32 = 1000;
pub const EXECUTIVE_SUMMARY_MAX_TOKENS: u32 = 500;

const NOT_AVAILABLE: &str = "Not available";

pub fn sentiment_prompt(ticker: &Ticker, articles: &[NewsArticle]) -> String {
    let mut news_text = format!("Recent news about {}:\n\n", ticker);
    for (i, article) in articles.iter().take(SENTIMENT_ARTICLES).enumerate() {
        let _ = writeln!(news_text, "{}. [{}] {}", i + 1, article.source, article.title);
        if let Some(description) = &article.description {
            let _ = writeln!(news_text, "   {}", description);
        }
        news_text.push('\n');
    }

    format!(
        "Analyze the following recent news about {ticker} and provide:\n\n\
         {news_text}\n\
         Please provide:\n\
         1. Overall Sentiment: (Bullish/Bearish/Neutral) with confidence level\n\
         2. Key Themes: 2-3 main themes emerging from the news\n\
         3. Market Impact: How this news might affect the stock in the short term\n\n\
         Keep your response concise and actionable for a financial analyst."
    )
}

pub fn price_action_prompt(ticker: &Ticker, snapshot: &StockSnapshot, peers: &[PeerQuote]) -> String {
    let mut prompt = format!(
        "Analyze the following stock performance for {}:\n\n\
         Current Price: ${:.2}\n\
         30-Day Change: {:.2}%\n\
         30-Day High: ${:.2}\n\
         30-Day Low: ${:.2}\n\
         Average Volume: {}\n",
        ticker,
        snapshot.current_price,
        snapshot.price_change_pct_30d,
        snapshot.high_30d,
        snapshot.low_30d,
        crate::market::group_thousands(snapshot.avg_volume_30d.max(0.0) as u64),
    );

    let others: Vec<_> = peers.iter().filter(|p| !p.is_primary).collect();
    if !others.is_empty() {
        prompt.push_str("\nPeer Comparison:\n");
        for peer in others {
            let _ = writeln!(prompt, "- {}: {:+.2}%", peer.ticker, peer.change_30d_pct);
        }
    }

    prompt.push_str(
        "\nProvide a brief analysis:\n\
         1. Price Performance: How has the stock performed relative to its recent range?\n\
         2. Relative Strength: How does it compare to peers (if provided)?\n\
         3. Technical Observations: Any notable patterns or levels?\n\n\
         Keep response under 150 words.",
    );
    prompt
}

pub fn risks_catalysts_prompt(
    ticker: &Ticker,
    articles: &[NewsArticle],
    snapshot: &StockSnapshot,
) -> String {
    let headlines = articles
        .iter()
        .take(SENTIMENT_ARTICLES)
        .map(|a| format!("- {}", a.title))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on recent news and price action for {ticker}:\n\n\
         Recent Headlines:\n{headlines}\n\n\
         Recent Performance: {change:.2}% over 30 days\n\n\
         Identify:\n\
         1. Key Risks: 2-3 main risks facing the company\n\
         2. Potential Catalysts: 2-3 events or factors that could drive the stock higher\n\n\
         Be specific and concise. Focus on actionable insights for investors.",
        change = snapshot.price_change_pct_30d,
    )
}

pub fn fundamentals_prompt(ticker: &Ticker, f: &Fundamentals) -> String {
    format!(
        "Analyze the following fundamental metrics for {ticker}:\n\n\
         VALUATION METRICS:\n\
         - P/E Ratio: {pe:.2}\n\
         - P/S Ratio: {ps:.2}\n\
         - Price-to-Book: {pb:.2}\n\
         - Market Cap: {cap}\n\n\
         PROFITABILITY METRICS:\n\
         - Profit Margin: {pm:.2}%\n\
         - Operating Margin: {om:.2}%\n\
         - Gross Margin: {gm:.2}%\n\
         - ROE (Return on Equity): {roe:.2}%\n\
         - ROA (Return on Assets): {roa:.2}%\n\n\
         GROWTH METRICS:\n\
         - Revenue Growth (YoY): {rg:.2}%\n\
         - Earnings Growth (YoY): {eg:.2}%\n\n\
         Provide concise analysis:\n\
         1. Valuation Assessment: Is the stock expensive, fairly valued, or cheap based on multiples?\n\
         2. Profitability Analysis: Comment on margin strength and efficiency (ROE/ROA)\n\
         3. Growth Profile: Assess revenue and earnings growth trajectory\n\n\
         Keep response under 200 words. Be specific and avoid generic statements.",
        pe = f.pe_ratio,
        ps = f.price_to_sales,
        pb = f.price_to_book,
        cap = f.market_cap_formatted(),
        pm = f.profit_margin,
        om = f.operating_margin,
        gm = f.gross_margin,
        roe = f.roe,
        roa = f.roa,
        rg = f.revenue_growth_yoy,
        eg = f.earnings_growth_yoy,
    )
}

pub fn risk_factors_prompt(
    ticker: &Ticker,
    report_type: ReportType,
    excerpt: &SectionExcerpt,
) -> String {
    format!(
        "The following is the Risk Factors section ({item}) of {ticker}'s latest {report_type} filing{note}:\n\n\
         {body}\n\n\
         Summarize:\n\
         1. Top Risks: the 3-5 most material risks, one line each\n\
         2. New or Emphasized Risks: anything that reads as recently added or escalated\n\n\
         Keep response under 200 words.",
        item = SectionKind::RiskFactors.item(report_type),
        note = truncation_note(excerpt),
        body = excerpt.raw_excerpt,
    )
}

pub fn mda_prompt(ticker: &Ticker, report_type: ReportType, excerpt: &SectionExcerpt) -> String {
    format!(
        "The following is Management's Discussion and Analysis ({item}) from {ticker}'s latest {report_type} filing{note}:\n\n\
         {body}\n\n\
         Summarize:\n\
         1. Results: what drove revenue and margins in the period\n\
         2. Outlook: guidance, priorities or headwinds management calls out\n\
         3. Liquidity: cash position and capital allocation in one line\n\n\
         Keep response under 200 words.",
        item = SectionKind::ManagementDiscussion.item(report_type),
        note = truncation_note(excerpt),
        body = excerpt.raw_excerpt,
    )
}

fn truncation_note(excerpt: &SectionExcerpt) -> &'static str {
    if excerpt.truncated {
        " (truncated)"
    } else {
        ""
    }
}

/// Narrative sections the executive summary draws from. `None` reads as
/// "Not available" in the prompt.
#[derive(Debug, Default, Clone)]
pub struct SummaryInputs<'a> {
    pub sentiment: Option<&'a str>,
    pub price_action: Option<&'a str>,
    pub risks_catalysts: Option<&'a str>,
    pub fundamentals: Option<&'a str>,
    pub filing_risks: Option<&'a str>,
}

pub fn executive_summary_prompt(ticker: &Ticker, inputs: &SummaryInputs<'_>) -> String {
    let mut prompt = format!(
        "Create a concise executive summary for {ticker} based on this analysis:\n\n\
         SENTIMENT ANALYSIS:\n{}\n\n\
         PRICE ACTION:\n{}\n\n\
         RISKS & CATALYSTS:\n{}\n\n\
         FUNDAMENTALS:\n{}\n\n",
        inputs.sentiment.unwrap_or(NOT_AVAILABLE),
        inputs.price_action.unwrap_or(NOT_AVAILABLE),
        inputs.risks_catalysts.unwrap_or(NOT_AVAILABLE),
        inputs.fundamentals.unwrap_or(NOT_AVAILABLE),
    );
    if let Some(filing_risks) = inputs.filing_risks {
        let _ = write!(prompt, "DISCLOSED RISK FACTORS:\n{}\n\n", filing_risks);
    }
    prompt.push_str(
        "Provide a 3-4 sentence executive summary that captures the investment thesis \
         and key takeaways. Write as if briefing a portfolio manager.",
    );
    prompt
}

async fn run(llm: &dyn CompletionService, what: &str, prompt: String, max_tokens: u32) -> Result<String> {
    log::debug!("Running {} analysis", what);
    let request = CompletionRequest::new(prompt, max_tokens);
    llm.complete(&request).await
}

pub async fn analyze_news_sentiment(
    llm: &dyn CompletionService,
    ticker: &Ticker,
    articles: &[NewsArticle],
) -> Result<String> {
    run(llm, "sentiment", sentiment_prompt(ticker, articles), SENTIMENT_MAX_TOKENS).await
}

pub async fn analyze_price_action(
    llm: &dyn CompletionService,
    ticker: &Ticker,
    snapshot: &StockSnapshot,
    peers: &[PeerQuote],
) -> Result<String> {
    run(
        llm,
        "price action",
        price_action_prompt(ticker, snapshot, peers),
        PRICE_ACTION_MAX_TOKENS,
    )
    .await
}

pub async fn identify_risks_catalysts(
    llm: &dyn CompletionService,
    ticker: &Ticker,
    articles: &[NewsArticle],
    snapshot: &StockSnapshot,
) -> Result<String> {
    run(
        llm,
        "risks and catalysts",
        risks_catalysts_prompt(ticker, articles, snapshot),
        RISKS_CATALYSTS_MAX_TOKENS,
    )
    .await
}

pub async fn analyze_fundamentals(
    llm: &dyn CompletionService,
    ticker: &Ticker,
    fundamentals: &Fundamentals,
) -> Result<String> {
    run(
        llm,
        "fundamentals",
        fundamentals_prompt(ticker, fundamentals),
        FUNDAMENTALS_MAX_TOKENS,
    )
    .await
}

pub async fn summarize_risk_factors(
    llm: &dyn CompletionService,
    ticker: &Ticker,
    report_type: ReportType,
    excerpt: &SectionExcerpt,
) -> Result<String> {
    run(
        llm,
        "risk factors",
        risk_factors_prompt(ticker, report_type, excerpt),
        FILING_SECTION_MAX_TOKENS,
    )
    .await
}

pub async fn summarize_mda(
    llm: &dyn CompletionService,
    ticker: &Ticker,
    report_type: ReportType,
    excerpt: &SectionExcerpt,
) -> Result<String> {
    run(
        llm,
        "MD&A",
        mda_prompt(ticker, report_type, excerpt),
        FILING_SECTION_MAX_TOKENS,
    )
    .await
}

pub async fn generate_executive_summary(
    llm: &dyn CompletionService,
    ticker: &Ticker,
    inputs: &SummaryInputs<'_>,
) -> Result<String> {
    run(
        llm,
        "executive summary",
        executive_summary_prompt(ticker, inputs),
        EXECUTIVE_SUMMARY_MAX_TOKENS,
    )
    .await
}
