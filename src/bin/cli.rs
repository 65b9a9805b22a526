use anyhow::{Context, Result};
use colored::*;
use itertools::Itertools;
use research::core::{config::ResearchConfig, init};
use research::edgar::{ExtractedFiling, ReportType, Ticker};
use research::{BriefRequest, ProgressTracker};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "research-cli",
    about = "Equity research briefs and SEC filing section extraction"
)]
enum Command {
    /// Extract Risk Factors and MD&A from the latest filing
    Sections {
        ticker: String,
        /// 10-K, 10-Q, 10-K/A or 10-Q/A
        #[structopt(long, default_value = "10-K")]
        form: String,
        /// Print the extracted filing as JSON
        #[structopt(long)]
        json: bool,
        /// Characters of each excerpt to show
        #[structopt(long, default_value = "600")]
        preview: usize,
    },
    /// List recent periodic filings
    Filings {
        ticker: String,
        #[structopt(long, default_value = "10")]
        limit: usize,
    },
    /// Build a full research brief
    Report {
        ticker: String,
        /// Comma-separated peer tickers, e.g. AMD,INTC
        #[structopt(long, default_value = "")]
        peers: String,
        /// Skip the filing sections
        #[structopt(long)]
        no_filing: bool,
        #[structopt(long, default_value = "10-K")]
        form: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    log::debug!("Logger initialized");

    let config = ResearchConfig::from_env()?;

    match Command::from_args() {
        Command::Sections {
            ticker,
            form,
            json,
            preview,
        } => sections(&config, &ticker, &form, json, preview).await,
        Command::Filings { ticker, limit } => filings(&config, &ticker, limit).await,
        Command::Report {
            ticker,
            peers,
            no_filing,
            form,
        } => report(&config, &ticker, &peers, no_filing, &form).await,
    }
}

async fn sections(
    config: &ResearchConfig,
    ticker: &str,
    form: &str,
    json: bool,
    preview: usize,
) -> Result<()> {
    let client = init::build_http_client(config)?;
    let pipeline = init::initialize_pipeline(config, client)?;

    let filing = pipeline.run(ticker, form).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&filing)?);
        return Ok(());
    }

    print_filing(&filing, preview);
    Ok(())
}

fn print_filing(filing: &ExtractedFiling, preview: usize) {
    println!(
        "{} {} filed {} ({})",
        filing.ticker.as_str().blue().bold(),
        filing.report_type,
        filing.filing_date,
        filing.accession_number
    );
    if let Some(name) = &filing.company_name {
        println!("{} {}", "Company:".green(), name);
    }
    if let Some(period) = &filing.period_of_report {
        println!("{} {}", "Period of report:".green(), period);
    }
    println!(
        "{} {}",
        "Fiscal year end:".green(),
        filing.metadata.fiscal_year_end
    );
    println!(
        "{} {:.1} KB",
        "Document size:".green(),
        filing.metadata.document_size_kb
    );
    if let Some(path) = &filing.document_path {
        println!("{} {}", "Saved to:".green(), path.display());
    }

    for outcome in &filing.sections {
        let title = outcome.kind.title().yellow().bold();
        println!();
        match &outcome.result {
            Ok(excerpt) => {
                println!(
                    "{} ({} chars{})",
                    title,
                    excerpt.char_len(),
                    if excerpt.truncated { ", truncated" } else { "" }
                );
                let shown: String = excerpt.raw_excerpt.chars().take(preview).collect();
                println!("{}", shown);
                if excerpt.char_len() > preview {
                    println!("{}", "...".dimmed());
                }
            }
            Err(e) => println!("{} {}", title, e.to_string().red()),
        }
    }
}

async fn filings(config: &ResearchConfig, ticker: &str, limit: usize) -> Result<()> {
    let client = init::build_http_client(config)?;
    let fetcher = init::initialize_fetcher(config, client)?;

    let filings = fetcher.recent_filings(ticker, limit).await?;
    if filings.is_empty() {
        println!("{}", format!("No periodic filings found for {}", ticker).yellow());
        return Ok(());
    }

    for filing in filings {
        let index = filing
            .index_url()
            .map(|url| url.to_string())
            .unwrap_or_default();
        println!(
            "{}  {:<7} {}  {}",
            filing.filing_date,
            filing.report_type.as_str().bold(),
            filing.accession_number,
            index.dimmed()
        );
    }
    Ok(())
}

fn parse_peers(peers: &str) -> Result<Vec<Ticker>> {
    peers
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_uppercase)
        .unique()
        .map(|p| Ticker::new(&p).with_context(|| format!("invalid peer ticker {:?}", p)))
        .collect()
}

async fn report(
    config: &ResearchConfig,
    ticker: &str,
    peers: &str,
    no_filing: bool,
    form: &str,
) -> Result<()> {
    let ticker = Ticker::new(ticker)?;
    let peers = parse_peers(peers)?;
    let filing_type = if no_filing {
        None
    } else {
        Some(form.parse::<ReportType>()?)
    };

    if !peers.is_empty() {
        println!(
            "{} {}",
            "Peers:".green(),
            peers.iter().map(Ticker::as_str).join(", ")
        );
    }

    let desk = init::initialize_desk(config, filing_type.is_some())?;
    let request = BriefRequest::new(ticker.clone())
        .with_peers(peers)
        .with_filing(filing_type);

    let progress = ProgressTracker::new(6, &format!("Researching {}", ticker));
    let brief = match desk.build(&request, &progress).await {
        Ok(brief) => brief,
        Err(e) => {
            progress.abandon("Failed");
            return Err(e);
        }
    };

    println!("\n{}", brief.render());
    Ok(())
}
