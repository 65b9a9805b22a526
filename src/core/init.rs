use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::brief::ResearchDesk;
use crate::core::config::ResearchConfig;
use crate::edgar::{ArtifactStore, EdgarArchive, FilingFetcher, FilingPipeline};
use crate::llm::AnthropicClient;
use crate::market::AlphaVantage;
use crate::news::NewsApi;
use crate::utils::dirs;

const CONNECT_TIMEOUT_SECS: u64 = 10;

pub fn build_http_client(config: &ResearchConfig) -> Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .gzip(true)
        .timeout(config.http_timeout)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .context("failed to build HTTP client")
}

pub fn initialize_fetcher(config: &ResearchConfig, client: Client) -> Result<FilingFetcher> {
    dirs::ensure_data_dirs(&config.data_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            config.data_dir.display()
        )
    })?;

    let archive = EdgarArchive::new(client, config.user_agent.clone(), config.data_dir.clone());
    Ok(FilingFetcher::new(
        Arc::new(archive),
        ArtifactStore::new(&config.data_dir),
    ))
}

pub fn initialize_pipeline(config: &ResearchConfig, client: Client) -> Result<FilingPipeline> {
    let fetcher = initialize_fetcher(config, client)?;
    Ok(FilingPipeline::with_section_limits(
        fetcher,
        config.risk_factors_max_chars,
        config.mda_max_chars,
    ))
}

pub fn initialize_anthropic(config: &ResearchConfig, client: Client) -> Result<AnthropicClient> {
    let api_key = config.require_anthropic_key()?;
    log::debug!("Using Anthropic model {}", config.anthropic_model);
    Ok(AnthropicClient::new(
        client,
        api_key,
        config.anthropic_model.clone(),
    ))
}

/// Market data and the language model are mandatory. News and filings are
/// attached when available; a missing news key only loses the headlines.
pub fn initialize_desk(config: &ResearchConfig, with_filings: bool) -> Result<ResearchDesk> {
    let client = build_http_client(config)?;

    let market = AlphaVantage::new(client.clone(), config.require_alpha_vantage_key()?);
    let llm = initialize_anthropic(config, client.clone())?;
    let mut desk = ResearchDesk::new(Arc::new(market), Arc::new(llm));

    match config.require_news_key() {
        Ok(key) => desk = desk.with_news(Arc::new(NewsApi::new(client.clone(), key))),
        Err(e) => log::warn!("News disabled: {}", e),
    }

    if with_filings {
        desk = desk.with_filings(Arc::new(initialize_pipeline(config, client)?));
    }

    Ok(desk)
}
