//! Recent company news.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

pub const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";
pub const NEWS_LOOKBACK_DAYS: i64 = 7;
pub const MAX_ARTICLES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub source: String,
    /// `YYYY-MM-DD`, or empty when the feed omits it.
    pub published_at: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Up to ten of the most relevant articles from the last week.
    async fn company_news(&self, query: &str) -> Result<Vec<NewsArticle>>;
}

pub struct NewsApi {
    client: Client,
    api_key: String,
}

impl NewsApi {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(rename = "publishedAt", default)]
    published_at: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    name: Option<String>,
}

#[async_trait]
impl NewsProvider for NewsApi {
    async fn company_news(&self, query: &str) -> Result<Vec<NewsArticle>> {
        let from = (Utc::now() - Duration::days(NEWS_LOOKBACK_DAYS)).date_naive();
        let url = news_url(query, from, &self.api_key)?;
        log::debug!("Fetching news for {:?} since {}", query, from);

        let response: NewsResponse = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, mime::APPLICATION_JSON.as_ref())
            .send()
            .await
            .context("news request failed")?
            .json()
            .await
            .context("news response was not valid JSON")?;

        articles_from(response)
    }
}

fn news_url(query: &str, from: NaiveDate, api_key: &str) -> Result<Url> {
    let from = from.format("%Y-%m-%d").to_string();
    Ok(Url::parse_with_params(
        NEWS_API_URL,
        &[
            ("q", query),
            ("from", from.as_str()),
            ("sortBy", "relevancy"),
            ("language", "en"),
            ("apiKey", api_key),
        ],
    )?)
}

fn articles_from(response: NewsResponse) -> Result<Vec<NewsArticle>> {
    if response.status != "ok" {
        return Err(anyhow!(
            "Could not fetch news data: {}",
            response.message.unwrap_or(response.status)
        ));
    }

    Ok(response
        .articles
        .into_iter()
        .take(MAX_ARTICLES)
        .map(|raw| NewsArticle {
            title: raw.title.unwrap_or_default(),
            source: raw
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            published_at: raw
                .published_at
                .map(|p| p.chars().take(10).collect())
                .unwrap_or_default(),
            description: raw.description.filter(|d| !d.trim().is_empty()),
            url: raw.url.filter(|u| !u.is_empty()),
        })
        .collect())
}
