use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::edgar::parsing::section::{MDA_MAX_LENGTH, RISK_FACTORS_MAX_LENGTH};
use crate::utils::dirs::DEFAULT_DATA_DIR;

pub const DEFAULT_USER_AGENT: &str = "software@example.com";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ResearchConfig {
    pub anthropic_api_key: Option<String>,
    pub alpha_vantage_api_key: Option<String>,
    pub news_api_key: Option<String>,
    /// Contact string the SEC requires in every request's User-Agent.
    pub user_agent: String,
    pub data_dir: PathBuf,
    pub anthropic_model: String,
    pub http_timeout: Duration,
    pub risk_factors_max_chars: usize,
    pub mda_max_chars: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            alpha_vantage_api_key: None,
            news_api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            risk_factors_max_chars: RISK_FACTORS_MAX_LENGTH,
            mda_max_chars: MDA_MAX_LENGTH,
        }
    }
}

impl ResearchConfig {
    /// Reads the process environment. API keys stay optional here; the
    /// adapters that need them ask via the `require_*` accessors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Self {
            anthropic_api_key: non_empty("ANTHROPIC_API_KEY"),
            alpha_vantage_api_key: non_empty("ALPHA_VANTAGE_API_KEY"),
            news_api_key: non_empty("NEWS_API_KEY"),
            user_agent: non_empty("USER_AGENT").unwrap_or(defaults.user_agent),
            data_dir: non_empty("RESEARCH_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            anthropic_model: non_empty("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic_model),
            http_timeout: match non_empty("HTTP_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(
                    v.parse()
                        .with_context(|| format!("HTTP_TIMEOUT_SECS is not a number: {}", v))?,
                ),
                None => defaults.http_timeout,
            },
            risk_factors_max_chars: parse_limit(
                non_empty("RISK_FACTORS_MAX_CHARS"),
                "RISK_FACTORS_MAX_CHARS",
                defaults.risk_factors_max_chars,
            )?,
            mda_max_chars: parse_limit(
                non_empty("MDA_MAX_CHARS"),
                "MDA_MAX_CHARS",
                defaults.mda_max_chars,
            )?,
        })
    }

    pub fn require_anthropic_key(&self) -> Result<&str> {
        self.anthropic_api_key
            .as_deref()
            .ok_or_else(|| anyhow!("ANTHROPIC_API_KEY environment variable not set"))
    }

    pub fn require_alpha_vantage_key(&self) -> Result<&str> {
        self.alpha_vantage_api_key
            .as_deref()
            .ok_or_else(|| anyhow!("ALPHA_VANTAGE_API_KEY environment variable not set"))
    }

    pub fn require_news_key(&self) -> Result<&str> {
        self.news_api_key
            .as_deref()
            .ok_or_else(|| anyhow!("NEWS_API_KEY environment variable not set"))
    }
}

fn parse_limit(value: Option<String>, name: &str, default: usize) -> Result<usize> {
    match value {
        Some(v) => {
            let limit: usize = v
                .parse()
                .with_context(|| format!("{} is not a number: {}", name, v))?;
            if limit == 0 {
                return Err(anyhow!("{} must be greater than zero", name));
            }
            Ok(limit)
        }
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ResearchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.anthropic_model, DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.risk_factors_max_chars, 15_000);
        assert_eq!(config.mda_max_chars, 20_000);
        assert!(config.require_anthropic_key().is_err());
    }

    #[test]
    fn test_reads_overrides() {
        let config = ResearchConfig::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("USER_AGENT", "Research Desk desk@example.com"),
            ("RESEARCH_DATA_DIR", "/tmp/research"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("MDA_MAX_CHARS", "25000"),
            ("NEWS_API_KEY", "  "),
        ]))
        .unwrap();
        assert_eq!(config.require_anthropic_key().unwrap(), "sk-test");
        assert_eq!(config.user_agent, "Research Desk desk@example.com");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/research"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.mda_max_chars, 25_000);
        assert!(config.news_api_key.is_none());
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(ResearchConfig::from_lookup(lookup(&[("HTTP_TIMEOUT_SECS", "soon")])).is_err());
        assert!(ResearchConfig::from_lookup(lookup(&[("RISK_FACTORS_MAX_CHARS", "0")])).is_err());
    }
}
