//! Price history, fundamentals and peer quotes.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::edgar::Ticker;

mod alpha_vantage;

pub use alpha_vantage::AlphaVantage;

/// Trading days covered by a snapshot.
pub const SNAPSHOT_DAYS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
}

/// Last 30 sessions of daily prices. `chart` is newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub ticker: Ticker,
    pub current_price: f64,
    pub price_change_30d: f64,
    pub price_change_pct_30d: f64,
    pub high_30d: f64,
    pub low_30d: f64,
    pub avg_volume_30d: f64,
    pub chart: Vec<PricePoint>,
    pub last_updated: NaiveDate,
}

/// Company overview figures. Ratios are plain multiples; margins, returns,
/// yield and growth are percentages. Missing values read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub ticker: String,
    pub company_name: String,
    pub sector: String,
    pub industry: String,

    pub market_cap: f64,
    pub pe_ratio: f64,
    pub peg_ratio: f64,
    pub price_to_book: f64,
    pub price_to_sales: f64,
    pub ev_to_ebitda: f64,

    pub profit_margin: f64,
    pub operating_margin: f64,
    pub gross_margin: f64,
    pub roe: f64,
    pub roa: f64,

    pub eps: f64,
    pub dividend_yield: f64,

    pub revenue_ttm: f64,
    pub revenue_growth_yoy: f64,
    pub earnings_growth_yoy: f64,

    pub beta: f64,
    pub week_52_high: f64,
    pub week_52_low: f64,
}

impl Fundamentals {
    pub fn market_cap_formatted(&self) -> String {
        if self.market_cap > 0.0 {
            format_market_cap(self.market_cap)
        } else {
            "N/A".to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerQuote {
    pub ticker: Ticker,
    pub price: f64,
    pub change_30d_pct: f64,
    pub is_primary: bool,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn stock_snapshot(&self, ticker: &Ticker) -> Result<StockSnapshot>;
    async fn fundamentals(&self, ticker: &Ticker) -> Result<Fundamentals>;
}

impl PeerQuote {
    fn from_snapshot(snapshot: &StockSnapshot, is_primary: bool) -> Self {
        Self {
            ticker: snapshot.ticker.clone(),
            price: snapshot.current_price,
            change_30d_pct: snapshot.price_change_pct_30d,
            is_primary,
        }
    }
}

/// The primary's already-loaded snapshot first, then every peer whose
/// snapshot loads. Peer failures are logged and skipped; a peer equal to the
/// primary is not fetched again.
pub async fn peer_comparison(
    provider: &dyn MarketDataProvider,
    primary: &StockSnapshot,
    peers: &[Ticker],
) -> Vec<PeerQuote> {
    let mut quotes = Vec::with_capacity(peers.len() + 1);
    quotes.push(PeerQuote::from_snapshot(primary, true));

    for ticker in peers.iter().filter(|p| **p != primary.ticker) {
        match provider.stock_snapshot(ticker).await {
            Ok(snapshot) => quotes.push(PeerQuote::from_snapshot(&snapshot, false)),
            Err(e) => log::warn!("Skipping {} in peer comparison: {:#}", ticker, e),
        }
    }

    quotes
}

/// `$1.23T`, `$4.56B`, `$7.89M`, or whole dollars with separators.
pub fn format_market_cap(market_cap: f64) -> String {
    if market_cap >= 1e12 {
        format!("${:.2}T", market_cap / 1e12)
    } else if market_cap >= 1e9 {
        format!("${:.2}B", market_cap / 1e9)
    } else if market_cap >= 1e6 {
        format!("${:.2}M", market_cap / 1e6)
    } else {
        format!("${}", group_thousands(market_cap.round().max(0.0) as u64))
    }
}

pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    #[test]
    fn test_format_market_cap() {
        assert_eq!(format_market_cap(2_950_000_000_000.0), "$2.95T");
        assert_eq!(format_market_cap(4_560_000_000.0), "$4.56B");
        assert_eq!(format_market_cap(7_890_000.0), "$7.89M");
        assert_eq!(format_market_cap(12_345.0), "$12,345");
        assert_eq!(format_market_cap(999.0), "$999");
    }

    #[test]
    fn test_market_cap_unknown() {
        assert_eq!(Fundamentals::default().market_cap_formatted(), "N/A");
    }

    #[derive(Default)]
    struct FixedPrices {
        requested: Mutex<Vec<String>>,
    }

    fn fixed_snapshot(ticker: &Ticker, change: f64) -> StockSnapshot {
        StockSnapshot {
            ticker: ticker.clone(),
            current_price: 100.0,
            price_change_30d: change,
            price_change_pct_30d: change,
            high_30d: 110.0,
            low_30d: 90.0,
            avg_volume_30d: 1_000.0,
            chart: vec![],
            last_updated: NaiveDate::from_ymd_opt(2024, 5, 29).unwrap(),
        }
    }

    #[async_trait]
    impl MarketDataProvider for FixedPrices {
        async fn stock_snapshot(&self, ticker: &Ticker) -> Result<StockSnapshot> {
            self.requested.lock().unwrap().push(ticker.to_string());
            match ticker.as_str() {
                "NVDA" => Ok(fixed_snapshot(ticker, 12.5)),
                "AMD" => Ok(fixed_snapshot(ticker, -3.25)),
                _ => Err(anyhow!("unknown symbol {}", ticker)),
            }
        }

        async fn fundamentals(&self, _ticker: &Ticker) -> Result<Fundamentals> {
            Err(anyhow!("not used"))
        }
    }

    #[tokio::test]
    async fn test_peer_comparison_skips_failures() {
        let provider = FixedPrices::default();
        let nvda = Ticker::new("NVDA").unwrap();
        let peers = vec![Ticker::new("INTC").unwrap(), Ticker::new("AMD").unwrap()];
        let quotes = peer_comparison(&provider, &fixed_snapshot(&nvda, 12.5), &peers).await;

        let tickers: Vec<_> = quotes.iter().map(|q| q.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["NVDA", "AMD"]);
        assert!(quotes[0].is_primary);
        assert!(!quotes[1].is_primary);
        assert_eq!(quotes[1].change_30d_pct, -3.25);
    }

    #[tokio::test]
    async fn test_peer_comparison_reuses_primary_snapshot() {
        let provider = FixedPrices::default();
        let nvda = Ticker::new("NVDA").unwrap();
        let mut primary = fixed_snapshot(&nvda, 7.0);
        primary.current_price = 875.0;
        let peers = vec![Ticker::new("AMD").unwrap(), nvda.clone()];

        let quotes = peer_comparison(&provider, &primary, &peers).await;

        assert_eq!(*provider.requested.lock().unwrap(), vec!["AMD".to_string()]);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].price, 875.0);
        assert_eq!(quotes[0].change_30d_pct, 7.0);
        assert!(quotes[0].is_primary);
    }
}
