use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

use super::{round2, Fundamentals, MarketDataProvider, PricePoint, StockSnapshot, SNAPSHOT_DAYS};
use crate::edgar::Ticker;

pub const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";
const DAILY_SERIES_KEY: &str = "Time Series (Daily)";

pub struct AlphaVantage {
    client: Client,
    api_key: String,
}

impl AlphaVantage {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    async fn query(&self, function: &str, ticker: &Ticker) -> Result<Value> {
        let url = Url::parse_with_params(
            ALPHA_VANTAGE_URL,
            &[
                ("function", function),
                ("symbol", ticker.as_str()),
                ("apikey", self.api_key.as_str()),
            ],
        )?;
        log::debug!("Alpha Vantage {} for {}", function, ticker);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, mime::APPLICATION_JSON.as_ref())
            .send()
            .await
            .with_context(|| format!("Alpha Vantage {} request failed", function))?
            .error_for_status()
            .with_context(|| format!("Alpha Vantage {} returned an error status", function))?;

        response
            .json()
            .await
            .with_context(|| format!("Alpha Vantage {} returned invalid JSON", function))
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantage {
    async fn stock_snapshot(&self, ticker: &Ticker) -> Result<StockSnapshot> {
        let body = self.query("TIME_SERIES_DAILY", ticker).await?;
        snapshot_from_daily(ticker, &body)
    }

    async fn fundamentals(&self, ticker: &Ticker) -> Result<Fundamentals> {
        let body = self.query("OVERVIEW", ticker).await?;
        fundamentals_from_overview(ticker, &body)
    }
}

/// Rate-limit notes and bad symbols come back as 200 with a message body.
fn api_message(body: &Value) -> Option<&str> {
    ["Error Message", "Note", "Information"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
}

fn field(day: &Value, key: &str) -> Result<f64> {
    day.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("missing {:?}", key))?
        .parse::<f64>()
        .with_context(|| format!("unreadable {:?}", key))
}

pub(crate) fn snapshot_from_daily(ticker: &Ticker, body: &Value) -> Result<StockSnapshot> {
    let series = body
        .get(DAILY_SERIES_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| match api_message(body) {
            Some(message) => anyhow!("Could not fetch data for {}: {}", ticker, message),
            None => anyhow!("Could not fetch data for {}. Check ticker symbol.", ticker),
        })?;

    let mut days = BTreeMap::new();
    for (date, day) in series {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("bad series date {:?}", date))?;
        days.insert(date, day);
    }

    let mut chart = Vec::with_capacity(SNAPSHOT_DAYS);
    let mut highs = Vec::with_capacity(SNAPSHOT_DAYS);
    let mut lows = Vec::with_capacity(SNAPSHOT_DAYS);
    for (date, day) in days.iter().rev().take(SNAPSHOT_DAYS) {
        chart.push(PricePoint {
            date: *date,
            close: field(day, "4. close")?,
            volume: field(day, "5. volume")? as u64,
        });
        highs.push(field(day, "2. high")?);
        lows.push(field(day, "3. low")?);
    }

    let (newest, oldest) = match (chart.first(), chart.last()) {
        (Some(newest), Some(oldest)) => (newest, oldest),
        _ => return Err(anyhow!("Empty price series for {}", ticker)),
    };

    let price_change = newest.close - oldest.close;
    let price_change_pct = if oldest.close != 0.0 {
        price_change / oldest.close * 100.0
    } else {
        0.0
    };
    let total_volume: u64 = chart.iter().map(|p| p.volume).sum();

    Ok(StockSnapshot {
        ticker: ticker.clone(),
        current_price: round2(newest.close),
        price_change_30d: round2(price_change),
        price_change_pct_30d: round2(price_change_pct),
        high_30d: round2(highs.iter().cloned().fold(f64::MIN, f64::max)),
        low_30d: round2(lows.iter().cloned().fold(f64::MAX, f64::min)),
        avg_volume_30d: (total_volume as f64 / chart.len() as f64).round(),
        last_updated: newest.date,
        chart,
    })
}

/// `"None"`, `"-"` and other non-numbers read as zero.
fn number(body: &Value, key: &str) -> f64 {
    body.get(key)
        .and_then(Value::as_str)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn text(body: &Value, key: &str, default: &str) -> String {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

pub(crate) fn fundamentals_from_overview(ticker: &Ticker, body: &Value) -> Result<Fundamentals> {
    if body.get("Symbol").is_none() {
        return Err(match api_message(body) {
            Some(message) => anyhow!("Could not fetch fundamental data for {}: {}", ticker, message),
            None => anyhow!("Could not fetch fundamental data for {}", ticker),
        });
    }

    let percent = |key: &str| number(body, key) * 100.0;

    Ok(Fundamentals {
        ticker: ticker.to_string(),
        company_name: text(body, "Name", ticker.as_str()),
        sector: text(body, "Sector", "N/A"),
        industry: text(body, "Industry", "N/A"),

        market_cap: number(body, "MarketCapitalization"),
        pe_ratio: number(body, "PERatio"),
        peg_ratio: number(body, "PEGRatio"),
        price_to_book: number(body, "PriceToBookRatio"),
        price_to_sales: number(body, "PriceToSalesRatioTTM"),
        ev_to_ebitda: number(body, "EVToEBITDA"),

        profit_margin: percent("ProfitMargin"),
        operating_margin: percent("OperatingMarginTTM"),
        gross_margin: percent("GrossMarginTTM"),
        roe: percent("ReturnOnEquityTTM"),
        roa: percent("ReturnOnAssetsTTM"),

        eps: number(body, "EPS"),
        dividend_yield: percent("DividendYield"),

        revenue_ttm: number(body, "RevenueTTM"),
        revenue_growth_yoy: percent("QuarterlyRevenueGrowthYOY"),
        earnings_growth_yoy: percent("QuarterlyEarningsGrowthYOY"),

        beta: number(body, "Beta"),
        week_52_high: number(body, "52WeekHigh"),
        week_52_low: number(body, "52WeekLow"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(close: f64, high: f64, low: f64, volume: u64) -> Value {
        json!({
            "1. open": format!("{}", close),
            "2. high": format!("{}", high),
            "3. low": format!("{}", low),
            "4. close": format!("{}", close),
            "5. volume": format!("{}", volume),
        })
    }

    #[test]
    fn test_snapshot_uses_last_thirty_sessions() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut series = serde_json::Map::new();
        for i in 0..40u64 {
            let date = start + chrono::Duration::days(i as i64);
            let close = 100.0 + i as f64;
            series.insert(
                date.format("%Y-%m-%d").to_string(),
                day(close, close + 1.0, close - 1.0, 1_000 + i),
            );
        }
        let body = json!({ "Time Series (Daily)": series });
        let nvda = Ticker::new("NVDA").unwrap();

        let snapshot = snapshot_from_daily(&nvda, &body).unwrap();
        assert_eq!(snapshot.chart.len(), 30);
        assert_eq!(snapshot.last_updated, start + chrono::Duration::days(39));
        assert_eq!(snapshot.current_price, 139.0);
        // Oldest of the window is day 10 (close 110).
        assert_eq!(snapshot.price_change_30d, 29.0);
        assert_eq!(snapshot.price_change_pct_30d, 26.36);
        assert_eq!(snapshot.high_30d, 140.0);
        assert_eq!(snapshot.low_30d, 109.0);
        assert_eq!(snapshot.avg_volume_30d, 1_025.0);
    }

    #[test]
    fn test_snapshot_reports_api_message() {
        let body = json!({ "Note": "API call frequency exceeded" });
        let err = snapshot_from_daily(&Ticker::new("NVDA").unwrap(), &body).unwrap_err();
        assert!(err.to_string().contains("frequency"));
    }

    #[test]
    fn test_fundamentals_scale_percentages() {
        let body = json!({
            "Symbol": "NVDA",
            "Name": "NVIDIA Corporation",
            "Sector": "TECHNOLOGY",
            "MarketCapitalization": "2950000000000",
            "PERatio": "65.4",
            "PEGRatio": "None",
            "ProfitMargin": "0.53",
            "ReturnOnEquityTTM": "1.152",
            "DividendYield": "-",
        });
        let f = fundamentals_from_overview(&Ticker::new("NVDA").unwrap(), &body).unwrap();
        assert_eq!(f.company_name, "NVIDIA Corporation");
        assert_eq!(f.industry, "N/A");
        assert_eq!(f.pe_ratio, 65.4);
        assert_eq!(f.peg_ratio, 0.0);
        assert!((f.profit_margin - 53.0).abs() < 1e-9);
        assert!((f.roe - 115.2).abs() < 1e-9);
        assert_eq!(f.dividend_yield, 0.0);
        assert_eq!(f.market_cap_formatted(), "$2.95T");
    }

    #[test]
    fn test_fundamentals_without_symbol_is_error() {
        let body = json!({});
        assert!(fundamentals_from_overview(&Ticker::new("ZZZZ").unwrap(), &body).is_err());
    }
}
