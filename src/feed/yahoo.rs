//! Yahoo Finance v8 chart API client. One request per ticker per tick:
//! `interval=1m&range=1d` returns the session's minute bars, from which we
//! take the last traded price and the running extremes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::errors::MonitorError;
use crate::feed::{PriceSource, Quote};

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
}

pub struct YahooFeed {
    base_url: String,
    client: reqwest::Client,
}

impl YahooFeed {
    pub fn new() -> Result<Self, MonitorError> {
        // Yahoo rejects requests without a browser-ish user agent.
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0")
            .build()?;
        Ok(Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            client,
        })
    }

}

#[async_trait]
impl PriceSource for YahooFeed {
    async fn latest_quote(&self, ticker: &str) -> Result<Quote, MonitorError> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1m&range=1d",
            self.base_url, ticker
        );
        debug!(ticker, "fetching {url}");

        let response: YahooResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.chart.error {
            return Err(MonitorError::Fetch(format!(
                "{ticker}: {} - {}",
                err.code, err.description
            )));
        }

        let result = response
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| MonitorError::Fetch(format!("{ticker}: empty chart result")))?;

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| MonitorError::Fetch(format!("{ticker}: no quote data")))?;

        // Last bar with a traded price; trailing bars can be null while a
        // minute is still forming.
        let (idx, price) = quote
            .close
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, c)| c.map(|c| (i, c)))
            .ok_or_else(|| MonitorError::Fetch(format!("{ticker}: no traded price")))?;

        let session_high = quote.high.iter().flatten().copied().fold(price, f64::max);
        let session_low = quote.low.iter().flatten().copied().fold(price, f64::min);

        let ts = result
            .timestamp
            .get(idx)
            .and_then(|s| DateTime::from_timestamp(*s, 0))
            .unwrap_or_else(Utc::now);

        Ok(Quote {
            price,
            session_high,
            session_low,
            ts,
        })
    }
}
