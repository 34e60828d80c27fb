pub mod yahoo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::MonitorError;

/// Latest view of a ticker's trading session as reported by the feed.
#[derive(Debug, Clone, Copy)]
pub struct Quote {
    /// Last traded price.
    pub price: f64,
    /// Running high/low of the session so far, per the feed.
    pub session_high: f64,
    pub session_low: f64,
    /// Timestamp of the last print.
    pub ts: DateTime<Utc>,
}

/// Narrow seam over the market-data provider so the poller and tests can
/// swap the transport.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn latest_quote(&self, ticker: &str) -> Result<Quote, MonitorError>;
}
