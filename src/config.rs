use std::env;

use crate::errors::MonitorError;

/// Runtime configuration, sourced from the environment once at startup.
/// Anything malformed is fatal; only an absent variable falls back to the
/// documented default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tickers to poll, Yahoo symbols (NSE symbols carry the `.NS` suffix).
    pub stocks: Vec<String>,

    /// Daily open-capture slot, IST.
    pub fetch_hour: u32,
    pub fetch_minute: u32,

    /// Poll loop period.
    pub poll_seconds: u64,

    /// Path of the persisted band file.
    pub persist_file: String,

    /// HTTP surface port.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stocks: vec!["RELIANCE.NS".to_string(), "SBIN.NS".to_string()],
            fetch_hour: 10,
            fetch_minute: 30,
            poll_seconds: 4,
            persist_file: "hl.json".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, MonitorError> {
        let mut cfg = Config::default();

        if let Ok(raw) = env::var("STOCKS") {
            cfg.stocks = parse_stocks(&raw)?;
        }
        if let Ok(raw) = env::var("FETCH_HOUR") {
            cfg.fetch_hour = parse_bounded(&raw, "FETCH_HOUR", 0, 23)?;
        }
        if let Ok(raw) = env::var("FETCH_MINUTE") {
            cfg.fetch_minute = parse_bounded(&raw, "FETCH_MINUTE", 0, 59)?;
        }
        if let Ok(raw) = env::var("POLL_SECONDS") {
            cfg.poll_seconds = parse_poll_seconds(&raw)?;
        }
        if let Ok(raw) = env::var("PERSIST_FILE") {
            cfg.persist_file = raw;
        }
        if let Ok(raw) = env::var("PORT") {
            cfg.port = raw.trim().parse().map_err(|_| {
                MonitorError::Config(format!("PORT must be a port number, got {raw:?}"))
            })?;
        }

        Ok(cfg)
    }
}

fn parse_stocks(raw: &str) -> Result<Vec<String>, MonitorError> {
    let stocks: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if stocks.is_empty() {
        return Err(MonitorError::Config(
            "STOCKS must name at least one ticker".to_string(),
        ));
    }
    Ok(stocks)
}

fn parse_bounded(raw: &str, name: &str, min: u32, max: u32) -> Result<u32, MonitorError> {
    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|_| MonitorError::Config(format!("{name} must be an integer, got {raw:?}")))?;

    if value < min || value > max {
        return Err(MonitorError::Config(format!(
            "{name} must be in {min}..={max}, got {value}"
        )));
    }
    Ok(value)
}

fn parse_poll_seconds(raw: &str) -> Result<u64, MonitorError> {
    let value: u64 = raw.trim().parse().map_err(|_| {
        MonitorError::Config(format!("POLL_SECONDS must be an integer, got {raw:?}"))
    })?;

    if value == 0 {
        return Err(MonitorError::Config(
            "POLL_SECONDS must be positive".to_string(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stocks_are_trimmed_and_uppercased() {
        let stocks = parse_stocks(" reliance.ns , SBIN.NS ,").unwrap();
        assert_eq!(stocks, vec!["RELIANCE.NS", "SBIN.NS"]);
    }

    #[test]
    fn empty_stock_list_is_rejected() {
        assert!(parse_stocks(" , ,").is_err());
        assert!(parse_stocks("").is_err());
    }

    #[test]
    fn schedule_bounds_are_enforced() {
        assert_eq!(parse_bounded("23", "FETCH_HOUR", 0, 23).unwrap(), 23);
        assert!(parse_bounded("24", "FETCH_HOUR", 0, 23).is_err());
        assert!(parse_bounded("ten", "FETCH_HOUR", 0, 23).is_err());
    }

    #[test]
    fn poll_seconds_must_be_positive() {
        assert_eq!(parse_poll_seconds("4").unwrap(), 4);
        assert!(parse_poll_seconds("0").is_err());
        assert!(parse_poll_seconds("-1").is_err());
    }
}
