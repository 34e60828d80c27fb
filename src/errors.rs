use std::fmt;

#[derive(Debug)]
pub enum MonitorError {
    /// Price source unreachable or returned an unusable payload.
    /// Recovered per ticker per tick, never fatal.
    Fetch(String),
    /// Persisted state file exists but cannot be parsed. Callers fall back
    /// to empty state.
    CorruptStore(String),
    /// Writing the state file failed. The tracker keeps running in memory
    /// and retries on a later tick.
    PersistWrite(String),
    /// Invalid environment configuration. Fatal at startup.
    Config(String),
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::Fetch(msg) => write!(f, "fetch error: {}", msg),
            MonitorError::CorruptStore(msg) => write!(f, "corrupt store: {}", msg),
            MonitorError::PersistWrite(msg) => write!(f, "persist error: {}", msg),
            MonitorError::Config(msg) => write!(f, "config error: {}", msg),
        }
    }
}

impl std::error::Error for MonitorError {}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        MonitorError::Fetch(err.to_string())
    }
}
