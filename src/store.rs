use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::MonitorError;
use crate::state::band::DayBand;
use crate::types::BreakoutState;

/// On-disk record for one ticker. Every field is optional so files written
/// by older or newer builds still load: unknown fields are skipped, and a
/// record missing anything essential leaves that ticker unset.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedBand {
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(default)]
    last_price: Option<f64>,
    #[serde(default)]
    breakout: Option<BreakoutState>,
}

impl PersistedBand {
    fn from_band(band: &DayBand) -> Self {
        Self {
            date: Some(band.date),
            high: Some(band.high),
            low: Some(band.low),
            last_price: Some(band.last_price),
            breakout: Some(band.breakout),
        }
    }

    fn into_band(self) -> Option<DayBand> {
        Some(DayBand {
            date: self.date?,
            high: self.high?,
            low: self.low?,
            last_price: self.last_price?,
            breakout: self.breakout.unwrap_or(BreakoutState::None),
        })
    }
}

/// JSON-file persistence of the per-ticker bands.
///
/// Writes go to a sibling temp file first and are renamed over the
/// canonical path, so a crash mid-write never leaves a file `load` would
/// choke on.
#[derive(Debug, Clone)]
pub struct HlStore {
    path: PathBuf,
}

impl HlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<HashMap<String, DayBand>, MonitorError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(MonitorError::CorruptStore(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let parsed: HashMap<String, PersistedBand> = serde_json::from_str(&raw)
            .map_err(|e| MonitorError::CorruptStore(format!("{}: {}", self.path.display(), e)))?;

        Ok(parsed
            .into_iter()
            .filter_map(|(ticker, rec)| rec.into_band().map(|band| (ticker, band)))
            .collect())
    }

    pub fn save(&self, states: &HashMap<String, DayBand>) -> Result<(), MonitorError> {
        let persisted: HashMap<&String, PersistedBand> = states
            .iter()
            .map(|(ticker, band)| (ticker, PersistedBand::from_band(band)))
            .collect();

        let json = serde_json::to_string_pretty(&persisted)
            .map_err(|e| MonitorError::PersistWrite(e.to_string()))?;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .map_err(|e| MonitorError::PersistWrite(format!("{}: {}", dir.display(), e)))?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)
            .map_err(|e| MonitorError::PersistWrite(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| MonitorError::PersistWrite(format!("{}: {}", self.path.display(), e)))?;

        Ok(())
    }
}
