use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the last observed price sits relative to the day's band.
///
/// This is what suppresses re-signaling: while the state is already
/// `AboveHigh`, further prices above the (growing) high do not fire again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakoutState {
    None,
    AboveHigh,
    BelowLow,
}

/// The transition that fired a signal. `ReEntry` is the move back inside
/// the band after a breakout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakoutKind {
    AboveHigh,
    BelowLow,
    ReEntry,
}

impl BreakoutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakoutKind::AboveHigh => "ABOVE_HIGH",
            BreakoutKind::BelowLow => "BELOW_LOW",
            BreakoutKind::ReEntry => "RE_ENTRY",
        }
    }
}

/// One edge-triggered band transition, sent over the notifier channel and
/// kept in the recent-events ring for the HTTP surface.
#[derive(Debug, Clone, Serialize)]
pub struct BreakoutEvent {
    pub id: Uuid,
    pub ticker: String,
    pub kind: BreakoutKind,
    pub price: f64,
    pub ts: DateTime<Utc>,
}
