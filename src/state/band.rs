use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{BreakoutKind, BreakoutState};

/// One trading day's running High/Low band for a single ticker.
///
/// `high` only grows and `low` only shrinks within a day, so `low <= high`
/// holds for every reachable state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBand {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub last_price: f64,
    pub breakout: BreakoutState,
}

impl DayBand {
    /// Band started from the first observed price of the day.
    pub fn open(date: NaiveDate, price: f64) -> Self {
        Self {
            date,
            high: price,
            low: price,
            last_price: price,
            breakout: BreakoutState::None,
        }
    }

    /// Band seeded from the feed's session extremes (the daily open
    /// capture). Inverted or out-of-range inputs are normalized so the
    /// band always contains `last_price`.
    pub fn seeded(date: NaiveDate, high: f64, low: f64, last_price: f64) -> Self {
        Self {
            date,
            high: high.max(low).max(last_price),
            low: low.min(high).min(last_price),
            last_price,
            breakout: BreakoutState::None,
        }
    }

    /// Apply one price observation and return the transition it fired,
    /// if any.
    ///
    /// The breakout condition is judged against the extremes as they were
    /// *before* this observation widened them; comparing after the update
    /// would make every new extreme trivially equal to the band edge and
    /// nothing would ever signal.
    pub fn apply(&mut self, price: f64) -> Option<BreakoutKind> {
        let prev_high = self.high;
        let prev_low = self.low;

        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.last_price = price;

        let condition = if price > prev_high {
            BreakoutState::AboveHigh
        } else if price < prev_low {
            BreakoutState::BelowLow
        } else {
            BreakoutState::None
        };

        if condition == self.breakout {
            return None;
        }
        self.breakout = condition;

        Some(match condition {
            BreakoutState::AboveHigh => BreakoutKind::AboveHigh,
            BreakoutState::BelowLow => BreakoutKind::BelowLow,
            BreakoutState::None => BreakoutKind::ReEntry,
        })
    }
}
