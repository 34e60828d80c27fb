//! The High/Low tracker. Owns the per-ticker bands, applies observations,
//! detects day rollover, and hands breakout transitions to the caller.
//! Everything that touches a band happens under that ticker's write lock,
//! so concurrent observations cannot interleave and each transition fires
//! exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::MonitorError;
use crate::market_hours;
use crate::state::band::DayBand;
use crate::state::{Shared, TickerState};
use crate::store::HlStore;
use crate::types::BreakoutEvent;

/// What a single observation did.
#[derive(Debug, Clone)]
pub struct ObserveOutcome {
    /// Transition fired by this price, if any.
    pub event: Option<BreakoutEvent>,
    /// The previous day's final band when this observation rolled the date
    /// over.
    pub closed: Option<DayBand>,
}

#[derive(Clone)]
pub struct HlTracker {
    shared: Shared,
    store: Arc<HlStore>,
}

impl HlTracker {
    /// Build the tracker from the configured tickers plus whatever the
    /// store remembers. Only records for today's trading date are
    /// re-adopted; stale days stay on disk until the next flush. A corrupt
    /// store is a warning, not a crash — we start from empty bands.
    pub async fn initialize(tickers: &[String], store: HlStore) -> Self {
        let shared = Shared::new(tickers.to_vec());

        let loaded = match store.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("discarding persisted state: {e}");
                HashMap::new()
            }
        };

        let today = market_hours::trading_date(Utc::now());
        for (ticker, band) in loaded {
            // Tickers known only to the file keep getting polled too.
            let state = shared.ensure_ticker(&ticker);
            if band.date == today {
                info!(ticker = %ticker, high = band.high, low = band.low, "restored band");
                *state.band.write().await = Some(band);
            }
        }

        Self {
            shared,
            store: Arc::new(store),
        }
    }

    /// Feed one price print through the band state machine.
    ///
    /// If the print belongs to a newer trading date than the current band,
    /// the old band is closed out and returned; the fresh band starts at
    /// this price with no breakout condition.
    pub async fn observe(&self, ticker: &str, price: f64, ts: DateTime<Utc>) -> ObserveOutcome {
        let state = self.shared.ensure_ticker(ticker);
        let date = market_hours::trading_date(ts);

        let (kind, closed) = {
            let mut guard = state.band.write().await;

            let rolled = guard.as_ref().is_some_and(|b| b.date != date);
            let closed = if rolled { guard.take() } else { None };

            let kind = match guard.as_mut() {
                Some(band) => band.apply(price),
                None => {
                    *guard = Some(DayBand::open(date, price));
                    None
                }
            };
            (kind, closed)
        };

        self.shared.mark_dirty();

        if let Some(prev) = &closed {
            info!(
                ticker,
                date = %prev.date,
                high = prev.high,
                low = prev.low,
                "day closed"
            );
            // Rollover is one of the mandatory flush points.
            self.try_flush().await;
        }

        let event = kind.map(|kind| BreakoutEvent {
            id: Uuid::new_v4(),
            ticker: ticker.to_string(),
            kind,
            price,
            ts,
        });

        if let Some(ev) = &event {
            self.shared.push_event(ev.clone()).await;
        }

        ObserveOutcome { event, closed }
    }

    /// Seed the day's band from the feed's session extremes. A no-op when
    /// the ticker already has an observation for this date — the capture
    /// never resets a live band.
    pub async fn seed_open(
        &self,
        ticker: &str,
        high: f64,
        low: f64,
        price: f64,
        ts: DateTime<Utc>,
    ) -> bool {
        let state = self.shared.ensure_ticker(ticker);
        let date = market_hours::trading_date(ts);

        {
            let mut guard = state.band.write().await;
            if guard.as_ref().is_some_and(|b| b.date == date) {
                return false;
            }
            *guard = Some(DayBand::seeded(date, high, low, price));
        }

        self.shared.mark_dirty();
        true
    }

    /// Consistent copy of every ticker that has a band today.
    pub async fn snapshot(&self) -> HashMap<String, DayBand> {
        let handles: Vec<(String, Arc<TickerState>)> = self
            .shared
            .tickers
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();

        let mut out = HashMap::with_capacity(handles.len());
        for (ticker, state) in handles {
            if let Some(band) = state.band.read().await.clone() {
                out.insert(ticker, band);
            }
        }
        out
    }

    /// Persist the current bands. On failure the dirty flag is restored so
    /// a later tick retries; in-memory state is unaffected either way.
    pub async fn try_flush(&self) {
        self.shared.take_dirty();
        if let Err(e) = self.flush().await {
            warn!("persist failed, keeping state in memory: {e}");
            self.shared.mark_dirty();
        }
    }

    pub async fn flush(&self) -> Result<(), MonitorError> {
        let snapshot = self.snapshot().await;
        self.store.save(&snapshot)
    }

    /// Register a ticker for polling (used by the HTTP surface).
    pub fn register(&self, ticker: &str) {
        self.shared.ensure_ticker(ticker);
    }

    pub fn ticker_symbols(&self) -> Vec<String> {
        self.shared.ticker_symbols()
    }

    pub fn take_dirty(&self) -> bool {
        self.shared.take_dirty()
    }

    pub async fn recent_events(&self) -> Vec<BreakoutEvent> {
        self.shared.recent_events().await
    }
}
