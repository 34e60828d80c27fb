pub mod band;

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use tokio::sync::RwLock;

use self::band::DayBand;

use crate::types::BreakoutEvent;

/// How many breakout events the HTTP surface can replay.
pub const RECENT_EVENTS_CAP: usize = 256;

#[derive(Debug)]
pub struct TickerState {
    pub ticker: String,
    /// `None` until the first observation (or seed) of the current day.
    pub band: RwLock<Option<DayBand>>,
}

impl TickerState {
    pub fn new(ticker: String) -> Self {
        Self {
            ticker,
            band: RwLock::new(None),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Shared {
    pub tickers: Arc<DashMap<String, Arc<TickerState>>>,
    pub events: Arc<RwLock<VecDeque<BreakoutEvent>>>,
    /// Set whenever in-memory state diverges from disk; cleared by the
    /// flush that writes it back.
    store_dirty: Arc<AtomicBool>,
}

impl Shared {
    pub fn new(tickers: Vec<String>) -> Self {
        let map = DashMap::new();
        for t in tickers {
            map.insert(t.clone(), Arc::new(TickerState::new(t)));
        }
        Self {
            tickers: Arc::new(map),
            events: Arc::new(RwLock::new(VecDeque::with_capacity(RECENT_EVENTS_CAP))),
            store_dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ensure a ticker exists in the shared map (insert if missing).
    pub fn ensure_ticker(&self, ticker: &str) -> Arc<TickerState> {
        if let Some(existing) = self.tickers.get(ticker) {
            return existing.value().clone();
        }
        let ts = Arc::new(TickerState::new(ticker.to_string()));
        self.tickers.insert(ticker.to_string(), ts.clone());
        ts
    }

    pub fn ticker_symbols(&self) -> Vec<String> {
        self.tickers.iter().map(|e| e.key().clone()).collect()
    }

    pub fn mark_dirty(&self) {
        self.store_dirty.store(true, Ordering::Release);
    }

    pub fn take_dirty(&self) -> bool {
        self.store_dirty.swap(false, Ordering::AcqRel)
    }

    pub async fn push_event(&self, ev: BreakoutEvent) {
        let mut events = self.events.write().await;
        if events.len() == RECENT_EVENTS_CAP {
            events.pop_front();
        }
        events.push_back(ev);
    }

    pub async fn recent_events(&self) -> Vec<BreakoutEvent> {
        self.events.read().await.iter().cloned().collect()
    }
}
