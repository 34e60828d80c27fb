use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{self, Duration};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::feed::PriceSource;
use crate::market_hours;
use crate::tracker::HlTracker;
use crate::types::BreakoutEvent;

/// Drive the fetch → observe → notify loop.
///
/// One fetch failure skips that ticker for the tick and moves on; the loop
/// itself never dies. Persistence is batched — bands are flushed whenever
/// the tracker is dirty at the end of a tick (rollover flushes inside the
/// tracker, shutdown flushes in main).
pub async fn run_poller(
    cfg: Config,
    feed: Arc<dyn PriceSource>,
    tracker: HlTracker,
    tx: mpsc::Sender<BreakoutEvent>,
) -> Result<()> {
    let mut interval = time::interval(Duration::from_secs(cfg.poll_seconds));

    // Tickers whose opening band has been captured today.
    let mut captured: HashSet<String> = HashSet::new();
    let mut captured_date = market_hours::trading_date(Utc::now());

    info!(
        poll_seconds = cfg.poll_seconds,
        capture = %format!("{:02}:{:02} IST", cfg.fetch_hour, cfg.fetch_minute),
        "poller running"
    );

    loop {
        interval.tick().await;
        let now = Utc::now();

        let today = market_hours::trading_date(now);
        if today != captured_date {
            captured.clear();
            captured_date = today;
        }

        if !market_hours::is_market_open(now) {
            debug!("market closed, idle tick");
            continue;
        }

        let capture_due = market_hours::capture_due(now, cfg.fetch_hour, cfg.fetch_minute);

        for ticker in tracker.ticker_symbols() {
            let quote = match feed.latest_quote(&ticker).await {
                Ok(quote) => quote,
                Err(e) => {
                    warn!(ticker = %ticker, "fetch failed: {e}");
                    continue;
                }
            };

            if capture_due && !captured.contains(&ticker) {
                if tracker
                    .seed_open(
                        &ticker,
                        quote.session_high,
                        quote.session_low,
                        quote.price,
                        quote.ts,
                    )
                    .await
                {
                    info!(
                        ticker = %ticker,
                        high = quote.session_high,
                        low = quote.session_low,
                        "seeded opening band"
                    );
                }
                captured.insert(ticker.clone());
            }

            let outcome = tracker.observe(&ticker, quote.price, quote.ts).await;
            if let Some(ev) = outcome.event {
                let _ = tx.try_send(ev);
            }
        }

        if tracker.take_dirty() {
            tracker.try_flush().await;
        }
    }
}
