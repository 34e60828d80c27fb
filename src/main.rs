use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use dotenv::dotenv;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hl_monitor::config::Config;
use hl_monitor::feed::yahoo::YahooFeed;
use hl_monitor::server::{self, AppState};
use hl_monitor::store::HlStore;
use hl_monitor::tracker::HlTracker;
use hl_monitor::{notifier, poller};

#[tokio::main]
async fn main() -> Result<()> {
    // Basic logging: set RUST_LOG=info (or debug) to see output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    dotenv().ok();

    let cfg = Config::from_env()?;
    info!(
        stocks = ?cfg.stocks,
        poll_seconds = cfg.poll_seconds,
        persist_file = %cfg.persist_file,
        "starting hl monitor"
    );

    let store = HlStore::new(&cfg.persist_file);
    let tracker = HlTracker::initialize(&cfg.stocks, store).await;

    let feed = Arc::new(YahooFeed::new()?);

    // Breakout channel (tracker transitions -> notifier).
    let (event_tx, event_rx) = mpsc::channel(256);

    // Notifier task
    {
        tokio::spawn(async move {
            let _ = notifier::run_notifier(event_rx).await;
        });
    }

    // HTTP surface task
    {
        let tracker = tracker.clone();
        let port = cfg.port;
        tokio::spawn(async move {
            let app_state = AppState {
                tracker,
                started_at: Instant::now(),
            };
            if let Err(e) = server::serve(app_state, port).await {
                error!("http surface exited: {e}");
            }
        });
    }

    // Poller runs on the main task; ctrl-c flushes state before exit.
    tokio::select! {
        res = poller::run_poller(cfg, feed, tracker.clone(), event_tx) => res?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested, flushing state");
            tracker.try_flush().await;
        }
    }

    Ok(())
}
