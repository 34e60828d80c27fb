use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::types::BreakoutEvent;

/// Drain the breakout channel, one structured line per signal. Anything
/// that wants push delivery (webhook, chat, ...) subscribes here.
pub async fn run_notifier(mut rx: mpsc::Receiver<BreakoutEvent>) -> Result<()> {
    while let Some(ev) = rx.recv().await {
        info!(
            id = %ev.id,
            ticker = %ev.ticker,
            kind = ev.kind.as_str(),
            price = ev.price,
            ts = %ev.ts,
            "breakout signal"
        );
    }
    Ok(())
}
