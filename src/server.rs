//! HTTP surface: band snapshot, recent signals, runtime ticker
//! registration, and the health check the external keep-alive ping hits.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Instant;

use anyhow::Result;
use axum::extract::{Json, State};
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::state::band::DayBand;
use crate::tracker::HlTracker;
use crate::types::BreakoutEvent;

#[derive(Clone)]
pub struct AppState {
    pub tracker: HlTracker,
    pub started_at: Instant,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    tickers: usize,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    stocks: BTreeMap<String, DayBand>,
    time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct AddStockRequest {
    ticker: String,
}

#[derive(Debug, Serialize)]
struct AddStockResponse {
    ok: bool,
    stocks: Vec<String>,
}

async fn health(State(app): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: app.started_at.elapsed().as_secs(),
        tickers: app.tracker.ticker_symbols().len(),
    })
}

async fn status(State(app): State<AppState>) -> Json<StatusResponse> {
    let stocks = app.tracker.snapshot().await.into_iter().collect();
    Json(StatusResponse {
        stocks,
        time: Utc::now(),
    })
}

async fn events(State(app): State<AppState>) -> Json<Vec<BreakoutEvent>> {
    Json(app.tracker.recent_events().await)
}

async fn add_stock(
    State(app): State<AppState>,
    Json(req): Json<AddStockRequest>,
) -> Json<AddStockResponse> {
    let ticker = req.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Json(AddStockResponse {
            ok: false,
            stocks: app.tracker.ticker_symbols(),
        });
    }

    // NSE symbols on Yahoo carry the .NS suffix.
    let ticker = if ticker.ends_with(".NS") {
        ticker
    } else {
        format!("{ticker}.NS")
    };

    info!(ticker = %ticker, "registered via api");
    app.tracker.register(&ticker);

    Json(AddStockResponse {
        ok: true,
        stocks: app.tracker.ticker_symbols(),
    })
}

pub async fn serve(app_state: AppState, port: u16) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/events", get(events))
        .route("/stocks", post(add_stock))
        .layer(cors)
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("http surface on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
