// tests/tracker_tests.rs

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Asia::Kolkata;
use hl_monitor::{BreakoutKind, BreakoutState, DayBand, HlStore, HlTracker};
use uuid::Uuid;

fn temp_path() -> PathBuf {
    std::env::temp_dir().join(format!("hl_tracker_{}.json", Uuid::new_v4()))
}

fn ist(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Kolkata
        .with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

async fn tracker(tickers: &[&str], path: &PathBuf) -> HlTracker {
    let tickers: Vec<String> = tickers.iter().map(|t| t.to_string()).collect();
    HlTracker::initialize(&tickers, HlStore::new(path)).await
}

#[tokio::test]
async fn first_observation_opens_the_band() {
    let path = temp_path();
    let tracker = tracker(&["RELIANCE.NS"], &path).await;

    assert!(tracker.snapshot().await.is_empty());
    assert!(tracker.recent_events().await.is_empty());

    let outcome = tracker
        .observe("RELIANCE.NS", 100.0, ist(2024, 1, 1, 9, 16))
        .await;
    assert!(outcome.event.is_none());
    assert!(outcome.closed.is_none());

    let snap = tracker.snapshot().await;
    let band = &snap["RELIANCE.NS"];
    assert_eq!(band.high, 100.0);
    assert_eq!(band.low, 100.0);
    assert_eq!(band.breakout, BreakoutState::None);

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn rollover_produces_two_records() {
    let path = temp_path();
    let tracker = tracker(&["RELIANCE.NS"], &path).await;

    tracker
        .observe("RELIANCE.NS", 100.0, ist(2024, 1, 1, 15, 20))
        .await;
    let outcome = tracker
        .observe("RELIANCE.NS", 105.0, ist(2024, 1, 1, 15, 29))
        .await;
    assert_eq!(
        outcome.event.map(|e| e.kind),
        Some(BreakoutKind::AboveHigh)
    );

    let outcome = tracker
        .observe("RELIANCE.NS", 102.0, ist(2024, 1, 2, 9, 16))
        .await;

    // The closed record carries the first day's final values, untouched.
    let closed = outcome.closed.unwrap();
    assert_eq!(closed.date, ist(2024, 1, 1, 12, 0).with_timezone(&Kolkata).date_naive());
    assert_eq!(closed.high, 105.0);
    assert_eq!(closed.low, 100.0);
    assert_eq!(closed.last_price, 105.0);
    assert_eq!(closed.breakout, BreakoutState::AboveHigh);

    // The new day starts a fresh band with no breakout condition.
    let snap = tracker.snapshot().await;
    let band = &snap["RELIANCE.NS"];
    assert_eq!(band.date, ist(2024, 1, 2, 12, 0).with_timezone(&Kolkata).date_naive());
    assert_eq!(band.high, 102.0);
    assert_eq!(band.low, 102.0);
    assert_eq!(band.breakout, BreakoutState::None);

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn restart_restores_todays_band() {
    let path = temp_path();
    let now = Utc::now();
    {
        let tracker = tracker(&["SBIN.NS"], &path).await;
        tracker.observe("SBIN.NS", 610.0, now).await;
        tracker.observe("SBIN.NS", 618.5, now).await;
        tracker.flush().await.unwrap();
    }

    let tracker = tracker(&["SBIN.NS"], &path).await;
    let snap = tracker.snapshot().await;
    let band = &snap["SBIN.NS"];
    assert_eq!(band.high, 618.5);
    assert_eq!(band.low, 610.0);

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn stale_record_is_not_restored() {
    let path = temp_path();
    let store = HlStore::new(&path);

    let mut states = HashMap::new();
    states.insert(
        "SBIN.NS".to_string(),
        DayBand {
            date: chrono::NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
            high: 300.0,
            low: 290.0,
            last_price: 295.0,
            breakout: BreakoutState::None,
        },
    );
    store.save(&states).unwrap();

    let tracker = HlTracker::initialize(&["SBIN.NS".to_string()], store).await;
    assert!(tracker.snapshot().await.is_empty());

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn corrupt_store_starts_empty() {
    let path = temp_path();
    fs::write(&path, "not json at all").unwrap();

    let tracker = tracker(&["RELIANCE.NS"], &path).await;
    assert!(tracker.snapshot().await.is_empty());

    // Still fully operational afterwards.
    let outcome = tracker.observe("RELIANCE.NS", 100.0, Utc::now()).await;
    assert!(outcome.event.is_none());

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn seed_open_only_seeds_the_first_observation() {
    let path = temp_path();
    let tracker = tracker(&["RELIANCE.NS"], &path).await;
    let ts = ist(2024, 1, 3, 10, 30);

    assert!(tracker.seed_open("RELIANCE.NS", 150.0, 100.0, 120.0, ts).await);

    // A second capture the same day is a no-op.
    assert!(!tracker.seed_open("RELIANCE.NS", 200.0, 50.0, 120.0, ts).await);

    let snap = tracker.snapshot().await;
    assert_eq!(snap["RELIANCE.NS"].high, 150.0);
    assert_eq!(snap["RELIANCE.NS"].low, 100.0);

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn seed_open_never_resets_a_live_band() {
    let path = temp_path();
    let tracker = tracker(&["RELIANCE.NS"], &path).await;
    let ts = ist(2024, 1, 3, 10, 31);

    tracker.observe("RELIANCE.NS", 100.0, ts).await;
    assert!(!tracker.seed_open("RELIANCE.NS", 150.0, 90.0, 120.0, ts).await);

    let snap = tracker.snapshot().await;
    assert_eq!(snap["RELIANCE.NS"].high, 100.0);

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn concurrent_observations_do_not_tear_or_duplicate() {
    let path = temp_path();
    let tracker = tracker(&["RELIANCE.NS"], &path).await;
    let ts = ist(2024, 1, 3, 11, 0);

    // Band of [100, 150] with the price inside it.
    assert!(tracker.seed_open("RELIANCE.NS", 150.0, 100.0, 120.0, ts).await);

    let t1 = {
        let tracker = tracker.clone();
        tokio::spawn(async move { tracker.observe("RELIANCE.NS", 90.0, ts).await })
    };
    let t2 = {
        let tracker = tracker.clone();
        tokio::spawn(async move { tracker.observe("RELIANCE.NS", 200.0, ts).await })
    };
    let (r1, r2) = (t1.await.unwrap(), t2.await.unwrap());

    // Extremes reflect both observations regardless of interleaving.
    let snap = tracker.snapshot().await;
    assert_eq!(snap["RELIANCE.NS"].high, 200.0);
    assert_eq!(snap["RELIANCE.NS"].low, 90.0);

    // Exactly one AboveHigh between the two racers, never zero or two.
    let above_high = [r1.event, r2.event]
        .into_iter()
        .flatten()
        .filter(|e| e.kind == BreakoutKind::AboveHigh)
        .count();
    assert_eq!(above_high, 1);

    let events = tracker.recent_events().await;
    assert_eq!(
        events
            .iter()
            .filter(|e| e.kind == BreakoutKind::AboveHigh)
            .count(),
        1
    );

    let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn rollover_flushes_the_store() {
    let path = temp_path();
    let tracker = tracker(&["RELIANCE.NS"], &path).await;

    tracker
        .observe("RELIANCE.NS", 100.0, ist(2024, 1, 1, 15, 29))
        .await;
    tracker
        .observe("RELIANCE.NS", 102.0, ist(2024, 1, 2, 9, 16))
        .await;

    // The rollover wrote the new day's band without an explicit flush.
    let persisted = HlStore::new(&path).load().unwrap();
    assert_eq!(persisted["RELIANCE.NS"].high, 102.0);

    let _ = fs::remove_file(&path);
}
