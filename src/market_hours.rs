//! NSE session arithmetic. The trading date and every schedule decision
//! are evaluated on the Asia/Kolkata calendar, never the host's wall
//! clock, so a poller running in any timezone resets on the right day.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Asia::Kolkata;

const MARKET_OPEN: (u32, u32) = (9, 15);
const MARKET_CLOSE: (u32, u32) = (15, 30);

/// Calendar day a timestamp belongs to on the exchange's clock.
pub fn trading_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Kolkata).date_naive()
}

/// True during the NSE cash session, 09:15–15:30 IST on weekdays.
pub fn is_market_open(now: DateTime<Utc>) -> bool {
    let local = now.with_timezone(&Kolkata);

    match local.weekday() {
        Weekday::Sat | Weekday::Sun => return false,
        _ => {}
    }

    let t = local.time();
    t >= naive(MARKET_OPEN) && t <= naive(MARKET_CLOSE)
}

/// True once the daily open-capture slot (`hour:minute` IST) has passed.
pub fn capture_due(now: DateTime<Utc>, hour: u32, minute: u32) -> bool {
    let Some(slot) = NaiveTime::from_hms_opt(hour, minute, 0) else {
        return false;
    };
    now.with_timezone(&Kolkata).time() >= slot
}

fn naive((h, m): (u32, u32)) -> NaiveTime {
    // Both constants are valid wall times.
    NaiveTime::from_hms_opt(h, m, 0).expect("static session time")
}
