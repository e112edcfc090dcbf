//! Time bucketing of admitted usage records

use crate::types::{TokenCounts, UsageRecord};
use chrono::{DateTime, Duration, Local, Timelike, Utc};
use std::collections::BTreeMap;

/// Token counters keyed by model id
pub type ModelTokens = BTreeMap<String, TokenCounts>;

/// Truncate a timestamp to the start of its UTC hour
pub fn floor_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// Local calendar date of a timestamp, `YYYY-MM-DD`
pub fn local_date_key(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

fn add_record(buckets: &mut ModelTokens, record: &UsageRecord) {
    *buckets.entry(record.model.clone()).or_default() += record.tokens;
}

/// Group records by local calendar date, then by model.
///
/// Records without a timestamp are excluded.
pub fn bucket_by_date<'a>(
    records: impl IntoIterator<Item = &'a UsageRecord>,
) -> BTreeMap<String, ModelTokens> {
    let mut by_date: BTreeMap<String, ModelTokens> = BTreeMap::new();
    for record in records {
        if let Some(ts) = record.timestamp {
            add_record(by_date.entry(local_date_key(ts)).or_default(), record);
        }
    }
    by_date
}

/// Group records of the trailing window by UTC hour start, then by model.
///
/// Records without a timestamp or older than `now - window_hours` are excluded.
pub fn bucket_by_hour<'a>(
    records: impl IntoIterator<Item = &'a UsageRecord>,
    now: DateTime<Utc>,
    window_hours: i64,
) -> BTreeMap<DateTime<Utc>, ModelTokens> {
    let cutoff = now - Duration::hours(window_hours);
    let mut by_hour: BTreeMap<DateTime<Utc>, ModelTokens> = BTreeMap::new();
    for record in records {
        if let Some(ts) = record.timestamp
            && ts >= cutoff
        {
            add_record(by_hour.entry(floor_to_hour(ts)).or_default(), record);
        }
    }
    by_hour
}
