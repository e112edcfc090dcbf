use std::time::Duration;

/// Settle delay after the last stats-cache change before a recompute is pushed
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Trailing window covered by the hourly breakdown
pub const HOURLY_WINDOW_HOURS: i64 = 24;

/// Trailing window used by the daily breakdown when none is requested
pub const DEFAULT_DAILY_WINDOW_DAYS: u32 = 30;

pub const DEFAULT_PORT: u16 = 3456;

/// Per-subscriber queue depth; a subscriber that falls this far behind is dropped
pub const SUBSCRIBER_BUFFER: usize = 16;

/// Model name used for raw log entries that do not carry one
pub const UNKNOWN_MODEL: &str = "unknown";
