pub mod config;
pub mod estimate;
pub mod ids;
pub mod report;
pub mod stats;
pub mod usage;

pub use config::{CoefficientConfig, CoefficientField, ConfigOverrides};
pub use estimate::{
    AggregateTotals, Equivalences, Estimate, ModelBreakdown, Range, Ranges, TokenTotals, Totals,
};
pub use ids::{DedupeKey, EntryUuid, MessageId, RequestId, SessionId};
pub use report::{DailyRecord, HourlyRecord, PeriodTotals, Summary};
pub use stats::{DailyActivity, DailyModelTokens, ModelUsage, StatsCache};
pub use usage::{Message, TokenCounts, TokenUsage, Usage, UsageEntryData, UsageRecord};
