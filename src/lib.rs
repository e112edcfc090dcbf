// Module declarations
pub mod aggregation;
pub mod buckets;
pub mod coefficients;
pub mod config_store;
pub mod constants;
pub mod error;
pub mod estimator;
pub mod formatting;
pub mod notifier;
pub mod server;
pub mod source;
pub mod types;
pub mod utils;

pub use aggregation::Aggregator;
pub use config_store::ConfigStore;
pub use error::{CcgError, Result};
pub use source::{ClaudeDataSource, UsageSource};
pub use types::{
    CoefficientConfig, DailyRecord, Estimate, HourlyRecord, Summary, TokenCounts, TokenUsage,
    UsageRecord,
};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global tracing subscriber, logging to stderr.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
