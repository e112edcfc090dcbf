//! Live Update Notifier: pushes a fresh all-time summary to every open
//! subscriber after each settled burst of stats-cache changes.

pub mod debounce;
pub mod registry;
pub mod watch;

pub use debounce::{DebounceState, Debouncer};
pub use registry::{SubscriberRegistry, Subscription};
pub use watch::watch_file;

use crate::aggregation::Aggregator;
use crate::config_store::ConfigStore;
use crate::constants::DEBOUNCE_DELAY;
use crate::error::{CcgError, Result};
use crate::source::UsageSource;
use crate::types::Summary;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Event delivered to subscribers, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LiveEvent {
    Connected,
    Update(Box<Summary>),
}

/// Running watcher plus debounce task; both stop when this is dropped
pub struct LiveUpdates {
    _watcher: notify::RecommendedWatcher,
    task: JoinHandle<()>,
}

impl Drop for LiveUpdates {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start watching `stats_file` and broadcasting recomputed summaries.
///
/// Fails only when the watcher cannot be installed.
pub fn spawn_live_updates<S>(
    stats_file: &Path,
    aggregator: Arc<Aggregator<S>>,
    config: Arc<ConfigStore>,
    registry: Arc<SubscriberRegistry>,
) -> Result<LiveUpdates>
where
    S: UsageSource + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    let watcher = watch_file(stats_file, tx)?;

    let task = tokio::spawn(Debouncer::new(DEBOUNCE_DELAY).run(rx, move || {
        let aggregator = Arc::clone(&aggregator);
        let config = Arc::clone(&config);
        let registry = Arc::clone(&registry);
        async move {
            recompute_and_broadcast(aggregator, config, registry).await;
        }
    }));

    Ok(LiveUpdates {
        _watcher: watcher,
        task,
    })
}

/// Recompute the all-time summary off the async workers and push it.
///
/// Returns the number of subscribers that accepted the update.
pub async fn recompute_and_broadcast<S>(
    aggregator: Arc<Aggregator<S>>,
    config: Arc<ConfigStore>,
    registry: Arc<SubscriberRegistry>,
) -> usize
where
    S: UsageSource + 'static,
{
    if registry.is_empty() {
        return 0;
    }

    let computed =
        tokio::task::spawn_blocking(move || aggregator.all_time_summary(&config.current_config()))
            .await;

    match computed {
        Ok(summary) => {
            let delivered = registry.broadcast(&LiveEvent::Update(Box::new(summary)));
            tracing::debug!(delivered, "broadcast summary update");
            delivered
        }
        Err(e) => {
            tracing::warn!(error = %CcgError::from(e), "summary recompute failed");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ClaudeDataSource, MockUsageSource};
    use crate::types::{ModelUsage, StatsCache};
    use crate::utils::DataPaths;
    use serde_json::json;
    use std::fs;
    use std::time::Duration;

    fn aggregator_with_usage() -> Arc<Aggregator<MockUsageSource>> {
        let mut stats = StatsCache::default();
        stats.model_usage.insert(
            "model-a".to_string(),
            ModelUsage {
                input_tokens: 1000,
                output_tokens: 1000,
                ..ModelUsage::default()
            },
        );
        let mut source = MockUsageSource::new();
        source
            .expect_read_summary()
            .returning(move || Some(stats.clone()));
        Arc::new(Aggregator::new(source))
    }

    #[test]
    fn test_connected_event_json() {
        let value = serde_json::to_value(LiveEvent::Connected).unwrap();
        assert_eq!(value, json!({"type": "connected"}));
    }

    #[tokio::test]
    async fn test_update_reaches_subscriber_after_connected() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(ConfigStore::load(dir.path().join("config.json")));
        let registry = Arc::new(SubscriberRegistry::new());
        let mut subscription = registry.subscribe();

        let delivered =
            recompute_and_broadcast(aggregator_with_usage(), config, Arc::clone(&registry)).await;
        assert_eq!(delivered, 1);

        assert_eq!(subscription.recv().await, Some(LiveEvent::Connected));
        let Some(LiveEvent::Update(summary)) = subscription.recv().await else {
            panic!("expected an update event");
        };
        assert!((summary.totals.estimate.co2_g - 0.048279).abs() < 1e-9);

        let value = serde_json::to_value(LiveEvent::Update(summary)).unwrap();
        assert_eq!(value["type"], "update");
        assert!(value.get("co2_g").is_some());
        assert!(value.get("perModel").is_some());
    }

    #[tokio::test]
    async fn test_rapid_writes_push_one_update_with_latest_totals() {
        let dir = tempfile::tempdir().unwrap();
        let stats_file = dir.path().join("stats-cache.json");
        let write_stats = |output: u64| {
            fs::write(
                &stats_file,
                format!(r#"{{"modelUsage":{{"model-a":{{"inputTokens":0,"outputTokens":{output}}}}}}}"#),
            )
            .unwrap();
        };
        write_stats(1);

        let aggregator = Arc::new(Aggregator::new(ClaudeDataSource::new(DataPaths::new(
            dir.path(),
        ))));
        let config = Arc::new(ConfigStore::load(dir.path().join("config.json")));
        let registry = Arc::new(SubscriberRegistry::new());
        let mut subscription = registry.subscribe();
        let _live =
            spawn_live_updates(&stats_file, aggregator, config, Arc::clone(&registry)).unwrap();

        for output in [10, 20, 30, 40] {
            write_stats(output);
        }

        assert_eq!(subscription.recv().await, Some(LiveEvent::Connected));
        let event = tokio::time::timeout(Duration::from_secs(5), subscription.recv())
            .await
            .expect("no update after writes");
        let Some(LiveEvent::Update(summary)) = event else {
            panic!("expected an update event");
        };
        assert_eq!(summary.totals.tokens.output, 40);

        // The burst settles once; nothing else follows
        let next = tokio::time::timeout(DEBOUNCE_DELAY * 3, subscription.recv()).await;
        assert!(next.is_err(), "unexpected second event: {next:?}");
    }

    #[tokio::test]
    async fn test_no_subscribers_skips_recompute() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(ConfigStore::load(dir.path().join("config.json")));
        // No expectations set: a read would panic the blocking task
        let aggregator = Arc::new(Aggregator::new(MockUsageSource::new()));
        let registry = Arc::new(SubscriberRegistry::new());

        assert_eq!(recompute_and_broadcast(aggregator, config, registry).await, 0);
    }
}
