use crate::types::{StatsCache, UsageRecord};
use crate::utils::{DataPaths, dedupe_and_filter, read_summary, scan_raw_logs};

/// Where aggregations read their external data from.
///
/// Every call re-reads current state; implementations must not cache.
#[cfg_attr(test, mockall::automock)]
pub trait UsageSource: Send + Sync {
    /// The cumulative / daily summary, or `None` when absent or unreadable
    fn read_summary(&self) -> Option<StatsCache>;

    /// Deduplicated records admitted from every raw log file
    fn usage_records(&self) -> Vec<UsageRecord>;
}

/// Reads the upstream tool's data directory on disk
#[derive(Debug, Clone)]
pub struct ClaudeDataSource {
    paths: DataPaths,
}

impl ClaudeDataSource {
    pub fn new(paths: DataPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }
}

impl UsageSource for ClaudeDataSource {
    fn read_summary(&self) -> Option<StatsCache> {
        read_summary(&self.paths.stats_file())
    }

    fn usage_records(&self) -> Vec<UsageRecord> {
        let records: Vec<UsageRecord> =
            dedupe_and_filter(scan_raw_logs(&self.paths.raw_log_pattern())).collect();
        tracing::debug!(count = records.len(), "admitted raw usage records");
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_data_source_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("projects").join("proj");
        fs::create_dir_all(&project).unwrap();
        fs::write(
            dir.path().join("stats-cache.json"),
            r#"{"modelUsage":{"claude-opus-4-5":{"inputTokens":10,"outputTokens":20}}}"#,
        )
        .unwrap();
        let line = r#"{"type":"assistant","timestamp":"2025-11-20T10:00:00Z","requestId":"r1","message":{"id":"m1","role":"assistant","model":"claude-opus-4-5","usage":{"output_tokens":5}}}"#;
        fs::write(project.join("a.jsonl"), format!("{line}\n{line}\n")).unwrap();

        let source = ClaudeDataSource::new(DataPaths::new(dir.path()));
        let summary = source.read_summary().unwrap();
        assert_eq!(summary.model_usage["claude-opus-4-5"].input_tokens, 10);

        let records = source.usage_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tokens.output, 5);
    }

    #[test]
    fn test_data_source_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = ClaudeDataSource::new(DataPaths::new(dir.path()));
        assert!(source.read_summary().is_none());
        assert!(source.usage_records().is_empty());
    }
}
