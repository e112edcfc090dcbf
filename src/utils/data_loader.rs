use crate::types::UsageEntryData;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Collect every file matching the recursive raw-log glob.
///
/// Unreadable directory entries are skipped.
pub fn collect_jsonl_files(pattern: &str) -> Vec<PathBuf> {
    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::warn!(pattern, error = %e, "invalid raw log pattern");
            return Vec::new();
        }
    };

    paths
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable log path");
                None
            }
        })
        .collect()
}

/// Parse one log line; `None` for blank or malformed lines
pub fn parse_line(line: &str) -> Option<UsageEntryData> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// Parse every line of one raw log file, in physical order.
///
/// An unreadable file yields no entries.
pub fn parse_jsonl_file(path: &Path) -> Vec<UsageEntryData> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping unreadable log file");
            return Vec::new();
        }
    };

    let lines: Vec<&str> = contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();

    // Indexed parallel collect keeps line order
    let entries: Vec<UsageEntryData> = lines.par_iter().filter_map(|line| parse_line(line)).collect();

    let skipped = lines.len() - entries.len();
    if skipped > 0 {
        tracing::debug!(path = %path.display(), skipped, "skipped malformed log lines");
    }

    entries
}

/// Stream the entries of every raw log file.
///
/// Files are read one at a time as the iterator advances; within a file the
/// original line order is preserved.
pub fn scan_raw_logs(pattern: &str) -> impl Iterator<Item = UsageEntryData> + use<> {
    collect_jsonl_files(pattern)
        .into_iter()
        .flat_map(|path| parse_jsonl_file(&path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn assistant_line(message_id: &str, output: u64) -> String {
        format!(
            r#"{{"type":"assistant","timestamp":"2025-11-20T10:00:00Z","requestId":"req_{message_id}","message":{{"id":"{message_id}","role":"assistant","model":"claude-opus-4-5","usage":{{"output_tokens":{output}}}}}}}"#
        )
    }

    #[test]
    fn test_parse_line_skips_garbage() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   ").is_none());
        assert!(parse_line("{not json").is_none());
        assert!(parse_line(r#"{"type":"assistant","message":{"usage":{"output_tokens":"many"}}}"#).is_none());
        assert!(parse_line(&assistant_line("msg_1", 10)).is_some());
    }

    #[test]
    fn test_parse_jsonl_file_preserves_order_and_skips_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        let contents = [
            assistant_line("msg_1", 1),
            "{broken".to_string(),
            String::new(),
            assistant_line("msg_2", 2),
            assistant_line("msg_3", 3),
            // partially written trailing line
            r#"{"type":"assistant","message":{"#.to_string(),
        ]
        .join("\n");
        fs::write(&path, contents).unwrap();

        let ids: Vec<String> = parse_jsonl_file(&path)
            .iter()
            .filter_map(|e| e.message_id().map(|id| id.to_string()))
            .collect();
        assert_eq!(ids, vec!["msg_1", "msg_2", "msg_3"]);
    }

    #[test]
    fn test_scan_raw_logs_recurses_and_survives_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("projects").join("proj-a").join("subagents");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join("projects").join("proj-a").join("one.jsonl"),
            assistant_line("msg_1", 1),
        )
        .unwrap();
        fs::write(nested.join("two.jsonl"), assistant_line("msg_2", 2)).unwrap();
        // not valid UTF-8, so the whole file is unreadable as text
        fs::write(nested.join("bad.jsonl"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(nested.join("notes.txt"), assistant_line("msg_3", 3)).unwrap();

        let pattern = dir.path().join("projects").join("**/*.jsonl");
        let mut ids: Vec<String> = scan_raw_logs(&pattern.to_string_lossy())
            .filter_map(|e| e.message_id().map(|id| id.to_string()))
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["msg_1", "msg_2"]);
    }

    #[test]
    fn test_scan_raw_logs_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("projects").join("**/*.jsonl");
        assert_eq!(scan_raw_logs(&pattern.to_string_lossy()).count(), 0);
    }
}
