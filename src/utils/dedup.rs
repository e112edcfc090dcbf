use crate::constants::UNKNOWN_MODEL;
use crate::types::{DedupeKey, UsageEntryData, UsageRecord};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// First-seen-wins filter over raw log entries.
///
/// Every assistant response carrying a usage block claims its dedupe key,
/// including all-zero streaming fragments, so the first line with a given
/// key decides whether that key is counted.
#[derive(Debug, Default)]
pub struct Deduper {
    seen: HashSet<DedupeKey>,
}

impl Deduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an entry, or `None` when it is not a usage-bearing assistant
    /// response or its key was already seen
    pub fn admit(&mut self, entry: UsageEntryData) -> Option<UsageRecord> {
        if !entry.is_assistant_response() {
            return None;
        }

        let key = entry.dedupe_key();
        let message = entry.message?;
        let tokens = message.usage.as_ref()?.counts();
        if !self.seen.insert(key) {
            return None;
        }

        if tokens.is_zero() {
            return None;
        }

        Some(UsageRecord {
            model: message
                .model
                .filter(|model| !model.is_empty())
                .unwrap_or_else(|| UNKNOWN_MODEL.to_string()),
            tokens,
            timestamp: entry.timestamp.as_deref().and_then(parse_timestamp),
            session_id: entry.session_id,
            request_id: entry.request_id,
            message_id: message.id,
        })
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Lazily deduplicate and filter a stream of entries, preserving input order
pub fn dedupe_and_filter(
    entries: impl IntoIterator<Item = UsageEntryData>,
) -> impl Iterator<Item = UsageRecord> {
    let mut deduper = Deduper::new();
    entries
        .into_iter()
        .filter_map(move |entry| deduper.admit(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::data_loader::parse_line;

    fn entry(json: &str) -> UsageEntryData {
        parse_line(json).unwrap()
    }

    fn assistant(message_id: &str, request_id: &str, output: u64) -> UsageEntryData {
        entry(&format!(
            r#"{{"type":"assistant","timestamp":"2025-11-20T10:00:00.000Z","requestId":"{request_id}","sessionId":"s-1","message":{{"id":"{message_id}","role":"assistant","model":"claude-opus-4-5-20251101","usage":{{"input_tokens":10,"output_tokens":{output}}}}}}}"#
        ))
    }

    #[test]
    fn test_duplicate_keeps_first_occurrence() {
        let records: Vec<UsageRecord> = dedupe_and_filter(vec![
            assistant("msg_1", "req_1", 100),
            assistant("msg_1", "req_1", 999),
            assistant("msg_2", "req_2", 5),
        ])
        .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tokens.output, 100);
        assert_eq!(records[1].tokens.output, 5);
    }

    #[test]
    fn test_zero_usage_first_occurrence_claims_key() {
        let zero = || {
            entry(
                r#"{"type":"assistant","requestId":"req_1","sessionId":"s-1","message":{"id":"msg_1","role":"assistant","model":"m","usage":{"input_tokens":0,"output_tokens":0}}}"#,
            )
        };

        let mut deduper = Deduper::new();
        assert!(deduper.admit(zero()).is_none());
        assert_eq!(deduper.seen_count(), 1);

        let records: Vec<UsageRecord> =
            dedupe_and_filter(vec![zero(), assistant("msg_1", "req_1", 7)]).collect();
        assert!(records.is_empty());

        // A different key is unaffected
        let records: Vec<UsageRecord> =
            dedupe_and_filter(vec![zero(), assistant("msg_2", "req_2", 7)]).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tokens.output, 7);
    }

    #[test]
    fn test_non_assistant_lines_ignored() {
        let user = entry(r#"{"type":"user","message":{"role":"user","content":"hello"}}"#);
        let summary = entry(r#"{"type":"summary","summary":"Refactor"}"#);
        let mut deduper = Deduper::new();
        assert!(deduper.admit(user).is_none());
        assert!(deduper.admit(summary).is_none());
        assert_eq!(deduper.seen_count(), 0);
    }

    #[test]
    fn test_missing_model_defaults_to_unknown() {
        let record = Deduper::new()
            .admit(entry(
                r#"{"type":"assistant","message":{"role":"assistant","usage":{"output_tokens":3}}}"#,
            ))
            .unwrap();
        assert_eq!(record.model, UNKNOWN_MODEL);
        assert!(record.timestamp.is_none());
    }

    #[test]
    fn test_record_fields() {
        let record = Deduper::new().admit(assistant("msg_9", "req_9", 1)).unwrap();
        assert_eq!(record.model, "claude-opus-4-5-20251101");
        assert_eq!(record.tokens.input, 10);
        assert_eq!(record.message_id.as_ref().map(|id| id.as_str()), Some("msg_9"));
        assert_eq!(record.request_id.as_ref().map(|id| id.as_str()), Some("req_9"));
        assert_eq!(record.session_id.as_ref().map(|id| id.as_str()), Some("s-1"));
        assert_eq!(
            record.timestamp.map(|ts| ts.to_rfc3339()),
            Some("2025-11-20T10:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_unparseable_timestamp_is_none() {
        let record = Deduper::new()
            .admit(entry(
                r#"{"type":"assistant","timestamp":"yesterday","message":{"role":"assistant","model":"m","usage":{"output_tokens":3}}}"#,
            ))
            .unwrap();
        assert!(record.timestamp.is_none());
    }
}
