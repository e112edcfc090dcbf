use super::ids::{DedupeKey, EntryUuid, MessageId, RequestId, SessionId};
use super::stats::ModelUsage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Marker carried by completed model responses in `type` and `message.role`
pub const ASSISTANT_MARKER: &str = "assistant";

// One line of a raw per-request log file, deserialized as-is
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntryData {
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub timestamp: Option<String>,
    pub message: Option<Message>,
    pub request_id: Option<RequestId>,
    pub uuid: Option<EntryUuid>,
    pub session_id: Option<SessionId>,
}

impl UsageEntryData {
    /// True for completed assistant responses that carry a usage block
    pub fn is_assistant_response(&self) -> bool {
        self.entry_type.as_deref() == Some(ASSISTANT_MARKER)
            && self.message.as_ref().is_some_and(|message| {
                message.role.as_deref() == Some(ASSISTANT_MARKER) && message.usage.is_some()
            })
    }

    pub fn message_id(&self) -> Option<&MessageId> {
        self.message.as_ref().and_then(|m| m.id.as_ref())
    }

    pub fn dedupe_key(&self) -> DedupeKey {
        DedupeKey::from_parts(
            self.message_id(),
            self.request_id.as_ref(),
            self.uuid.as_ref(),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    pub id: Option<MessageId>,
    pub role: Option<String>,
    pub model: Option<String>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub cache_creation_input_tokens: Option<u64>,
    pub cache_read_input_tokens: Option<u64>,
}

impl Usage {
    pub fn counts(&self) -> TokenCounts {
        TokenCounts {
            input: self.input_tokens.unwrap_or(0),
            output: self.output_tokens.unwrap_or(0),
            cache_read: self.cache_read_input_tokens.unwrap_or(0),
            cache_creation: self.cache_creation_input_tokens.unwrap_or(0),
        }
    }
}

/// The four token counters tracked per model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenCounts {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_creation: u64,
}

impl TokenCounts {
    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> u64 {
        self.input
            .saturating_add(self.output)
            .saturating_add(self.cache_read)
            .saturating_add(self.cache_creation)
    }
}

impl AddAssign for TokenCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.input = self.input.saturating_add(rhs.input);
        self.output = self.output.saturating_add(rhs.output);
        self.cache_read = self.cache_read.saturating_add(rhs.cache_read);
        self.cache_creation = self.cache_creation.saturating_add(rhs.cache_creation);
    }
}

impl From<&ModelUsage> for TokenCounts {
    fn from(usage: &ModelUsage) -> Self {
        TokenCounts {
            input: usage.input_tokens,
            output: usage.output_tokens,
            cache_read: usage.cache_read_input_tokens,
            cache_creation: usage.cache_creation_input_tokens,
        }
    }
}

/// Estimator input: a model plus its token counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read: u64,
    pub cache_creation: u64,
}

impl TokenUsage {
    pub fn new(model: impl Into<String>, counts: TokenCounts) -> Self {
        Self {
            model: model.into(),
            input_tokens: counts.input,
            output_tokens: counts.output,
            cache_read: counts.cache_read,
            cache_creation: counts.cache_creation,
        }
    }
}

/// A deduplicated, admitted model response
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub model: String,
    pub tokens: TokenCounts,
    /// `None` when the line had no timestamp or it did not parse
    pub timestamp: Option<DateTime<Utc>>,
    pub session_id: Option<SessionId>,
    pub request_id: Option<RequestId>,
    pub message_id: Option<MessageId>,
}
