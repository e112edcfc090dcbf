use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a NewType wrapper around a `String` identifier
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Session a log line belongs to
    SessionId
);
string_id!(
    /// API request identifier (`requestId`)
    RequestId
);
string_id!(
    /// Model response identifier (`message.id`)
    MessageId
);
string_id!(
    /// Per-line identifier written by the logging tool (`uuid`)
    EntryUuid
);

/// Identity of one logical model response across log rotations and retries.
///
/// Built from message id, request id and uuid joined by [`DedupeKey::SEPARATOR`];
/// a missing part contributes an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey(String);

impl DedupeKey {
    pub const SEPARATOR: char = ':';

    pub fn from_parts(
        message_id: Option<&MessageId>,
        request_id: Option<&RequestId>,
        uuid: Option<&EntryUuid>,
    ) -> Self {
        let message_id = message_id.map(MessageId::as_str).unwrap_or_default();
        let request_id = request_id.map(RequestId::as_str).unwrap_or_default();
        let uuid = uuid.map(EntryUuid::as_str).unwrap_or_default();

        Self(format!(
            "{message_id}{sep}{request_id}{sep}{uuid}",
            sep = Self::SEPARATOR
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
