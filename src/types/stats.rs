use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};

/// Summary structure maintained by the upstream logging tool (`stats-cache.json`).
///
/// Only the sections this crate reads are modelled; every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsCache {
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_usage: BTreeMap<String, ModelUsage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub daily_model_tokens: Vec<DailyModelTokens>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub daily_activity: Vec<DailyActivity>,
}

/// Cumulative usage for one model since records began
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub input_tokens: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output_tokens: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cache_read_input_tokens: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cache_creation_input_tokens: u64,
}

/// Output-token counts per model for one local calendar day
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyModelTokens {
    pub date: String,
    #[serde(default, deserialize_with = "null_counts_as_zero")]
    pub tokens_by_model: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_count: u64,
}

// The upstream tool writes `null` for counters it never filled in
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_counts_as_zero<'de, D>(deserializer: D) -> Result<BTreeMap<String, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let counts = Option::<BTreeMap<String, Option<u64>>>::deserialize(deserializer)?;
    Ok(counts
        .unwrap_or_default()
        .into_iter()
        .map(|(model, count)| (model, count.unwrap_or(0)))
        .collect())
}

impl StatsCache {
    /// Activity records keyed by date; the last record wins for repeated dates
    pub fn activity_by_date(&self) -> HashMap<&str, &DailyActivity> {
        self.daily_activity
            .iter()
            .map(|activity| (activity.date.as_str(), activity))
            .collect()
    }
}
