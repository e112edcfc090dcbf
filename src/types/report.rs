use super::config::CoefficientConfig;
use super::estimate::{Estimate, Equivalences, ModelBreakdown, Ranges, Totals};
use super::usage::TokenCounts;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// All-time summary served to the dashboard and pushed on live updates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    #[serde(flatten)]
    pub totals: Totals,
    pub ranges: Ranges,
    pub equivalences: Equivalences,
    #[serde(rename = "perModel")]
    pub per_model: BTreeMap<String, ModelBreakdown>,
    pub config: CoefficientConfig,
}

/// Estimate totals for one time bucket, broken down by model
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub energy_wh: f64,
    pub co2_g: f64,
    pub water_onsite_ml: f64,
    pub water_offsite_ml: f64,
    pub water_total_ml: f64,
    #[serde(rename = "tokensByModel")]
    pub tokens_by_model: BTreeMap<String, ModelBreakdown>,
}

impl PeriodTotals {
    pub fn add_model(&mut self, model: &str, tokens: TokenCounts, estimate: Estimate) {
        self.energy_wh += estimate.energy_wh;
        self.co2_g += estimate.co2_g;
        self.water_onsite_ml += estimate.water_onsite_ml;
        self.water_offsite_ml += estimate.water_offsite_ml;
        self.water_total_ml += estimate.water_total_ml;
        self.tokens_by_model
            .insert(model.to_string(), ModelBreakdown { estimate, tokens });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    /// Local calendar date, `YYYY-MM-DD`
    pub date: String,
    #[serde(flatten)]
    pub totals: PeriodTotals,
    pub messages: u64,
    pub sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRecord {
    /// Local hour-of-day label, e.g. `"14:00"`
    pub hour: String,
    /// UTC start of the slot
    pub start: DateTime<Utc>,
    #[serde(flatten)]
    pub totals: PeriodTotals,
}
