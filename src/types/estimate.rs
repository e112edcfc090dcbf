use super::usage::TokenCounts;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// Energy, CO2 and water estimate for some amount of token usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Estimate {
    /// Facility energy (IT energy times PUE)
    pub energy_wh: f64,
    pub it_energy_wh: f64,
    pub co2_g: f64,
    pub water_onsite_ml: f64,
    pub water_offsite_ml: f64,
    pub water_total_ml: f64,
}

impl AddAssign for Estimate {
    fn add_assign(&mut self, rhs: Self) {
        self.energy_wh += rhs.energy_wh;
        self.it_energy_wh += rhs.it_energy_wh;
        self.co2_g += rhs.co2_g;
        self.water_onsite_ml += rhs.water_onsite_ml;
        self.water_offsite_ml += rhs.water_offsite_ml;
        self.water_total_ml += rhs.water_total_ml;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub low: f64,
    pub central: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranges {
    pub energy_wh: Range,
    pub co2_g: Range,
    pub water_total_ml: Range,
}

/// Everyday-activity counts equivalent to an estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Equivalences {
    pub google_searches: f64,
    pub led_minutes: f64,
    pub water_bottles: f64,
    pub km_driving_gasoline: f64,
    #[serde(rename = "kmDrivingEV")]
    pub km_driving_ev: f64,
    pub phone_charges: f64,
}

/// Token counters summed across models, with their grand total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenTotals {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_creation: u64,
    pub total: u64,
}

impl From<TokenCounts> for TokenTotals {
    fn from(counts: TokenCounts) -> Self {
        TokenTotals {
            input: counts.input,
            output: counts.output,
            cache_read: counts.cache_read,
            cache_creation: counts.cache_creation,
            total: counts.total(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    #[serde(flatten)]
    pub estimate: Estimate,
    pub tokens: TokenTotals,
}

/// One model's estimate together with the counters it was computed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ModelBreakdown {
    #[serde(flatten)]
    pub estimate: Estimate,
    pub tokens: TokenCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateTotals {
    pub totals: Totals,
    #[serde(rename = "perModel")]
    pub per_model: BTreeMap<String, ModelBreakdown>,
}
