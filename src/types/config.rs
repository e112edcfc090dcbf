use serde::{Deserialize, Serialize};

/// Infrastructure coefficients applied on top of the per-model energy table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientConfig {
    /// Power-usage effectiveness
    pub pue: f64,
    #[serde(rename = "gridCO2_gPerKwh")]
    pub grid_co2_g_per_kwh: f64,
    #[serde(rename = "wueOnsite_LPerKwh")]
    pub wue_onsite_l_per_kwh: f64,
    #[serde(rename = "wueOffsite_LPerKwh")]
    pub wue_offsite_l_per_kwh: f64,
    /// Energy of a cache read relative to fresh input
    #[serde(rename = "cacheReadFactor")]
    pub cache_read_factor: f64,
}

impl Default for CoefficientConfig {
    fn default() -> Self {
        crate::coefficients::DEFAULTS
    }
}

/// The five overridable coefficient fields, in persisted-key form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoefficientField {
    Pue,
    GridCo2,
    WueOnsite,
    WueOffsite,
    CacheReadFactor,
}

impl CoefficientField {
    pub const ALL: [CoefficientField; 5] = [
        CoefficientField::Pue,
        CoefficientField::GridCo2,
        CoefficientField::WueOnsite,
        CoefficientField::WueOffsite,
        CoefficientField::CacheReadFactor,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CoefficientField::Pue => "pue",
            CoefficientField::GridCo2 => "gridCO2_gPerKwh",
            CoefficientField::WueOnsite => "wueOnsite_LPerKwh",
            CoefficientField::WueOffsite => "wueOffsite_LPerKwh",
            CoefficientField::CacheReadFactor => "cacheReadFactor",
        }
    }
}

/// Partial coefficient record persisted to disk; present fields win over defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pue: Option<f64>,
    #[serde(
        rename = "gridCO2_gPerKwh",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub grid_co2_g_per_kwh: Option<f64>,
    #[serde(
        rename = "wueOnsite_LPerKwh",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub wue_onsite_l_per_kwh: Option<f64>,
    #[serde(
        rename = "wueOffsite_LPerKwh",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub wue_offsite_l_per_kwh: Option<f64>,
    #[serde(
        rename = "cacheReadFactor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cache_read_factor: Option<f64>,
}

impl ConfigOverrides {
    fn slot(&mut self, field: CoefficientField) -> &mut Option<f64> {
        match field {
            CoefficientField::Pue => &mut self.pue,
            CoefficientField::GridCo2 => &mut self.grid_co2_g_per_kwh,
            CoefficientField::WueOnsite => &mut self.wue_onsite_l_per_kwh,
            CoefficientField::WueOffsite => &mut self.wue_offsite_l_per_kwh,
            CoefficientField::CacheReadFactor => &mut self.cache_read_factor,
        }
    }

    pub fn get(&self, field: CoefficientField) -> Option<f64> {
        match field {
            CoefficientField::Pue => self.pue,
            CoefficientField::GridCo2 => self.grid_co2_g_per_kwh,
            CoefficientField::WueOnsite => self.wue_onsite_l_per_kwh,
            CoefficientField::WueOffsite => self.wue_offsite_l_per_kwh,
            CoefficientField::CacheReadFactor => self.cache_read_factor,
        }
    }

    pub fn set(&mut self, field: CoefficientField, value: f64) {
        *self.slot(field) = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        CoefficientField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Merge onto `base`, field by field
    pub fn apply_to(&self, base: CoefficientConfig) -> CoefficientConfig {
        CoefficientConfig {
            pue: self.pue.unwrap_or(base.pue),
            grid_co2_g_per_kwh: self.grid_co2_g_per_kwh.unwrap_or(base.grid_co2_g_per_kwh),
            wue_onsite_l_per_kwh: self
                .wue_onsite_l_per_kwh
                .unwrap_or(base.wue_onsite_l_per_kwh),
            wue_offsite_l_per_kwh: self
                .wue_offsite_l_per_kwh
                .unwrap_or(base.wue_offsite_l_per_kwh),
            cache_read_factor: self.cache_read_factor.unwrap_or(base.cache_read_factor),
        }
    }
}
