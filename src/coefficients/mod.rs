//! Static coefficient model: per-model energy per token, infrastructure
//! defaults, equivalence constants and uncertainty multipliers.

use crate::types::CoefficientConfig;

/// Energy per 1000 tokens (Wh)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyProfile {
    pub wh_per_1k_input: f64,
    pub wh_per_1k_output: f64,
}

const OPUS: EnergyProfile = EnergyProfile {
    wh_per_1k_input: 0.03,
    wh_per_1k_output: 0.30,
};

const SONNET: EnergyProfile = EnergyProfile {
    wh_per_1k_input: 0.01,
    wh_per_1k_output: 0.10,
};

const HAIKU: EnergyProfile = EnergyProfile {
    wh_per_1k_input: 0.003,
    wh_per_1k_output: 0.03,
};

/// Known model families. Declaration order is the prefix-match tie-break.
///
/// Sonnet figures follow Ren et al. 2025 (Claude 3.7 Sonnet, 0.84 Wh per short
/// query); Opus is scaled ~3x up and Haiku ~3x down from there.
pub const MODEL_ENERGY: &[(&str, EnergyProfile)] = &[
    ("claude-opus-4-6", OPUS),
    ("claude-opus-4-5", OPUS),
    ("claude-sonnet-4-5", SONNET),
    ("claude-sonnet-4", SONNET),
    ("claude-3-7-sonnet", SONNET),
    ("claude-3-5-sonnet", SONNET),
    ("claude-haiku", HAIKU),
    ("claude-3-5-haiku", HAIKU),
];

/// Sonnet-class fallback for unknown models
pub const DEFAULT_ENERGY: EnergyProfile = SONNET;

/// Infrastructure factors from provider sustainability reports
pub const DEFAULTS: CoefficientConfig = CoefficientConfig {
    pue: 1.14,                   // AWS PUE (Ren et al. 2025)
    grid_co2_g_per_kwh: 385.0,   // AWS US weighted average
    wue_onsite_l_per_kwh: 0.18,  // AWS 2024 sustainability report
    wue_offsite_l_per_kwh: 5.11, // Jegham et al. 2025
    cache_read_factor: 0.15,
};

/// Cache creation is billed as full-cost input
pub const CACHE_CREATION_FACTOR: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquivalenceFactors {
    pub google_search_g_co2: f64,
    /// 10 W LED for one minute
    pub led_minute_wh: f64,
    pub water_bottle_ml: f64,
    pub km_gasoline_g_co2: f64,
    pub km_ev_g_co2: f64,
    pub phone_charge_wh: f64,
}

pub const EQUIVALENCES: EquivalenceFactors = EquivalenceFactors {
    google_search_g_co2: 0.11,
    led_minute_wh: 0.17,
    water_bottle_ml: 500.0,
    km_gasoline_g_co2: 230.0,
    km_ev_g_co2: 55.0,
    phone_charge_wh: 17.0,
};

/// Low / high multipliers relative to the central estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertaintyBand {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uncertainty {
    pub energy: UncertaintyBand,
    pub co2: UncertaintyBand,
    pub water: UncertaintyBand,
}

pub const UNCERTAINTY: Uncertainty = Uncertainty {
    energy: UncertaintyBand { low: 0.5, high: 2.0 },
    co2: UncertaintyBand { low: 0.5, high: 1.8 },
    water: UncertaintyBand { low: 0.6, high: 1.5 },
};

/// Resolve a model id to its energy profile.
///
/// Exact match first, then the first table key (in declaration order) that the
/// id starts with, e.g. `claude-opus-4-5-20251101` → `claude-opus-4-5`.
pub fn lookup_energy_profile(model_id: &str) -> EnergyProfile {
    if let Some((_, profile)) = MODEL_ENERGY.iter().find(|(key, _)| *key == model_id) {
        return *profile;
    }

    MODEL_ENERGY
        .iter()
        .find(|(prefix, _)| model_id.starts_with(prefix))
        .map(|(_, profile)| *profile)
        .unwrap_or(DEFAULT_ENERGY)
}
