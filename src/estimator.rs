use crate::coefficients::{
    CACHE_CREATION_FACTOR, EQUIVALENCES, UNCERTAINTY, UncertaintyBand, lookup_energy_profile,
};
use crate::types::{
    AggregateTotals, CoefficientConfig, Equivalences, Estimate, ModelBreakdown, Range, Ranges,
    TokenCounts, TokenUsage, Totals,
};
use std::collections::BTreeMap;

/// Estimate energy, CO2 and water for one model's token usage.
///
/// Pure and total. On-site water follows IT energy only; off-site water follows
/// facility energy (PUE-inclusive).
pub fn estimate(usage: &TokenUsage, config: &CoefficientConfig) -> Estimate {
    let energy = lookup_energy_profile(&usage.model);

    let input_wh = (usage.input_tokens as f64 / 1000.0) * energy.wh_per_1k_input;
    let output_wh = (usage.output_tokens as f64 / 1000.0) * energy.wh_per_1k_output;
    let cache_read_wh =
        (usage.cache_read as f64 / 1000.0) * energy.wh_per_1k_input * config.cache_read_factor;
    let cache_creation_wh =
        (usage.cache_creation as f64 / 1000.0) * energy.wh_per_1k_input * CACHE_CREATION_FACTOR;

    let it_energy_wh = input_wh + output_wh + cache_read_wh + cache_creation_wh;
    let energy_wh = it_energy_wh * config.pue;

    let co2_g = energy_wh * config.grid_co2_g_per_kwh / 1000.0;

    let it_energy_kwh = it_energy_wh / 1000.0;
    let energy_kwh = energy_wh / 1000.0;
    let water_onsite_ml = it_energy_kwh * config.wue_onsite_l_per_kwh * 1000.0;
    let water_offsite_ml = energy_kwh * config.wue_offsite_l_per_kwh * 1000.0;

    Estimate {
        energy_wh,
        it_energy_wh,
        co2_g,
        water_onsite_ml,
        water_offsite_ml,
        water_total_ml: water_onsite_ml + water_offsite_ml,
    }
}

/// Estimate every model and sum the results, along with the raw counters
pub fn aggregate_totals(
    per_model_usage: &BTreeMap<String, TokenCounts>,
    config: &CoefficientConfig,
) -> AggregateTotals {
    let mut estimate_sum = Estimate::default();
    let mut token_sum = TokenCounts::default();
    let mut per_model = BTreeMap::new();

    for (model, tokens) in per_model_usage {
        let result = estimate(&TokenUsage::new(model.as_str(), *tokens), config);
        estimate_sum += result;
        token_sum += *tokens;
        per_model.insert(
            model.clone(),
            ModelBreakdown {
                estimate: result,
                tokens: *tokens,
            },
        );
    }

    AggregateTotals {
        totals: Totals {
            estimate: estimate_sum,
            tokens: token_sum.into(),
        },
        per_model,
    }
}

fn band(central: f64, band: UncertaintyBand) -> Range {
    Range {
        low: central * band.low,
        central,
        high: central * band.high,
    }
}

/// Attach low / central / high ranges to energy, CO2 and total water
pub fn with_uncertainty(result: &Estimate) -> Ranges {
    Ranges {
        energy_wh: band(result.energy_wh, UNCERTAINTY.energy),
        co2_g: band(result.co2_g, UNCERTAINTY.co2),
        water_total_ml: band(result.water_total_ml, UNCERTAINTY.water),
    }
}

/// Convert totals into everyday-activity counts. No rounding.
pub fn equivalences(co2_g: f64, water_ml: f64, energy_wh: f64) -> Equivalences {
    Equivalences {
        google_searches: co2_g / EQUIVALENCES.google_search_g_co2,
        led_minutes: energy_wh / EQUIVALENCES.led_minute_wh,
        water_bottles: water_ml / EQUIVALENCES.water_bottle_ml,
        km_driving_gasoline: co2_g / EQUIVALENCES.km_gasoline_g_co2,
        km_driving_ev: co2_g / EQUIVALENCES.km_ev_g_co2,
        phone_charges: energy_wh / EQUIVALENCES.phone_charge_wh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn usage(model: &str, input: u64, output: u64, cache_read: u64, cache_creation: u64) -> TokenUsage {
        TokenUsage {
            model: model.to_string(),
            input_tokens: input,
            output_tokens: output,
            cache_read,
            cache_creation,
        }
    }

    #[test]
    fn test_estimate_by_hand() {
        let config = CoefficientConfig::default();
        // Default profile: 0.01 Wh / 1k input, 0.10 Wh / 1k output
        let result = estimate(&usage("model-a", 1000, 1000, 0, 0), &config);

        // IT = 0.01 + 0.10 = 0.11 Wh; facility = 0.11 * 1.14 = 0.1254 Wh
        assert_close(result.it_energy_wh, 0.11);
        assert_close(result.energy_wh, 0.1254);
        // 0.1254 Wh * 385 g/kWh / 1000
        assert_close(result.co2_g, 0.048279);
        // on-site: 0.11 Wh * 0.18 L/kWh; off-site: 0.1254 Wh * 5.11 L/kWh
        assert_close(result.water_onsite_ml, 0.0198);
        assert_close(result.water_offsite_ml, 0.640794);
        assert_close(result.water_total_ml, 0.660594);
    }

    #[test]
    fn test_cache_reads_scaled_by_factor() {
        let mut config = CoefficientConfig::default();
        config.cache_read_factor = 0.5;
        config.pue = 1.0;

        let cached = estimate(&usage("claude-opus-4-5", 0, 0, 10_000, 0), &config);
        // 10k tokens * 0.03 Wh/1k * 0.5
        assert_close(cached.it_energy_wh, 0.15);

        let created = estimate(&usage("claude-opus-4-5", 0, 0, 0, 10_000), &config);
        assert_close(created.it_energy_wh, 0.3);
    }

    #[test]
    fn test_estimate_is_non_negative_and_water_adds_up() {
        let config = CoefficientConfig::default();
        let samples = [
            usage("claude-opus-4-6", 0, 0, 0, 0),
            usage("claude-sonnet-4-5", 12, 34_567, 8_901_234, 56_789),
            usage("claude-3-5-haiku", u32::MAX as u64, 1, 0, 3),
            usage("something-else", 1, 1, 1, 1),
        ];

        for sample in &samples {
            let result = estimate(sample, &config);
            for value in [
                result.energy_wh,
                result.it_energy_wh,
                result.co2_g,
                result.water_onsite_ml,
                result.water_offsite_ml,
                result.water_total_ml,
            ] {
                assert!(value >= 0.0, "negative value for {sample:?}");
            }
            assert_eq!(
                result.water_total_ml,
                result.water_onsite_ml + result.water_offsite_ml
            );
        }
    }

    #[test]
    fn test_zero_usage_is_zero_estimate() {
        let result = estimate(&usage("claude-opus-4-5", 0, 0, 0, 0), &CoefficientConfig::default());
        assert_eq!(result, Estimate::default());
    }

    #[test]
    fn test_aggregate_totals_sums_models() {
        let config = CoefficientConfig::default();
        let mut per_model = BTreeMap::new();
        per_model.insert(
            "claude-opus-4-5".to_string(),
            TokenCounts {
                input: 100,
                output: 200,
                cache_read: 300,
                cache_creation: 400,
            },
        );
        per_model.insert(
            "claude-3-5-haiku".to_string(),
            TokenCounts {
                input: 1,
                output: 2,
                cache_read: 3,
                cache_creation: 4,
            },
        );

        let aggregate = aggregate_totals(&per_model, &config);
        assert_eq!(aggregate.per_model.len(), 2);
        assert_eq!(aggregate.totals.tokens.input, 101);
        assert_eq!(aggregate.totals.tokens.cache_creation, 404);
        assert_eq!(aggregate.totals.tokens.total, 1010);

        let summed_co2: f64 = aggregate.per_model.values().map(|m| m.estimate.co2_g).sum();
        assert_close(aggregate.totals.estimate.co2_g, summed_co2);
    }

    #[test]
    fn test_aggregate_totals_empty() {
        let aggregate = aggregate_totals(&BTreeMap::new(), &CoefficientConfig::default());
        assert!(aggregate.per_model.is_empty());
        assert_eq!(aggregate.totals, Totals::default());
    }

    #[test]
    fn test_with_uncertainty_multipliers() {
        let result = Estimate {
            energy_wh: 10.0,
            it_energy_wh: 8.0,
            co2_g: 20.0,
            water_onsite_ml: 10.0,
            water_offsite_ml: 20.0,
            water_total_ml: 30.0,
        };
        let ranges = with_uncertainty(&result);

        assert_close(ranges.energy_wh.low, 5.0);
        assert_close(ranges.energy_wh.high, 20.0);
        assert_close(ranges.co2_g.low, 10.0);
        assert_close(ranges.co2_g.central, 20.0);
        assert_close(ranges.co2_g.high, 36.0);
        assert_close(ranges.water_total_ml.low, 18.0);
        assert_close(ranges.water_total_ml.high, 45.0);
    }

    #[test]
    fn test_equivalences() {
        let eq = equivalences(1.1, 1000.0, 34.0);
        assert_close(eq.google_searches, 10.0);
        assert_close(eq.water_bottles, 2.0);
        assert_close(eq.phone_charges, 2.0);
        assert_close(eq.led_minutes, 200.0);
        assert_close(eq.km_driving_gasoline, 1.1 / 230.0);
        assert_close(eq.km_driving_ev, 0.02);
    }
}
