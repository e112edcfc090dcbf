use crate::types::Summary;
use colored::{ColoredString, Colorize};

// Format number with thousands separator
pub fn format_number_with_commas(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let mut count = 0;

    for c in s.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }

    result.chars().rev().collect()
}

// Format grams of CO2 with a readable unit
pub fn format_mass(grams: f64) -> String {
    if grams >= 1000.0 {
        format!("{:.2} kg", grams / 1000.0)
    } else if grams >= 1.0 {
        format!("{:.1} g", grams)
    } else {
        format!("{:.1} mg", grams * 1000.0)
    }
}

pub fn format_water(ml: f64) -> String {
    if ml >= 1000.0 {
        format!("{:.2} L", ml / 1000.0)
    } else {
        format!("{:.1} ml", ml)
    }
}

pub fn format_energy(wh: f64) -> String {
    if wh >= 1000.0 {
        format!("{:.2} kWh", wh / 1000.0)
    } else {
        format!("{:.2} Wh", wh)
    }
}

// Green under 1 kg, yellow under 10 kg
fn colored_co2(grams: f64) -> ColoredString {
    let text = format_mass(grams);
    if grams < 1000.0 {
        text.green()
    } else if grams < 10_000.0 {
        text.yellow()
    } else {
        text.red()
    }
}

/// One-line terminal summary of all-time impact
pub fn status_line(summary: &Summary) -> String {
    let estimate = &summary.totals.estimate;
    let eq = &summary.equivalences;

    format!(
        "🌱 {co2} CO2 💧 {water} ⚡ {energy} ({tokens} tokens) ≈ {searches} searches, {km:.1} km driven, {charges:.1} phone charges",
        co2 = colored_co2(estimate.co2_g),
        water = format_water(estimate.water_total_ml).cyan(),
        energy = format_energy(estimate.energy_wh).yellow(),
        tokens = format_number_with_commas(summary.totals.tokens.total),
        searches = format_number_with_commas(eq.google_searches.round() as u64),
        km = eq.km_driving_gasoline,
        charges = eq.phone_charges,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_with_commas() {
        assert_eq!(format_number_with_commas(0), "0");
        assert_eq!(format_number_with_commas(999), "999");
        assert_eq!(format_number_with_commas(1000), "1,000");
        assert_eq!(format_number_with_commas(1234567), "1,234,567");
    }

    #[test]
    fn test_unit_formatting() {
        assert_eq!(format_mass(0.048279), "48.3 mg");
        assert_eq!(format_mass(12.34), "12.3 g");
        assert_eq!(format_mass(2500.0), "2.50 kg");
        assert_eq!(format_water(0.66), "0.7 ml");
        assert_eq!(format_water(1500.0), "1.50 L");
        assert_eq!(format_energy(0.1254), "0.13 Wh");
        assert_eq!(format_energy(2000.0), "2.00 kWh");
    }
}
