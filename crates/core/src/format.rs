//! Display formatting for report values. Absent values always render as `N/A`.

pub const NOT_AVAILABLE: &str = "N/A";

const BILLION: f64 = 1e9;
const MILLION: f64 = 1e6;
const THOUSAND: f64 = 1e3;

const BUCKETS: [(f64, &str); 4] = [(BILLION, "B"), (MILLION, "M"), (THOUSAND, "K"), (1.0, "")];

/// Brazilian real amounts bucketed by magnitude: `R$ 2.50B`, `R$ 12.00M`, `R$ 750.00K`.
///
/// A value that rounds up to 1000 of its bucket moves to the next one, so `999_999.999`
/// prints as `R$ 1.00M`, never `R$ 1000.00K`.
pub fn format_currency(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };

    let magnitude = v.abs();
    let mut idx = BUCKETS
        .iter()
        .position(|(unit, _)| magnitude >= *unit)
        .unwrap_or(BUCKETS.len() - 1);
    while idx > 0 && round_cents(magnitude / BUCKETS[idx].0) >= 1000.0 {
        idx -= 1;
    }

    let (unit, suffix) = BUCKETS[idx];
    format!("R$ {:.2}{suffix}", v / unit)
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Share prices are never bucketed.
pub fn format_price(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("R$ {v:.2}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{v:.2}%"),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{v:.decimals$}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_uses_magnitude_buckets() {
        assert_eq!(format_currency(Some(2_500_000_000.0)), "R$ 2.50B");
        assert_eq!(format_currency(Some(750_000.0)), "R$ 750.00K");
        assert_eq!(format_currency(Some(12_000_000.0)), "R$ 12.00M");
        assert_eq!(format_currency(Some(999.5)), "R$ 999.50");
        assert_eq!(format_currency(Some(1_000.0)), "R$ 1.00K");
    }

    #[test]
    fn currency_rounding_never_overflows_a_bucket() {
        assert_eq!(format_currency(Some(999_999.999)), "R$ 1.00M");
        assert_eq!(format_currency(Some(-999_999.999)), "R$ -1.00M");
        assert_eq!(format_currency(Some(999.999)), "R$ 1.00K");
        assert_eq!(format_currency(Some(999_999_999.0)), "R$ 1.00B");
        assert_eq!(format_currency(Some(999_994.0)), "R$ 999.99K");
    }

    #[test]
    fn currency_keeps_sign_of_negative_amounts() {
        assert_eq!(format_currency(Some(-3_200_000.0)), "R$ -3.20M");
    }

    #[test]
    fn absent_values_render_not_available() {
        assert_eq!(format_currency(None), "N/A");
        assert_eq!(format_currency(Some(f64::NAN)), "N/A");
        assert_eq!(format_percent(None), "N/A");
        assert_eq!(format_number(None, 2), "N/A");
        assert_eq!(format_price(None), "N/A");
    }

    #[test]
    fn percent_and_number_round_to_requested_precision() {
        assert_eq!(format_percent(Some(12.346)), "12.35%");
        assert_eq!(format_number(Some(0.8765), 2), "0.88");
        assert_eq!(format_number(Some(3.0), 0), "3");
        assert_eq!(format_price(Some(38.1)), "R$ 38.10");
    }
}
