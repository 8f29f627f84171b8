//! Locale independent number formatting
//!
//! Reports are compared byte for byte, so every number goes through one of
//! these helpers instead of ad-hoc `format!` calls.

/// Shortest decimal form that round-trips, `.` separator, never an exponent
///
/// `1.0` -> `1`, `0.6` -> `0.6`, `66.66` -> `66.66`
pub fn format_invariant(value: f64) -> String {
    if value == 0.0 {
        // also folds -0
        return "0".to_string();
    }
    format!("{}", value)
}

/// At most two fraction digits, trailing zeros trimmed
///
/// `12.0` -> `12`, `12.5` -> `12.5`, `1.234` -> `1.23`
pub fn format_max_two_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Boolean attribute in the casing existing Cobertura consumers expect
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_invariant() {
        assert_eq!(format_invariant(1.0), "1");
        assert_eq!(format_invariant(100.0), "100");
        assert_eq!(format_invariant(0.6), "0.6");
        assert_eq!(format_invariant(66.66), "66.66");
        assert_eq!(format_invariant(0.0), "0");
        assert_eq!(format_invariant(-0.0), "0");
    }

    #[test]
    fn test_format_max_two_decimals() {
        assert_eq!(format_max_two_decimals(12.0), "12");
        assert_eq!(format_max_two_decimals(0.0), "0");
        assert_eq!(format_max_two_decimals(12.5), "12.5");
        assert_eq!(format_max_two_decimals(1.234), "1.23");
        assert_eq!(format_max_two_decimals(100.0), "100");
        assert_eq!(format_max_two_decimals(10.0), "10");
    }

    #[test]
    fn test_format_bool() {
        assert_eq!(format_bool(true), "True");
        assert_eq!(format_bool(false), "False");
    }
}
