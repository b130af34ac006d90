use bigdecimal::{BigDecimal, Signed, Zero};
use std::str::FromStr;

pub const CURRENCY: &str = "JOD";

/// Builds an exact amount from hundredths, `cents(150)` is 1.50.
pub fn cents(value: i64) -> BigDecimal {
    BigDecimal::from(value) / BigDecimal::from(100)
}

pub fn round(value: &BigDecimal) -> BigDecimal {
    value.round(2)
}

/// `12.5` renders as `"12.50"`.
pub fn to_string(value: &BigDecimal) -> String {
    format!("{:.2}", value.round(2))
}

pub fn format_jod(value: &BigDecimal) -> String {
    format!("{} {}", to_string(value), CURRENCY)
}

// parses a client supplied amount, only strictly positive values are accepted
pub fn parse_positive(value: &str) -> Option<BigDecimal> {
    let value = BigDecimal::from_str(value.trim()).ok()?;
    if value.is_negative() || value.is_zero() {
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cents() {
        assert_eq!(cents(150), BigDecimal::from_str("1.5").unwrap());
        assert_eq!(cents(100), BigDecimal::from(1));
        assert_eq!(cents(0), BigDecimal::zero());
    }

    #[test]
    fn test_to_string_pads_and_rounds() {
        assert_eq!(to_string(&BigDecimal::from(10)), "10.00");
        assert_eq!(to_string(&cents(450)), "4.50");
        assert_eq!(to_string(&BigDecimal::from_str("13.336").unwrap()), "13.34");
        assert_eq!(format_jod(&cents(500)), "5.00 JOD");
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive(" 5 "), Some(BigDecimal::from(5)));
        assert_eq!(parse_positive("0"), None);
        assert_eq!(parse_positive("-3"), None);
        assert_eq!(parse_positive("abc"), None);
    }
}
