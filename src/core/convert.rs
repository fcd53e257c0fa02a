//! Conversion arithmetic

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Number of decimal places in a converted amount.
pub const RESULT_SCALE: u32 = 2;

/// Multiplies `amount` by `rate`, rounding half-up to exactly two decimal places.
///
/// Returns `None` when the product does not fit in a [`Decimal`] with two
/// decimal places to spare.
pub fn convert(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    let mut converted = amount
        .checked_mul(rate)?
        .round_dp_with_strategy(RESULT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    converted.rescale(RESULT_SCALE);
    (converted.scale() == RESULT_SCALE).then_some(converted)
}

/// Parses decimal text exactly, accepting plain (`"12.5"`) and scientific (`"1.25e1"`) notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn converted(amount: &str, rate: &str) -> String {
        convert(dec(amount), dec(rate)).unwrap().to_string()
    }

    #[test]
    fn test_convert_pads_to_two_places() {
        assert_eq!(converted("10", "1.1"), "11.00");
        assert_eq!(converted("10", "1.05"), "10.50");
        assert_eq!(converted("10", "1"), "10.00");
    }

    #[test]
    fn test_convert_rounds_half_up() {
        assert_eq!(converted("1", "2.345"), "2.35");
        assert_eq!(converted("1", "2.344"), "2.34");
        assert_eq!(converted("3", "0.3335"), "1.00");
        assert_eq!(converted("-1", "2.345"), "-2.35");
    }

    #[test]
    fn test_convert_is_deterministic() {
        let amount = dec("1234.5678");
        let rate = dec("0.912345");
        let first = convert(amount, rate).unwrap();
        for _ in 0..10 {
            assert_eq!(convert(amount, rate), Some(first));
        }
        assert_eq!(first.scale(), RESULT_SCALE);
    }

    #[test]
    fn test_convert_small_amounts() {
        assert_eq!(converted("0.001", "1.2"), "0.00");
        assert_eq!(converted("0", "98.7"), "0.00");
    }

    #[test]
    fn test_convert_rejects_products_without_room_for_cents() {
        // Overflows the 96-bit mantissa
        assert_eq!(convert(dec("50000000000000000000000000000"), dec("2")), None);
        // Fits, but only with a single fractional digit
        assert_eq!(convert(dec("1000000000000000000000000000"), dec("1.5")), None);

        let largest = convert(dec("100000000000000000000000000"), dec("1.5")).unwrap();
        assert_eq!(largest.scale(), RESULT_SCALE);
        assert_eq!(largest.to_string(), "150000000000000000000000000.00");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("12.5"), Some(dec("12.5")));
        assert_eq!(parse_decimal("-0.25"), Some(dec("-0.25")));
        assert_eq!(parse_decimal("1e3"), Some(Decimal::from(1000)));
        assert_eq!(parse_decimal("2.5E-2"), Some(dec("0.025")));
        assert_eq!(
            parse_decimal("0.30000000000000004").unwrap().to_string(),
            "0.30000000000000004"
        );
        for text in ["", "abc", "NaN", "inf", "12abc", "1e-30"] {
            assert_eq!(parse_decimal(text), None, "{text:?} should not parse");
        }
    }
}
