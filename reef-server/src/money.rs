//! Money calculation utilities using rust_decimal for precision
//!
//! Prices are stored and serialized as `f64`; every computation that adds or
//! multiplies monetary values goes through `Decimal` and is rounded to two
//! decimal places, half-up.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// price × quantity for one line
pub fn line_total(price: f64, quantity: i64) -> f64 {
    to_f64(to_decimal(price) * Decimal::from(quantity))
}

/// Sum of line totals over (price, quantity) pairs
pub fn cart_total<I>(lines: I) -> f64
where
    I: IntoIterator<Item = (f64, i64)>,
{
    let total: Decimal = lines
        .into_iter()
        .map(|(price, qty)| to_decimal(price) * Decimal::from(qty))
        .sum();
    to_f64(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(10.99, 3), 32.97);
        assert_eq!(line_total(0.0, 5), 0.0);
        assert_eq!(line_total(19.99, 1), 19.99);
    }

    #[test]
    fn test_cart_total() {
        let total = cart_total([(10.99, 3), (5.0, 2)]);
        assert_eq!(total, 42.97);
    }

    #[test]
    fn test_cart_total_many_small_items() {
        // 100 lines at 0.01 each
        let total = cart_total((0..100).map(|_| (0.01, 1)));
        assert_eq!(total, 1.0);
    }

    #[test]
    fn test_non_finite_prices_become_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
        assert_eq!(line_total(f64::NAN, 3), 0.0);
    }

    #[test]
    fn test_rounding_half_up() {
        // 0.005 rounds up to 0.01
        let value = Decimal::new(5, 3);
        assert_eq!(to_f64(value), 0.01);

        // 0.004 rounds down to 0.00
        let value = Decimal::new(4, 3);
        assert_eq!(to_f64(value), 0.0);
    }
}
