use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

const EPSILON: f64 = 1e-8;

#[must_use]
pub fn is_zero(value: f64) -> bool {
    value.abs() < 10.0 * EPSILON
}

#[must_use]
pub fn is_one(value: f64) -> bool {
    is_zero(value - 1.0)
}

/// Relative closeness used when walking tick sequences.
#[must_use]
pub fn are_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let tolerance = (a.abs() + b.abs() + 10.0) * EPSILON;
    (a - b).abs() < tolerance
}

#[must_use]
pub fn decimal_is_zero(value: Decimal) -> bool {
    is_zero(decimal_to_f64(value))
}

#[must_use]
pub fn decimal_is_one(value: Decimal) -> bool {
    is_one(decimal_to_f64(value))
}

#[must_use]
pub fn decimals_are_close(a: Decimal, b: Decimal) -> bool {
    a == b || are_close(decimal_to_f64(a), decimal_to_f64(b))
}

/// Lossy conversion; values outside the `f64` range saturate to zero.
#[must_use]
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Returns `None` for NaN, infinities and magnitudes `Decimal` cannot hold.
#[must_use]
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

#[must_use]
pub fn datetime_to_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

#[must_use]
pub fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closeness_tolerates_accumulated_error() {
        assert!(are_close(0.1 + 0.2, 0.3));
        assert!(!are_close(0.3, 0.31));
        assert!(is_one(0.999_999_999_9));
        assert!(is_zero(-1e-12));
    }

    #[test]
    fn non_finite_floats_do_not_convert() {
        assert!(decimal_from_f64(f64::NAN).is_none());
        assert!(decimal_from_f64(f64::INFINITY).is_none());
        assert_eq!(decimal_from_f64(0.25), Some(Decimal::new(25, 2)));
    }
}
