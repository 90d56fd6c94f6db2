use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inclusive `[minimum, maximum]` pair used as the "did it change" key of an axis.
///
/// Construction performs no validation so callers can build inverted or
/// sentinel ranges on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRange<T> {
    pub minimum: T,
    pub maximum: T,
}

impl<T: Copy> ValueRange<T> {
    #[must_use]
    pub const fn new(minimum: T, maximum: T) -> Self {
        Self { minimum, maximum }
    }

    #[must_use]
    pub fn with_minimum(self, minimum: T) -> Self {
        Self { minimum, ..self }
    }

    #[must_use]
    pub fn with_maximum(self, maximum: T) -> Self {
        Self { maximum, ..self }
    }
}

impl<T: Copy + PartialOrd> ValueRange<T> {
    #[must_use]
    pub fn contains(self, value: T) -> bool {
        self.minimum <= value && value <= self.maximum
    }
}

impl ValueRange<f64> {
    #[must_use]
    pub fn span(self) -> f64 {
        self.maximum - self.minimum
    }

    /// Range that any finite value will widen: `(+inf, -inf)`.
    #[must_use]
    pub const fn empty_accumulator() -> Self {
        Self::new(f64::INFINITY, f64::NEG_INFINITY)
    }

    #[must_use]
    pub fn include(self, value: f64) -> Self {
        let mut out = self;
        if value > out.maximum {
            out.maximum = value;
        }
        if value < out.minimum {
            out.minimum = value;
        }
        out
    }
}

impl ValueRange<Decimal> {
    /// Sentinel meaning "not computed yet".
    pub const UNSET: Self = Self::new(Decimal::NEGATIVE_ONE, Decimal::NEGATIVE_ONE);

    /// The whole axis at zoom 1.
    pub const UNIT: Self = Self::new(Decimal::ZERO, Decimal::ONE);

    #[must_use]
    pub fn is_unset(self) -> bool {
        self == Self::UNSET
    }

    #[must_use]
    pub fn span(self) -> Decimal {
        self.maximum - self.minimum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural() {
        assert_eq!(ValueRange::new(1.0, 2.0), ValueRange::new(1.0, 2.0));
        assert_ne!(ValueRange::new(1.0, 2.0), ValueRange::new(1.0, 2.5));
    }

    #[test]
    fn sentinel_is_not_the_unit_window() {
        assert!(ValueRange::<Decimal>::UNSET.is_unset());
        assert!(!ValueRange::<Decimal>::UNIT.is_unset());
        assert_ne!(ValueRange::<Decimal>::UNSET, ValueRange::<Decimal>::UNIT);
    }

    #[test]
    fn inverted_ranges_are_allowed() {
        let range = ValueRange::new(5, 1);
        assert_eq!(range.minimum, 5);
        assert!(!range.contains(3));
    }

    #[test]
    fn accumulator_widens_with_values() {
        let range = ValueRange::empty_accumulator().include(3.0).include(-1.0);
        assert_eq!(range, ValueRange::new(-1.0, 3.0));
    }
}
