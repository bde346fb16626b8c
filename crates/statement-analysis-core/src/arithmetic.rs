//! Guarded arithmetic shared by every analyzer.
//!
//! Statement amounts may sit anywhere in `Decimal`'s range, so every sum,
//! difference, product and quotient over them is checked. A zero denominator
//! and an out-of-range result are handled by the same two policies:
//! - [`safe_ratio`] omits the value (`None`), used for reported ratios and
//!   composite sub-scores.
//! - [`threshold_ratio`] treats the value as `+∞`, used for anomaly thresholds
//!   where an undefined ratio is still directionally meaningful.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::Score;

const SCORE_MIN: Decimal = Decimal::ZERO;
const SCORE_MAX: Decimal = dec!(100);

/// A ratio evaluated for threshold comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioValue {
    Finite(Decimal),
    /// Zero denominator, or a quotient beyond `Decimal`'s range.
    Infinite,
}

impl RatioValue {
    /// `true` when the ratio is strictly above `limit`. Infinite is above everything.
    pub fn above(self, limit: Decimal) -> bool {
        match self {
            RatioValue::Finite(v) => v > limit,
            RatioValue::Infinite => true,
        }
    }

    /// `true` when the ratio is strictly below `limit`. Infinite is below nothing.
    pub fn below(self, limit: Decimal) -> bool {
        match self {
            RatioValue::Finite(v) => v < limit,
            RatioValue::Infinite => false,
        }
    }

    pub fn finite(self) -> Option<Decimal> {
        match self {
            RatioValue::Finite(v) => Some(v),
            RatioValue::Infinite => None,
        }
    }
}

impl std::fmt::Display for RatioValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatioValue::Finite(v) => write!(f, "{}", v.round_dp(3)),
            RatioValue::Infinite => write!(f, "undefined"),
        }
    }
}

/// Divide, omitting the result when the denominator is zero or the quotient
/// overflows.
pub fn safe_ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        None
    } else {
        numerator.checked_div(denominator)
    }
}

/// Divide for threshold comparison, mapping a zero denominator or an
/// overflowed quotient to `+∞`.
pub fn threshold_ratio(numerator: Decimal, denominator: Decimal) -> RatioValue {
    match safe_ratio(numerator, denominator) {
        Some(v) => RatioValue::Finite(v),
        None => RatioValue::Infinite,
    }
}

/// Sum of `values`, `None` if any partial sum overflows.
pub fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// `(value + offset) * factor` clamped to [0, 100], `None` on overflow.
pub fn scaled_score(value: Decimal, offset: Decimal, factor: Decimal) -> Option<Score> {
    value
        .checked_add(offset)?
        .checked_mul(factor)
        .map(clamp_score)
}

/// Clamp a score into [0, 100].
pub fn clamp_score(value: Score) -> Score {
    value.clamp(SCORE_MIN, SCORE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_ratio_zero_denominator_is_omitted() {
        assert_eq!(safe_ratio(dec!(10), Decimal::ZERO), None);
        assert_eq!(safe_ratio(dec!(10), dec!(4)), Some(dec!(2.5)));
    }

    #[test]
    fn test_threshold_ratio_zero_denominator_is_infinite() {
        let r = threshold_ratio(dec!(5), Decimal::ZERO);
        assert_eq!(r, RatioValue::Infinite);
        assert!(r.above(dec!(1_000_000)));
        assert!(!r.below(dec!(1)));
    }

    #[test]
    fn test_finite_comparisons_are_strict() {
        let r = threshold_ratio(dec!(1), dec!(1));
        assert!(!r.above(Decimal::ONE));
        assert!(!r.below(Decimal::ONE));
        assert!(r.below(dec!(1.01)));
    }

    #[test]
    fn test_overflowing_quotient_follows_zero_denominator_policies() {
        let tiny = dec!(0.000000000000000001);
        let big = dec!(1_000_000_000_000);
        assert_eq!(safe_ratio(big, tiny), None);
        assert_eq!(threshold_ratio(big, tiny), RatioValue::Infinite);
    }

    #[test]
    fn test_checked_sum_and_scaled_score() {
        assert_eq!(checked_sum([dec!(1), dec!(2), dec!(-0.5)]), Some(dec!(2.5)));
        assert_eq!(checked_sum([Decimal::MAX, Decimal::ONE]), None);
        assert_eq!(scaled_score(dec!(0.05), dec!(0.1), dec!(500)), Some(dec!(75)));
        assert_eq!(scaled_score(dec!(3), dec!(0.1), dec!(500)), Some(dec!(100)));
        assert_eq!(scaled_score(Decimal::MAX, dec!(0.1), dec!(500)), None);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(dec!(105)), dec!(100));
        assert_eq!(clamp_score(dec!(-3)), Decimal::ZERO);
        assert_eq!(clamp_score(dec!(42.5)), dec!(42.5));
    }
}
