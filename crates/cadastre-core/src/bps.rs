//! Basis-point percentages
//!
//! All percentages in the protocol are integer basis points in the range
//! 0..=10_000. Applying a percentage to an amount floors the result; any
//! truncation remainder is settled by the caller (the settlement ledger
//! accrues it to the service-fee pool so splits always sum exactly).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard cap on a validator unit's royalty percentage.
pub const MAX_ROYALTY_BPS: u16 = 500;

/// Denominator for basis-point arithmetic.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// A percentage in basis points, bounded to 0..=10_000.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BasisPoints(u16);

/// Error for a basis-point value above 10_000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("basis points out of range: {0}")]
pub struct InvalidBasisPoints(pub u16);

impl BasisPoints {
    /// The maximum representable percentage (100%).
    pub const MAX: BasisPoints = BasisPoints(10_000);

    /// The zero percentage.
    pub const ZERO: BasisPoints = BasisPoints(0);

    /// Construct from a literal known to be in range. Intended for
    /// compile-time constants; asserts the bound.
    pub const fn from_const(bps: u16) -> Self {
        assert!(bps <= 10_000);
        Self(bps)
    }

    /// Construct, rejecting values above 10_000.
    pub fn new(bps: u16) -> Result<Self, InvalidBasisPoints> {
        if u128::from(bps) > BPS_DENOMINATOR {
            return Err(InvalidBasisPoints(bps));
        }
        Ok(Self(bps))
    }

    /// Raw basis-point value.
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Apply to an amount: `amount * bps / 10_000`, floored.
    ///
    /// Computed as `(a/d)*b + (a%d)*b/d`, which equals the naive floor
    /// exactly and cannot overflow for any `u128` amount while `b <= d`.
    pub fn apply(&self, amount: u128) -> u128 {
        let bps = u128::from(self.0);
        (amount / BPS_DENOMINATOR) * bps + (amount % BPS_DENOMINATOR) * bps / BPS_DENOMINATOR
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(BasisPoints::new(10_001).is_err());
        assert_eq!(BasisPoints::new(10_000), Ok(BasisPoints::MAX));
    }

    #[test]
    fn apply_floors() {
        let bps = BasisPoints::new(1_000).unwrap();
        assert_eq!(bps.apply(100), 10);
        assert_eq!(bps.apply(99), 9);
        assert_eq!(BasisPoints::ZERO.apply(u128::MAX / 20_000), 0);
    }

    proptest! {
        #[test]
        fn apply_never_exceeds_amount(bps in 0u16..=10_000, amount in proptest::num::u128::ANY) {
            let bps = BasisPoints::new(bps).unwrap();
            prop_assert!(bps.apply(amount) <= amount);
        }

        #[test]
        fn apply_matches_naive_floor_when_in_range(
            bps in 0u16..=10_000,
            amount in 0u128..=u128::MAX / 10_000,
        ) {
            let bps = BasisPoints::new(bps).unwrap();
            prop_assert_eq!(bps.apply(amount), amount * u128::from(bps.as_u16()) / 10_000);
        }
    }
}
