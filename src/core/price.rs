//! Fixed-point decimal types. Floating point is never used for price,
//! moving average, min/max or change-percent arithmetic.

use std::fmt;

/// Price with fixed decimal precision, stored as a scaled `i64`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Price(i64);

impl Price {
    /// Number of decimal places carried by the raw representation.
    pub const DECIMALS: u32 = 6;
    const MULTIPLIER: i64 = 10i64.pow(Self::DECIMALS);

    /// Builds a `Price` from a decimal value, truncating beyond `DECIMALS`.
    #[inline(always)]
    pub fn from_f64(value: f64) -> Self {
        Self((value * Self::MULTIPLIER as f64).round() as i64)
    }

    /// Builds a `Price` directly from its scaled raw representation.
    #[inline(always)]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub const fn raw(&self) -> i64 {
        self.0
    }

    #[inline(always)]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / Self::MULTIPLIER as f64
    }

    #[inline(always)]
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Percentage change of `self` relative to `reference`, computed
    /// with integer arithmetic only. Returns `None` if `reference` is
    /// zero (a reference price should never be zero per §3, but the
    /// caller is not trusted to have guaranteed it).
    #[inline(always)]
    pub fn percent_change_from(&self, reference: Price) -> Option<Percent> {
        if reference.0 == 0 {
            return None;
        }
        let numerator = (self.0 - reference.0) as i128 * 100 * Percent::MULTIPLIER as i128;
        let raw = numerator / reference.0 as i128;
        Some(Percent(raw as i64))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", Self::DECIMALS as usize, self.as_f64())
    }
}

/// Signed percentage, fixed-point with its own (finer) precision so
/// severity classification never drifts due to rounding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percent(i64);

impl Percent {
    pub const DECIMALS: u32 = 4;
    const MULTIPLIER: i64 = 10i64.pow(Self::DECIMALS);

    #[inline(always)]
    pub fn from_f64(value: f64) -> Self {
        Self((value * Self::MULTIPLIER as f64).round() as i64)
    }

    #[inline(always)]
    pub const fn raw(&self) -> i64 {
        self.0
    }

    #[inline(always)]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / Self::MULTIPLIER as f64
    }

    #[inline(always)]
    pub fn abs(&self) -> Percent {
        Percent(self.0.abs())
    }

    /// `self * factor`, exact since `factor` is a small integer.
    #[inline(always)]
    pub fn scaled_by(&self, factor: i64) -> Percent {
        Percent(self.0 * factor)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}%", Self::DECIMALS as usize, self.as_f64())
    }
}
