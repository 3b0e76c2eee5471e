//! Signed point amounts.
//!
//! Deadline policies award bonuses (positive) or apply penalties (negative)
//! to a gradable event's earned score. Points are fractional because graders
//! routinely award half points.

use std::fmt;
use std::ops::{Add, Neg};

use serde::{Deserialize, Serialize};

/// A signed point adjustment or score.
///
/// # Examples
///
/// ```
/// use gradetime::Points;
///
/// let penalty = Points::new(-2.0);
/// assert_eq!(penalty.scaled(3), Points::new(-6.0));
/// assert_eq!(-Points::new(37.5), Points::new(-37.5));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Points(f64);

impl Points {
    /// No adjustment.
    pub const ZERO: Self = Self(0.0);

    /// Wraps a raw point value.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// The raw point value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// True for `0.0` and `-0.0`.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// False for NaN and either infinity.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Multiplies by a whole number of late units.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scaled(self, units: i64) -> Self {
        Self(self.0 * units as f64)
    }
}

impl From<f64> for Points {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<Points> for f64 {
    fn from(value: Points) -> Self {
        value.0
    }
}

impl Add for Points {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Neg for Points {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
