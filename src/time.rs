//! Temporal helpers for deadline arithmetic.
//!
//! Variable policies accrue penalties in whole *late units*: any started
//! period counts as a full one. Extensions move boundary instants by a signed
//! delta, saturating at the representable range instead of panicking.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Granularity at which a Variable policy's late penalty accrues.
///
/// Always strictly positive and at most `i64::MAX` nanoseconds (about 292
/// years). Serialized as an integer count of nanoseconds, so every period
/// round-trips exactly.
///
/// # Examples
///
/// ```
/// use gradetime::LatePeriod;
/// use chrono::Duration;
///
/// let period = LatePeriod::new(Duration::minutes(5)).unwrap();
/// assert_eq!(period.units_covering(Duration::seconds(1)), 1);
/// assert_eq!(period.units_covering(Duration::minutes(5)), 1);
/// assert_eq!(period.units_covering(Duration::seconds(301)), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LatePeriod(Duration);

impl LatePeriod {
    /// Creates a late period.
    ///
    /// # Errors
    ///
    /// - `NonPositiveLatePeriod` if `period <= 0`.
    /// - `LatePeriodOutOfRange` if `period` has no `i64` nanosecond count.
    pub fn new(period: Duration) -> Result<Self, ConfigurationError> {
        if period <= Duration::zero() {
            return Err(ConfigurationError::NonPositiveLatePeriod { period });
        }
        if period.num_nanoseconds().is_none() {
            return Err(ConfigurationError::LatePeriodOutOfRange { period });
        }
        Ok(Self(period))
    }

    /// A period of whole minutes; `None` unless positive and in range.
    #[must_use]
    pub fn minutes(minutes: i64) -> Option<Self> {
        Duration::try_minutes(minutes).and_then(|d| Self::new(d).ok())
    }

    /// A period of whole hours; `None` unless positive and in range.
    #[must_use]
    pub fn hours(hours: i64) -> Option<Self> {
        Duration::try_hours(hours).and_then(|d| Self::new(d).ok())
    }

    /// A period of whole days; `None` unless positive and in range.
    #[must_use]
    pub fn days(days: i64) -> Option<Self> {
        Duration::try_days(days).and_then(|d| Self::new(d).ok())
    }

    /// The period as a chrono duration.
    #[must_use]
    pub const fn duration(self) -> Duration {
        self.0
    }

    /// Number of started periods in `amount`, rounding any remainder up.
    ///
    /// Exactly one period is one unit. Zero or negative amounts are zero units.
    /// Saturates at `i64::MAX`.
    #[must_use]
    pub fn units_covering(self, amount: Duration) -> i64 {
        let amount = total_nanos(amount);
        if amount <= 0 {
            return 0;
        }
        let period = total_nanos(self.0);
        let units = (amount + period - 1) / period;
        i64::try_from(units).unwrap_or(i64::MAX)
    }
}

impl TryFrom<i64> for LatePeriod {
    type Error = ConfigurationError;

    fn try_from(nanos: i64) -> Result<Self, Self::Error> {
        Self::new(Duration::nanoseconds(nanos))
    }
}

impl From<LatePeriod> for i64 {
    fn from(period: LatePeriod) -> Self {
        // `new` guarantees the count fits.
        period.0.num_nanoseconds().unwrap_or(i64::MAX)
    }
}

impl fmt::Display for LatePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn total_nanos(d: Duration) -> i128 {
    i128::from(d.num_seconds()) * NANOS_PER_SECOND + i128::from(d.subsec_nanos())
}

/// Moves `at` by `delta`, clamping to the representable range.
#[must_use]
pub fn shift_instant(at: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    at.checked_add_signed(delta).unwrap_or(if delta > Duration::zero() {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    })
}
