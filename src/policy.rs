//! Deadline policies for gradable events.
//!
//! A `PolicyDefinition` is validated once, when the gradable event is
//! defined, and then resolved many times (once per submitting group). The
//! three named constructors enforce the cross-field rules of each kind, so a
//! constructed policy can always be resolved.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::points::Points;
use crate::time::LatePeriod;

/// Which deadline rules a gradable event uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// No deadline; every submission is on time.
    None,

    /// Discrete early / on-time / late boundaries, each with fixed points.
    Fixed,

    /// A per-period penalty accruing after the on-time date.
    Variable,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Fixed => write!(f, "fixed"),
            Self::Variable => write!(f, "variable"),
        }
    }
}

/// A boundary date together with the points it implies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Boundary {
    pub date: DateTime<Utc>,
    pub points: Points,
}

/// Per-unit late penalty of a Variable policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LatePenalty {
    pub points: Points,
    pub period: LatePeriod,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum DeadlineRules {
    None,
    Fixed {
        early: Option<Boundary>,
        on_time: DateTime<Utc>,
        late: Option<Boundary>,
    },
    Variable {
        on_time: DateTime<Utc>,
        late_date: Option<DateTime<Utc>>,
        penalty: Option<LatePenalty>,
    },
}

/// Immutable, validated deadline rules of one gradable event.
///
/// # Examples
///
/// ```
/// use gradetime::{LatePeriod, PolicyDefinition, PolicyKind, Points};
/// use chrono::{TimeZone, Utc};
///
/// let due = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
/// let policy = PolicyDefinition::variable(
///     due,
///     None,
///     Some(Points::new(-2.0)),
///     LatePeriod::hours(1),
/// )
/// .unwrap();
/// assert_eq!(policy.kind(), PolicyKind::Variable);
///
/// // A late date needs a penalty to go with it.
/// assert!(PolicyDefinition::variable(due, Some(due), None, None).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolicyRecord", into = "PolicyRecord")]
pub struct PolicyDefinition {
    rules: DeadlineRules,
}

impl PolicyDefinition {
    /// A policy with no deadline.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            rules: DeadlineRules::None,
        }
    }

    /// A fixed-points policy.
    ///
    /// # Errors
    ///
    /// - `MissingField` if an early (late) date has no early (late) points.
    /// - `ExtraneousField` if early (late) points are given without their date.
    /// - `NonFinitePoints` if early or late points are NaN or infinite.
    pub fn fixed(
        early_date: Option<DateTime<Utc>>,
        early_points: Option<Points>,
        on_time_date: DateTime<Utc>,
        late_date: Option<DateTime<Utc>>,
        late_points: Option<Points>,
    ) -> Result<Self, ConfigurationError> {
        let early = pair_boundary(early_date, early_points, "early_points")?;
        let late = pair_boundary(late_date, late_points, "late_points")?;

        warn_if_out_of_order(PolicyKind::Fixed, early_date, on_time_date, late_date);

        Ok(Self {
            rules: DeadlineRules::Fixed {
                early,
                on_time: on_time_date,
                late,
            },
        })
    }

    /// A per-period penalty policy.
    ///
    /// `late_points` and `late_period` must be given together. Without them
    /// anything after the on-time date is NC late.
    ///
    /// # Errors
    ///
    /// - `MissingField` if only one of `late_points` / `late_period` is given,
    ///   or if `late_date` is given without both.
    /// - `NonFinitePoints` if `late_points` is NaN or infinite.
    pub fn variable(
        on_time_date: DateTime<Utc>,
        late_date: Option<DateTime<Utc>>,
        late_points: Option<Points>,
        late_period: Option<LatePeriod>,
    ) -> Result<Self, ConfigurationError> {
        let penalty = match (late_points, late_period) {
            (Some(points), Some(_)) if !points.is_finite() => {
                return Err(non_finite(PolicyKind::Variable, "late_points"));
            }
            (Some(points), Some(period)) => Some(LatePenalty { points, period }),
            (Some(_), None) => return Err(missing(PolicyKind::Variable, "late_period")),
            (None, Some(_)) => return Err(missing(PolicyKind::Variable, "late_points")),
            (None, None) if late_date.is_some() => {
                return Err(missing(PolicyKind::Variable, "late_points"));
            }
            (None, None) => None,
        };

        warn_if_out_of_order(PolicyKind::Variable, None, on_time_date, late_date);

        Ok(Self {
            rules: DeadlineRules::Variable {
                on_time: on_time_date,
                late_date,
                penalty,
            },
        })
    }

    /// Starts a builder for callers assembling fields one at a time.
    #[must_use]
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::new()
    }

    /// Which rules this policy uses.
    #[must_use]
    pub const fn kind(&self) -> PolicyKind {
        match self.rules {
            DeadlineRules::None => PolicyKind::None,
            DeadlineRules::Fixed { .. } => PolicyKind::Fixed,
            DeadlineRules::Variable { .. } => PolicyKind::Variable,
        }
    }

    /// The early boundary; only Fixed policies have one.
    #[must_use]
    pub fn early_date(&self) -> Option<DateTime<Utc>> {
        match self.rules {
            DeadlineRules::Fixed { early, .. } => early.map(|b| b.date),
            _ => None,
        }
    }

    /// The on-time date; `None` only for a policy without a deadline.
    #[must_use]
    pub fn on_time_date(&self) -> Option<DateTime<Utc>> {
        match self.rules {
            DeadlineRules::None => None,
            DeadlineRules::Fixed { on_time, .. } | DeadlineRules::Variable { on_time, .. } => {
                Some(on_time)
            }
        }
    }

    /// The last date a submission still counts as late rather than NC late.
    #[must_use]
    pub fn late_date(&self) -> Option<DateTime<Utc>> {
        match self.rules {
            DeadlineRules::None => None,
            DeadlineRules::Fixed { late, .. } => late.map(|b| b.date),
            DeadlineRules::Variable { late_date, .. } => late_date,
        }
    }

    /// Bonus for meeting the early boundary.
    #[must_use]
    pub fn early_points(&self) -> Option<Points> {
        match self.rules {
            DeadlineRules::Fixed { early, .. } => early.map(|b| b.points),
            _ => None,
        }
    }

    /// Penalty for a late submission; per late unit for Variable policies.
    #[must_use]
    pub fn late_points(&self) -> Option<Points> {
        match self.rules {
            DeadlineRules::None => None,
            DeadlineRules::Fixed { late, .. } => late.map(|b| b.points),
            DeadlineRules::Variable { penalty, .. } => penalty.map(|p| p.points),
        }
    }

    /// Length of one late unit; only Variable policies have one.
    #[must_use]
    pub fn late_period(&self) -> Option<LatePeriod> {
        match self.rules {
            DeadlineRules::Variable { penalty, .. } => penalty.map(|p| p.period),
            _ => None,
        }
    }

    pub(crate) const fn rules(&self) -> &DeadlineRules {
        &self.rules
    }
}

impl Default for PolicyDefinition {
    fn default() -> Self {
        Self::none()
    }
}

fn missing(kind: PolicyKind, field: &'static str) -> ConfigurationError {
    tracing::debug!(%kind, field, "rejected deadline policy: missing field");
    ConfigurationError::MissingField { kind, field }
}

fn extraneous(kind: PolicyKind, field: &'static str) -> ConfigurationError {
    tracing::debug!(%kind, field, "rejected deadline policy: extraneous field");
    ConfigurationError::ExtraneousField { kind, field }
}

fn non_finite(kind: PolicyKind, field: &'static str) -> ConfigurationError {
    tracing::debug!(%kind, field, "rejected deadline policy: non-finite points");
    ConfigurationError::NonFinitePoints { kind, field }
}

fn pair_boundary(
    date: Option<DateTime<Utc>>,
    points: Option<Points>,
    points_field: &'static str,
) -> Result<Option<Boundary>, ConfigurationError> {
    match (date, points) {
        (Some(_), Some(points)) if !points.is_finite() => {
            Err(non_finite(PolicyKind::Fixed, points_field))
        }
        (Some(date), Some(points)) => Ok(Some(Boundary { date, points })),
        (Some(_), None) => Err(missing(PolicyKind::Fixed, points_field)),
        (None, Some(_)) => Err(extraneous(PolicyKind::Fixed, points_field)),
        (None, None) => Ok(None),
    }
}

fn warn_if_out_of_order(
    kind: PolicyKind,
    early: Option<DateTime<Utc>>,
    on_time: DateTime<Utc>,
    late: Option<DateTime<Utc>>,
) {
    if early.is_some_and(|early| early > on_time) {
        tracing::warn!(%kind, ?early, %on_time, "early date falls after on-time date");
    }
    if late.is_some_and(|late| late < on_time) {
        tracing::warn!(%kind, ?late, %on_time, "late date falls before on-time date");
    }
}

/// Builder for `PolicyDefinition`.
///
/// Collects optional fields and routes to the named constructor matching
/// the chosen kind. Fields the kind never uses are rejected rather than
/// ignored.
///
/// # Example
/// ```rust,ignore
/// let policy = PolicyDefinition::builder()
///     .kind(PolicyKind::Fixed)
///     .on_time_date(due)
///     .late_date(due + Duration::days(2))
///     .late_points(Points::new(-10.0))
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    kind: Option<PolicyKind>,
    early_date: Option<DateTime<Utc>>,
    early_points: Option<Points>,
    on_time_date: Option<DateTime<Utc>>,
    late_date: Option<DateTime<Utc>>,
    late_points: Option<Points>,
    late_period: Option<LatePeriod>,
}

impl PolicyBuilder {
    /// An empty builder; `kind` must be set before `build`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy kind.
    #[must_use]
    pub fn kind(mut self, kind: PolicyKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the early boundary date.
    #[must_use]
    pub fn early_date(mut self, date: DateTime<Utc>) -> Self {
        self.early_date = Some(date);
        self
    }

    /// Sets the points for meeting the early boundary.
    #[must_use]
    pub fn early_points(mut self, points: Points) -> Self {
        self.early_points = Some(points);
        self
    }

    /// Sets the on-time date.
    #[must_use]
    pub fn on_time_date(mut self, date: DateTime<Utc>) -> Self {
        self.on_time_date = Some(date);
        self
    }

    /// Sets the late cutoff.
    #[must_use]
    pub fn late_date(mut self, date: DateTime<Utc>) -> Self {
        self.late_date = Some(date);
        self
    }

    /// Sets the late penalty.
    #[must_use]
    pub fn late_points(mut self, points: Points) -> Self {
        self.late_points = Some(points);
        self
    }

    /// Sets the late unit length.
    #[must_use]
    pub fn late_period(mut self, period: LatePeriod) -> Self {
        self.late_period = Some(period);
        self
    }

    /// Validates and builds the policy.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if no kind was set, a required field is
    /// missing, or a field the kind does not use was supplied.
    pub fn build(self) -> Result<PolicyDefinition, ConfigurationError> {
        let kind = self.kind.ok_or(ConfigurationError::UnspecifiedKind)?;

        match kind {
            PolicyKind::None => {
                let present = [
                    ("early_date", self.early_date.is_some()),
                    ("early_points", self.early_points.is_some()),
                    ("on_time_date", self.on_time_date.is_some()),
                    ("late_date", self.late_date.is_some()),
                    ("late_points", self.late_points.is_some()),
                    ("late_period", self.late_period.is_some()),
                ];
                if let Some((field, _)) = present.iter().find(|(_, set)| *set) {
                    return Err(extraneous(kind, *field));
                }
                Ok(PolicyDefinition::none())
            }
            PolicyKind::Fixed => {
                if self.late_period.is_some() {
                    return Err(extraneous(kind, "late_period"));
                }
                let on_time = self.on_time_date.ok_or_else(|| missing(kind, "on_time_date"))?;
                PolicyDefinition::fixed(
                    self.early_date,
                    self.early_points,
                    on_time,
                    self.late_date,
                    self.late_points,
                )
            }
            PolicyKind::Variable => {
                if self.early_date.is_some() {
                    return Err(extraneous(kind, "early_date"));
                }
                if self.early_points.is_some() {
                    return Err(extraneous(kind, "early_points"));
                }
                let on_time = self.on_time_date.ok_or_else(|| missing(kind, "on_time_date"))?;
                PolicyDefinition::variable(on_time, self.late_date, self.late_points, self.late_period)
            }
        }
    }
}

/// Flat, unvalidated form of a policy, as stored by callers.
///
/// Converting into a `PolicyDefinition` runs the same validation as the
/// named constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub kind: PolicyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_points: Option<Points>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_time_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_points: Option<Points>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub late_period: Option<LatePeriod>,
}

impl TryFrom<PolicyRecord> for PolicyDefinition {
    type Error = ConfigurationError;

    fn try_from(record: PolicyRecord) -> Result<Self, Self::Error> {
        PolicyBuilder {
            kind: Some(record.kind),
            early_date: record.early_date,
            early_points: record.early_points,
            on_time_date: record.on_time_date,
            late_date: record.late_date,
            late_points: record.late_points,
            late_period: record.late_period,
        }
        .build()
    }
}

impl From<PolicyDefinition> for PolicyRecord {
    fn from(policy: PolicyDefinition) -> Self {
        Self {
            kind: policy.kind(),
            early_date: policy.early_date(),
            early_points: policy.early_points(),
            on_time_date: policy.on_time_date(),
            late_date: policy.late_date(),
            late_points: policy.late_points(),
            late_period: policy.late_period(),
        }
    }
}
