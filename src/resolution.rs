//! Resolution values produced by the engine.
//!
//! A `Resolution` classifies a submission's timeliness and carries the point
//! effect that classification implies. NC late submissions forfeit the whole
//! earned score, which the engine cannot know, so their effect is deferred
//! until the caller supplies the unadjusted total.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::points::Points;

/// Timeliness classification of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStatus {
    /// Submitted no later than the early date.
    Early,

    /// Submitted no later than the on-time date.
    OnTime,

    /// Submitted after the on-time date but within the late allowance.
    Late,

    /// Non-compliant late: the earned score is forfeited.
    NcLate,

    /// No submission exists yet.
    Unknown,
}

impl TimeStatus {
    /// Returns true for `Late` and `NcLate`.
    #[must_use]
    pub const fn is_late(self) -> bool {
        matches!(self, Self::Late | Self::NcLate)
    }

    /// Short label suitable for logs and grade sheets.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Early => "early",
            Self::OnTime => "on_time",
            Self::Late => "late",
            Self::NcLate => "nc_late",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Point effect of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "points", rename_all = "snake_case")]
pub enum PointEffect {
    /// A fixed adjustment.
    Points(Points),

    /// Equal to minus the unadjusted total earned, once known.
    DependsOnEarned,
}

/// Outcome of resolving one submission against a deadline policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    status: TimeStatus,
    raw_effect: PointEffect,
}

impl Resolution {
    pub(crate) const fn with_points(status: TimeStatus, points: Points) -> Self {
        Self {
            status,
            raw_effect: PointEffect::Points(points),
        }
    }

    pub(crate) const fn nc_late() -> Self {
        Self {
            status: TimeStatus::NcLate,
            raw_effect: PointEffect::DependsOnEarned,
        }
    }

    pub(crate) const fn unknown() -> Self {
        Self::with_points(TimeStatus::Unknown, Points::ZERO)
    }

    pub(crate) const fn on_time() -> Self {
        Self::with_points(TimeStatus::OnTime, Points::ZERO)
    }

    /// The timeliness classification.
    #[must_use]
    pub const fn status(&self) -> TimeStatus {
        self.status
    }

    /// The point effect before the earned total is known.
    #[must_use]
    pub const fn raw_effect(&self) -> PointEffect {
        self.raw_effect
    }

    /// The full adjustment to apply to the earned score.
    ///
    /// Deferred effects resolve to minus `total_earned`, or zero while the
    /// total is unknown.
    #[must_use]
    pub fn point_adjustment(&self, total_earned: Option<Points>) -> Points {
        match self.raw_effect {
            PointEffect::Points(points) => points,
            PointEffect::DependsOnEarned => total_earned.map_or(Points::ZERO, |total| -total),
        }
    }

    /// `total_earned` after this resolution's adjustment.
    #[must_use]
    pub fn adjusted_total(&self, total_earned: Points) -> Points {
        total_earned + self.point_adjustment(Some(total_earned))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw_effect {
            PointEffect::Points(points) => write!(f, "{} ({points})", self.status),
            PointEffect::DependsOnEarned => write!(f, "{} (forfeit earned)", self.status),
        }
    }
}
