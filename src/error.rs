//! Error types for gradetime.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! specific conditions. Deadline configuration problems surface at
//! construction time; resolution itself never fails.

use chrono::Duration;
use thiserror::Error;

use crate::policy::PolicyKind;

/// A deadline policy whose fields violate the cross-field rules of its kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A field the kind requires was not given.
    #[error("{kind} policy requires '{field}'")]
    MissingField {
        kind: PolicyKind,
        field: &'static str,
    },

    /// A field the kind never uses was given.
    #[error("{kind} policy does not accept '{field}'")]
    ExtraneousField {
        kind: PolicyKind,
        field: &'static str,
    },

    /// A points value is NaN or infinite.
    #[error("{kind} policy requires finite '{field}'")]
    NonFinitePoints {
        kind: PolicyKind,
        field: &'static str,
    },

    #[error("Late period must be positive, got {period}")]
    NonPositiveLatePeriod {
        period: Duration,
    },

    /// The period does not fit in a signed 64-bit nanosecond count.
    #[error("Late period {period} exceeds the nanosecond range")]
    LatePeriodOutOfRange {
        period: Duration,
    },

    #[error("Policy kind must be specified")]
    UnspecifiedKind,
}

impl ConfigurationError {
    /// Returns the offending field name, if the error concerns a single field.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field, .. }
            | Self::ExtraneousField { field, .. }
            | Self::NonFinitePoints { field, .. } => Some(*field),
            Self::NonPositiveLatePeriod { .. } | Self::LatePeriodOutOfRange { .. } => {
                Some("late_period")
            }
            Self::UnspecifiedKind => None,
        }
    }
}

/// Errors raised by the batch resolver pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The bounded job queue had no free slot.
    #[error("Resolver queue is full (capacity {capacity})")]
    QueueFull {
        capacity: usize,
    },

    /// The workers have shut down.
    #[error("Resolver pool disconnected")]
    Disconnected,

    #[error("Resolution timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },
}

/// Top-level error type for gradetime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradetimeError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

impl GradetimeError {
    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Configuration(_) => false,
            Self::Execution(e) => matches!(
                e,
                ExecutionError::QueueFull { .. } | ExecutionError::Timeout { .. }
            ),
        }
    }
}

/// Result type alias for gradetime operations.
pub type GradetimeResult<T> = Result<T, GradetimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_kind_and_field() {
        let err = ConfigurationError::MissingField {
            kind: PolicyKind::Fixed,
            field: "early_points",
        };
        let msg = format!("{err}");
        assert!(msg.contains("fixed"));
        assert!(msg.contains("early_points"));
        assert_eq!(err.field(), Some("early_points"));
    }

    #[test]
    fn test_extraneous_field_message() {
        let err = ConfigurationError::ExtraneousField {
            kind: PolicyKind::None,
            field: "on_time_date",
        };
        assert!(format!("{err}").contains("does not accept 'on_time_date'"));
    }

    #[test]
    fn test_non_positive_period_reports_late_period() {
        let err = ConfigurationError::NonPositiveLatePeriod {
            period: Duration::zero(),
        };
        assert_eq!(err.field(), Some("late_period"));
        assert_eq!(ConfigurationError::UnspecifiedKind.field(), None);
    }

    #[test]
    fn test_non_finite_points_names_field() {
        let err = ConfigurationError::NonFinitePoints {
            kind: PolicyKind::Variable,
            field: "late_points",
        };
        assert_eq!(format!("{err}"), "variable policy requires finite 'late_points'");
        assert_eq!(err.field(), Some("late_points"));
    }

    #[test]
    fn test_queue_full_is_retryable() {
        let err: GradetimeError = ExecutionError::QueueFull { capacity: 4 }.into();
        assert!(err.is_execution());
        assert!(err.is_retryable());
        assert!(format!("{err}").contains("capacity 4"));
    }

    #[test]
    fn test_configuration_error_not_retryable() {
        let err: GradetimeError = ConfigurationError::UnspecifiedKind.into();
        assert!(err.is_configuration());
        assert!(!err.is_retryable());

        let disconnected: GradetimeError = ExecutionError::Disconnected.into();
        assert!(!disconnected.is_retryable());
    }
}
