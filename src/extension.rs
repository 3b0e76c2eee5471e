//! Per-group deadline extensions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Replacement on-time date granted to one group.
///
/// With `shift_dates` the policy's early and late dates move by the same
/// delta as the on-time date. Without it they are dropped and only the new
/// on-time date remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extension {
    /// The group's replacement on-time date.
    pub new_on_time: DateTime<Utc>,

    /// Whether the early and late dates follow the on-time date.
    #[serde(default)]
    pub shift_dates: bool,
}

impl Extension {
    /// An extension that only replaces the on-time date.
    #[must_use]
    pub const fn new(new_on_time: DateTime<Utc>) -> Self {
        Self {
            new_on_time,
            shift_dates: false,
        }
    }

    /// An extension that moves every boundary by the on-time delta.
    #[must_use]
    pub const fn shifted(new_on_time: DateTime<Utc>) -> Self {
        Self {
            new_on_time,
            shift_dates: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_shift_flag() {
        let at = Utc::now();
        assert!(!Extension::new(at).shift_dates);
        assert!(Extension::shifted(at).shift_dates);
    }

    #[test]
    fn test_shift_dates_defaults_to_false() {
        let ext: Extension =
            serde_json::from_str(r#"{"new_on_time":"2024-02-16T17:00:00Z"}"#).unwrap();
        assert!(!ext.shift_dates);
    }
}
