//! Deadline resolution.
//!
//! `apply` is a pure function of a policy, an optional occurrence instant and
//! an optional extension. Every comparison is inclusive on the earlier side:
//! an occurrence exactly at a boundary meets that boundary.

/// Thread-based pool resolving a roster of groups in parallel.
pub mod runtime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extension::Extension;
use crate::points::Points;
use crate::policy::{DeadlineRules, LatePenalty, PolicyDefinition};
use crate::resolution::{Resolution, TimeStatus};
use crate::time::shift_instant;

/// The boundaries in force for one resolution, after any extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveDeadlines {
    /// Early boundary, if one is still in force.
    pub early_date: Option<DateTime<Utc>>,
    /// On-time date; `None` only for a policy without a deadline.
    pub on_time_date: Option<DateTime<Utc>>,
    /// Late cutoff, if one is still in force.
    pub late_date: Option<DateTime<Utc>>,
}

/// Computes the boundaries that apply once `extension` is taken into account.
///
/// A policy without a deadline has no boundaries, extension or not.
#[must_use]
pub fn effective_deadlines(
    policy: &PolicyDefinition,
    extension: Option<&Extension>,
) -> EffectiveDeadlines {
    let Some(on_time) = policy.on_time_date() else {
        return EffectiveDeadlines {
            early_date: None,
            on_time_date: None,
            late_date: None,
        };
    };
    let dates = Dates::new(on_time, policy.early_date(), policy.late_date(), extension);
    EffectiveDeadlines {
        early_date: dates.early,
        on_time_date: Some(dates.on_time),
        late_date: dates.late,
    }
}

struct Dates {
    early: Option<DateTime<Utc>>,
    on_time: DateTime<Utc>,
    late: Option<DateTime<Utc>>,
}

impl Dates {
    fn new(
        on_time: DateTime<Utc>,
        early: Option<DateTime<Utc>>,
        late: Option<DateTime<Utc>>,
        extension: Option<&Extension>,
    ) -> Self {
        match extension {
            None => Self {
                early,
                on_time,
                late,
            },
            Some(ext) if ext.shift_dates => {
                let delta = ext.new_on_time.signed_duration_since(on_time);
                Self {
                    early: early.map(|d| shift_instant(d, delta)),
                    on_time: ext.new_on_time,
                    late: late.map(|d| shift_instant(d, delta)),
                }
            }
            Some(ext) => Self {
                early: None,
                on_time: ext.new_on_time,
                late: None,
            },
        }
    }
}

/// Resolves one submission against a deadline policy.
///
/// - No occurrence: `Unknown`, no points.
/// - No deadline: `OnTime`, no points.
/// - Fixed: `Early` / `OnTime` / `Late` with the policy's points, `NcLate`
///   past the last boundary.
/// - Variable: `OnTime`, or `Late` with one penalty per started late period,
///   `NcLate` past the late date or when no penalty is configured.
///
/// # Examples
///
/// ```
/// use gradetime::{apply, LatePeriod, PolicyDefinition, Points, TimeStatus};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let due = Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 0).unwrap();
/// let policy = PolicyDefinition::variable(
///     due,
///     None,
///     Some(Points::new(-2.0)),
///     LatePeriod::minutes(5),
/// )
/// .unwrap();
///
/// let resolution = apply(&policy, Some(due + Duration::seconds(301)), None);
/// assert_eq!(resolution.status(), TimeStatus::Late);
/// assert_eq!(resolution.point_adjustment(None), Points::new(-4.0));
/// ```
#[must_use]
pub fn apply(
    policy: &PolicyDefinition,
    occurrence: Option<DateTime<Utc>>,
    extension: Option<&Extension>,
) -> Resolution {
    let Some(occurrence) = occurrence else {
        return Resolution::unknown();
    };

    let resolution = match *policy.rules() {
        DeadlineRules::None => Resolution::on_time(),
        DeadlineRules::Fixed {
            early,
            on_time,
            late,
        } => {
            let dates = Dates::new(
                on_time,
                early.map(|b| b.date),
                late.map(|b| b.date),
                extension,
            );
            resolve_fixed(
                occurrence,
                &dates,
                early.map(|b| b.points),
                late.map(|b| b.points),
            )
        }
        DeadlineRules::Variable {
            on_time,
            late_date,
            penalty,
        } => {
            let dates = Dates::new(on_time, None, late_date, extension);
            resolve_variable(occurrence, &dates, penalty)
        }
    };

    tracing::trace!(
        kind = %policy.kind(),
        %occurrence,
        extended = extension.is_some(),
        status = %resolution.status(),
        "resolved deadline"
    );
    resolution
}

fn resolve_fixed(
    occurrence: DateTime<Utc>,
    dates: &Dates,
    early_points: Option<Points>,
    late_points: Option<Points>,
) -> Resolution {
    // Dates only carries an early/late date when the policy paired it with
    // points, so the zip below never discards a boundary.
    if let Some(early) = dates.early.zip(early_points) {
        if occurrence <= early.0 {
            return Resolution::with_points(TimeStatus::Early, early.1);
        }
    }

    if occurrence <= dates.on_time {
        return Resolution::on_time();
    }

    match dates.late.zip(late_points) {
        Some((late, points)) if occurrence <= late => {
            Resolution::with_points(TimeStatus::Late, points)
        }
        _ => Resolution::nc_late(),
    }
}

fn resolve_variable(
    occurrence: DateTime<Utc>,
    dates: &Dates,
    penalty: Option<LatePenalty>,
) -> Resolution {
    if occurrence <= dates.on_time {
        return Resolution::on_time();
    }

    let Some(penalty) = penalty else {
        return Resolution::nc_late();
    };

    if dates.late.is_some_and(|late| occurrence > late) {
        return Resolution::nc_late();
    }

    let amount_late = occurrence.signed_duration_since(dates.on_time);
    let units = penalty.period.units_covering(amount_late);
    Resolution::with_points(TimeStatus::Late, penalty.points.scaled(units))
}

/// The NC late penalty of a resolution.
///
/// For an `NcLate` resolution this is minus the unadjusted total earned, or
/// zero if the total is not yet known. Every other status carries no NC late
/// penalty and yields zero; use [`Resolution::point_adjustment`] for the
/// combined adjustment.
#[must_use]
pub fn resolve_nc_late_penalty(
    resolution: &Resolution,
    unadjusted_total_earned: Option<Points>,
) -> Points {
    if resolution.status() != TimeStatus::NcLate {
        return Points::ZERO;
    }
    resolution.point_adjustment(unadjusted_total_earned)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::resolution::PointEffect;
    use crate::time::LatePeriod;

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 14, 17, 0, 0).unwrap()
    }

    fn fixed_full() -> PolicyDefinition {
        PolicyDefinition::fixed(
            Some(due() - Duration::days(2)),
            Some(Points::new(5.0)),
            due(),
            Some(due() + Duration::days(2)),
            Some(Points::new(-10.0)),
        )
        .unwrap()
    }

    fn variable_five_minutes(late_date: Option<DateTime<Utc>>) -> PolicyDefinition {
        PolicyDefinition::variable(
            due(),
            late_date,
            Some(Points::new(-2.0)),
            LatePeriod::minutes(5),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_occurrence_is_unknown() {
        let resolution = apply(&fixed_full(), None, None);
        assert_eq!(resolution.status(), TimeStatus::Unknown);
        assert_eq!(resolution.raw_effect(), PointEffect::Points(Points::ZERO));

        let resolution = apply(&PolicyDefinition::none(), None, None);
        assert_eq!(resolution.status(), TimeStatus::Unknown);
    }

    #[test]
    fn test_none_policy_is_always_on_time() {
        let policy = PolicyDefinition::none();
        for at in [
            DateTime::<Utc>::MIN_UTC,
            due(),
            DateTime::<Utc>::MAX_UTC,
        ] {
            let resolution = apply(&policy, Some(at), Some(&Extension::shifted(due())));
            assert_eq!(resolution.status(), TimeStatus::OnTime);
            assert_eq!(resolution.point_adjustment(None), Points::ZERO);
        }
    }

    #[test]
    fn test_fixed_boundaries_are_inclusive() {
        let policy = fixed_full();
        let early = policy.early_date().unwrap();
        let late = policy.late_date().unwrap();

        let r = apply(&policy, Some(early), None);
        assert_eq!(r.status(), TimeStatus::Early);
        assert_eq!(r.raw_effect(), PointEffect::Points(Points::new(5.0)));

        let r = apply(&policy, Some(early + Duration::nanoseconds(1)), None);
        assert_eq!(r.status(), TimeStatus::OnTime);

        let r = apply(&policy, Some(due()), None);
        assert_eq!(r.status(), TimeStatus::OnTime);
        assert_eq!(r.raw_effect(), PointEffect::Points(Points::ZERO));

        let r = apply(&policy, Some(late), None);
        assert_eq!(r.status(), TimeStatus::Late);
        assert_eq!(r.raw_effect(), PointEffect::Points(Points::new(-10.0)));

        let r = apply(&policy, Some(late + Duration::nanoseconds(1)), None);
        assert_eq!(r.status(), TimeStatus::NcLate);
        assert_eq!(r.raw_effect(), PointEffect::DependsOnEarned);
    }

    #[test]
    fn test_fixed_without_late_date_is_nc_late_after_due() {
        let policy = PolicyDefinition::fixed(None, None, due(), None, None).unwrap();
        assert_eq!(
            apply(&policy, Some(due() - Duration::days(30)), None).status(),
            TimeStatus::OnTime
        );
        assert_eq!(
            apply(&policy, Some(due() + Duration::seconds(1)), None).status(),
            TimeStatus::NcLate
        );
    }

    #[test]
    fn test_variable_on_time_ignores_period() {
        let with_penalty = variable_five_minutes(None);
        let without_penalty = PolicyDefinition::variable(due(), None, None, None).unwrap();
        for policy in [with_penalty, without_penalty] {
            let r = apply(&policy, Some(due()), None);
            assert_eq!(r.status(), TimeStatus::OnTime);
            assert_eq!(r.point_adjustment(None), Points::ZERO);
        }
    }

    #[test]
    fn test_variable_unit_rounding() {
        let policy = variable_five_minutes(None);
        let cases = [
            (Duration::seconds(1), -2.0),
            (Duration::minutes(5), -2.0),
            (Duration::minutes(5) + Duration::seconds(1), -4.0),
            (Duration::hours(1), -24.0),
        ];
        for (late_by, expected) in cases {
            let r = apply(&policy, Some(due() + late_by), None);
            assert_eq!(r.status(), TimeStatus::Late);
            assert_eq!(r.raw_effect(), PointEffect::Points(Points::new(expected)));
        }
    }

    #[test]
    fn test_variable_without_penalty_is_nc_late() {
        let policy = PolicyDefinition::variable(due(), None, None, None).unwrap();
        let r = apply(&policy, Some(due() + Duration::seconds(1)), None);
        assert_eq!(r.status(), TimeStatus::NcLate);
    }

    #[test]
    fn test_variable_late_date_cuts_off() {
        let late = due() + Duration::hours(1);
        let policy = variable_five_minutes(Some(late));

        let r = apply(&policy, Some(late), None);
        assert_eq!(r.status(), TimeStatus::Late);
        assert_eq!(r.point_adjustment(None), Points::new(-24.0));

        let r = apply(&policy, Some(late + Duration::seconds(1)), None);
        assert_eq!(r.status(), TimeStatus::NcLate);
    }

    #[test]
    fn test_shifted_extension_moves_every_boundary() {
        let policy = fixed_full();
        let ext = Extension::shifted(due() + Duration::days(2));
        let dates = effective_deadlines(&policy, Some(&ext));

        assert_eq!(dates.early_date, Some(policy.early_date().unwrap() + Duration::days(2)));
        assert_eq!(dates.on_time_date, Some(due() + Duration::days(2)));
        assert_eq!(dates.late_date, Some(policy.late_date().unwrap() + Duration::days(2)));
    }

    #[test]
    fn test_shifted_extension_matches_unshifted_resolution() {
        let policy = fixed_full();
        let ext = Extension::shifted(due() + Duration::days(2));
        let offsets = [
            Duration::days(-3),
            Duration::days(-2),
            Duration::hours(-1),
            Duration::zero(),
            Duration::days(1),
            Duration::days(2),
            Duration::days(2) + Duration::seconds(1),
        ];
        for offset in offsets {
            let at = due() + Duration::days(2) + offset;
            let extended = apply(&policy, Some(at), Some(&ext));
            let original = apply(&policy, Some(at - Duration::days(2)), None);
            assert_eq!(extended, original, "offset {offset}");
        }
    }

    #[test]
    fn test_unshifted_extension_drops_early_and_late() {
        let policy = fixed_full();
        let new_on_time = due() + Duration::days(3);
        let ext = Extension::new(new_on_time);

        let dates = effective_deadlines(&policy, Some(&ext));
        assert_eq!(dates.early_date, None);
        assert_eq!(dates.on_time_date, Some(new_on_time));
        assert_eq!(dates.late_date, None);

        let early_before = apply(&policy, Some(policy.early_date().unwrap()), Some(&ext));
        assert_eq!(early_before.status(), TimeStatus::OnTime);

        let between = apply(&policy, Some(due() + Duration::days(1)), Some(&ext));
        assert_eq!(between.status(), TimeStatus::OnTime);

        let after = apply(&policy, Some(new_on_time + Duration::seconds(1)), Some(&ext));
        assert_eq!(after.status(), TimeStatus::NcLate);
    }

    #[test]
    fn test_unshifted_extension_keeps_variable_penalty() {
        let policy = variable_five_minutes(Some(due() + Duration::hours(1)));
        let new_on_time = due() + Duration::days(1);
        let ext = Extension::new(new_on_time);

        let r = apply(&policy, Some(new_on_time + Duration::hours(3)), Some(&ext));
        assert_eq!(r.status(), TimeStatus::Late);
        assert_eq!(r.point_adjustment(None), Points::new(-72.0));
    }

    #[test]
    fn test_shifted_extension_moves_variable_late_date() {
        let policy = variable_five_minutes(Some(due() + Duration::hours(1)));
        let new_on_time = due() + Duration::days(1);
        let ext = Extension::shifted(new_on_time);
        let shifted_late = new_on_time + Duration::hours(1);

        let dates = effective_deadlines(&policy, Some(&ext));
        assert_eq!(dates.on_time_date, Some(new_on_time));
        assert_eq!(dates.late_date, Some(shifted_late));

        let past_original_cutoff = apply(&policy, Some(due() + Duration::hours(2)), Some(&ext));
        assert_eq!(past_original_cutoff.status(), TimeStatus::OnTime);

        let at_cutoff = apply(&policy, Some(shifted_late), Some(&ext));
        assert_eq!(at_cutoff.status(), TimeStatus::Late);
        assert_eq!(at_cutoff.point_adjustment(None), Points::new(-24.0));

        let after_cutoff = apply(&policy, Some(shifted_late + Duration::seconds(1)), Some(&ext));
        assert_eq!(after_cutoff.status(), TimeStatus::NcLate);
        assert_eq!(
            after_cutoff.point_adjustment(Some(Points::new(40.0))),
            Points::new(-40.0)
        );
    }

    #[test]
    fn test_effective_deadlines_for_none_policy() {
        let dates = effective_deadlines(&PolicyDefinition::none(), Some(&Extension::new(due())));
        assert_eq!(dates.on_time_date, None);
        assert_eq!(dates.early_date, None);
        assert_eq!(dates.late_date, None);
    }

    #[test]
    fn test_nc_late_penalty() {
        let policy = fixed_full();
        let nc = apply(&policy, Some(due() + Duration::days(10)), None);
        assert_eq!(nc.status(), TimeStatus::NcLate);
        assert_eq!(
            resolve_nc_late_penalty(&nc, Some(Points::new(37.5))),
            Points::new(-37.5)
        );
        assert_eq!(resolve_nc_late_penalty(&nc, None), Points::ZERO);

        let late = apply(&policy, Some(due() + Duration::days(1)), None);
        assert_eq!(
            resolve_nc_late_penalty(&late, Some(Points::new(37.5))),
            Points::ZERO
        );
    }
}
