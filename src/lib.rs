//! # gradetime - Deadline resolution for graded coursework
//!
//! gradetime decides how timely a submission to a gradable event was and what
//! that means for its score. A deadline policy is validated once when the
//! event is defined; each group's submission is then resolved against it,
//! optionally through a per-group extension.
//!
//! ## Core Concepts
//!
//! - **PolicyDefinition**: The validated deadline rules of one gradable event
//! - **Extension**: A per-group replacement on-time date, shifting or dropping the other boundaries
//! - **Resolution**: A `TimeStatus` and the point effect it implies
//! - **NC late**: Submitted past the last boundary; the earned score is forfeited
//!
//! ## Usage
//!
//! ```rust
//! use gradetime::{apply, resolve_nc_late_penalty, PolicyDefinition, Points, TimeStatus};
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let due = Utc.with_ymd_and_hms(2024, 2, 14, 17, 0, 0).unwrap();
//! let policy = PolicyDefinition::fixed(
//!     None,
//!     None,
//!     due,
//!     Some(due + Duration::days(2)),
//!     Some(Points::new(-10.0)),
//! )?;
//!
//! let resolution = apply(&policy, Some(due + Duration::days(3)), None);
//! assert_eq!(resolution.status(), TimeStatus::NcLate);
//!
//! // The forfeit is only known once scoring is done.
//! let penalty = resolve_nc_late_penalty(&resolution, Some(Points::new(37.5)));
//! assert_eq!(penalty, Points::new(-37.5));
//! # Ok::<(), gradetime::ConfigurationError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Values
pub mod error;
pub mod extension;
pub mod points;
pub mod policy;
pub mod resolution;
pub mod time;

// Resolution
pub mod engine;

// Re-export primary types at crate root for convenience
pub use engine::runtime::{
    GroupId, GroupResolution, GroupSubmission, ResolutionHandle, ResolverConfig, ResolverPool,
};
pub use engine::{apply, effective_deadlines, resolve_nc_late_penalty, EffectiveDeadlines};
pub use error::{ConfigurationError, ExecutionError, GradetimeError, GradetimeResult};
pub use extension::Extension;
pub use points::Points;
pub use policy::{PolicyBuilder, PolicyDefinition, PolicyKind, PolicyRecord};
pub use resolution::{PointEffect, Resolution, TimeStatus};
pub use time::LatePeriod;
