//! Run aggregation: from raw run logs to the per-item tuples each estimator
//! consumes.
//!
//! - `persons`: per-person domain scores and `(theta, outcome)` observations
//!   for 2PL calibration
//! - `groups`: grouping-attribute resolution and `(score, group, outcome)` rows
//!   for the DIF estimators

pub mod groups;
pub mod persons;

pub use groups::*;
pub use persons::*;
