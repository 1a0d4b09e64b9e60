//! Item response theory calibration.
//!
//! Responsibilities:
//!
//! - fit 2PL `(a, b)` for a single item on fixed thetas (`fit_item`)
//! - gate the corpus and items on minimum sample sizes (`calibrate`)

pub mod calibrate;

pub use calibrate::*;
