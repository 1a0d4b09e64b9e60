//! Input/output helpers.
//!
//! - run discovery + tolerant JSON parsing (`runs`)
//! - DIF report CSV exports (`export`)
//! - calibration / norm-pack JSON read/write (`pack`)

pub mod export;
pub mod pack;
pub mod runs;

pub use export::*;
pub use pack::*;
pub use runs::*;
