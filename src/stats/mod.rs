//! Descriptive statistics and the score standardizer.

pub mod standardize;

pub use standardize::*;
