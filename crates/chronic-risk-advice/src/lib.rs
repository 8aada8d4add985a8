//! Lifestyle recommendations derived from chronic risk scores.
//!
//! Rules are threshold checks over the scores, gated in places by the
//! patient's own attributes (BMI, smoking).

pub mod recommendations;
pub mod report;

pub use recommendations::*;
pub use report::*;
