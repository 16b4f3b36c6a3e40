//! Source checkout inspection.

pub mod git;
