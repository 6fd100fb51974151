//! Report layer: markdown reports and chart artifacts.

pub mod charts;
pub mod report;

pub use insights_core as core;
