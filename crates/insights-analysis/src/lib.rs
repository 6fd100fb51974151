//! Analysis layer for fitness-insights.
//!
//! Consumes the cleaned and joined tables to compute grouped statistics,
//! a clustering-based user segmentation, and the fixed-shape insight record
//! consumed by the report layer.

pub mod aggregator;
pub mod insights;
pub mod segmenter;

pub use insights_core as core;
