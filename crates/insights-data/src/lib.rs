//! Data preparation layer for fitness-insights.
//!
//! Responsible for loading the seven tracker export CSVs, cleaning each
//! table, joining daily activity with sleep, and evaluating the post-clean
//! validation checks consumed by the report layer.

pub mod cleaner;
pub mod joiner;
pub mod pipeline;
pub mod reader;
pub mod validator;

pub use insights_core as core;
