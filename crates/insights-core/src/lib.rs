//! Core types for the fitness-insights pipeline.
//!
//! Record models for every tracker export table, the shared error taxonomy,
//! CLI settings and small numeric helpers used by the data and analysis
//! layers.

pub mod error;
pub mod models;
pub mod settings;
pub mod stats;
