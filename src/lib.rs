//! tubelens - Video platform analytics engine
//!
//! Turns raw, heterogeneous, time-stamped metric records for videos and
//! channels into ranked, comparable analytics: trend strength, growth
//! trajectory, competitor standing, and keyword signals. The engine does
//! not talk to the platform itself; the caller supplies already-fetched
//! records and receives a single report object.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Run configuration, validation, and file loading
//! - [`models`] - Raw and normalized record types, metrics, series
//! - [`analytics`] - Normalization, derived metrics, trend scoring,
//!   comparison, and keyword extraction
//! - [`engine`] - Orchestration, worker dispatch, and report assembly
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use tubelens::config::RunConfig;
//! use tubelens::models::RawItemRecord;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let batch: Vec<RawItemRecord> =
//!         serde_json::from_str(&std::fs::read_to_string("batch.json")?)?;
//!     let report = tubelens::engine::run_batch(batch, RunConfig::default()).await?;
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analytics::{
        CompareOutput, ComparisonResult, DerivedMetrics, DerivedOutput, KeywordOutput,
        KeywordStat, NormalizeStats, TrendOutput, TrendScore,
    };
    pub use crate::config::{AlignmentPolicy, RunConfig, Section};
    pub use crate::engine::{Engine, Report, SectionOutcome, UnavailableReason};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{EntityKind, Metric, MetricSeries, NormalizedRecord, RawItemRecord};
}

// Direct re-exports for convenience
pub use engine::{Engine, Report};
pub use models::{EntityKind, Metric, RawItemRecord};
