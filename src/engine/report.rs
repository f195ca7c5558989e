//! Report object assembled at the end of a run
//!
//! The report always has a defined shape: every requested section is either
//! populated or explicitly marked unavailable with a reason code, so a
//! consumer never has to infer whether an empty list means "no data" or
//! "something went wrong". Unrequested sections are absent entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::compare::CompareOutput;
use crate::analytics::keywords::KeywordOutput;
use crate::analytics::trend::TrendOutput;

/// Why a requested section could not be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// No identifier had enough observations to evaluate
    InsufficientData,

    /// No token survived tokenization and filtering
    EmptyTextBatch,

    /// Comparison requires at least two identifiers
    NotEnoughSeries,
}

impl UnavailableReason {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient_data",
            Self::EmptyTextBatch => "empty_text_batch",
            Self::NotEnoughSeries => "not_enough_series",
        }
    }
}

/// A section's result: its data, or the reason it is missing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SectionOutcome<T> {
    Available { data: T },
    Unavailable { reason: UnavailableReason },
}

impl<T> SectionOutcome<T> {
    /// The section's data, when it was produced
    pub fn available(&self) -> Option<&T> {
        match self {
            Self::Available { data } => Some(data),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

/// Per-run diagnostic counters aggregated across all components
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Raw records received
    pub records_total: u64,

    /// Records that survived normalization
    pub records_normalized: u64,

    /// Records dropped for timestamp defects
    pub skipped: u64,

    /// Duplicate snapshot timestamps resolved
    pub collisions: u64,

    /// Snapshot pairs skipped for non-positive elapsed time
    pub degenerate: u64,

    /// Comparison time points excluded by alignment
    pub excluded_points: u64,
}

/// The single artifact handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,

    /// Identifiers present after normalization
    pub identifiers: usize,

    pub diagnostics: Diagnostics,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<SectionOutcome<TrendOutput>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<SectionOutcome<CompareOutput>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<SectionOutcome<KeywordOutput>>,
}
