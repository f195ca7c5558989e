//! Derived metrics from consecutive snapshot pairs
//!
//! For each consecutive pair in a [`MetricSeries`] this module computes:
//! - Engagement rate from the later snapshot's raw counts
//! - Signed per-day growth rate per metric
//! - Velocity, the change in growth rate between adjacent windows
//!
//! A series of length < 2 yields an empty output, not an error. Growth is
//! only computed for metrics known at both endpoints; absence is never
//! coerced to zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Metric, MetricSeries, NormalizedRecord};

const SECS_PER_DAY: i64 = 86_400;

/// Derived values for one consecutive snapshot pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub id: String,

    /// Earlier snapshot of the pair
    pub window_start: DateTime<Utc>,

    /// Later snapshot of the pair
    pub window_end: DateTime<Utc>,

    /// Whole elapsed days, clamped to a minimum of 1
    pub elapsed_days: i64,

    /// (likes + comments) / views at the window's end; `None` when views
    /// are zero or any input count is unknown
    pub engagement_rate: Option<f64>,

    /// Signed change per elapsed day, per metric known at both endpoints
    pub growth: BTreeMap<Metric, f64>,

    /// Change in growth rate per day versus the previous window
    pub velocity: BTreeMap<Metric, f64>,
}

/// Derived windows for one identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedOutput {
    pub id: String,

    /// One entry per usable consecutive pair, in time order
    pub windows: Vec<DerivedMetrics>,

    /// Pairs skipped for non-positive elapsed time
    pub degenerate: u64,
}

impl DerivedOutput {
    /// Number of usable windows
    pub fn observations(&self) -> usize {
        self.windows.len()
    }
}

/// Compute derived metrics for every consecutive snapshot pair.
pub fn derive_series(series: &MetricSeries) -> DerivedOutput {
    derive_series_with_prior(series, None)
}

/// Compute derived metrics, optionally seeding with a prior snapshot.
///
/// The prior record, when given, acts as the snapshot preceding the series'
/// first record, letting a caller carry growth across batches without the
/// engine holding state between runs. It must belong to the same identifier.
pub fn derive_series_with_prior(
    series: &MetricSeries,
    prior: Option<&NormalizedRecord>,
) -> DerivedOutput {
    let mut output = DerivedOutput {
        id: series.id.clone(),
        windows: Vec::new(),
        degenerate: 0,
    };

    let chain: Vec<&NormalizedRecord> = prior
        .into_iter()
        .chain(series.records().iter())
        .collect();
    if chain.len() < 2 {
        return output;
    }

    let mut prev_growth: Option<BTreeMap<Metric, f64>> = None;

    for pair in chain.windows(2) {
        let (start, end) = (pair[0], pair[1]);

        let elapsed_secs = (end.snapshot_at - start.snapshot_at).num_seconds();
        if elapsed_secs <= 0 {
            tracing::debug!(
                id = %series.id,
                start = %start.snapshot_at,
                end = %end.snapshot_at,
                "skipping degenerate snapshot pair"
            );
            output.degenerate += 1;
            continue;
        }
        let elapsed_days = (elapsed_secs / SECS_PER_DAY).max(1);

        let mut growth = BTreeMap::new();
        for metric in Metric::all() {
            if let (Some(before), Some(after)) = (start.metric(metric), end.metric(metric)) {
                let delta = after as f64 - before as f64;
                growth.insert(metric, delta / elapsed_days as f64);
            }
        }

        let mut velocity = BTreeMap::new();
        if let Some(prev) = &prev_growth {
            for (&metric, &rate) in &growth {
                if let Some(&prev_rate) = prev.get(&metric) {
                    velocity.insert(metric, (rate - prev_rate) / elapsed_days as f64);
                }
            }
        }
        prev_growth = Some(growth.clone());

        output.windows.push(DerivedMetrics {
            id: series.id.clone(),
            window_start: start.snapshot_at,
            window_end: end.snapshot_at,
            elapsed_days,
            engagement_rate: engagement_rate(end),
            growth,
            velocity,
        });
    }

    output
}

/// Engagement rate for a single snapshot: (likes + comments) / views.
///
/// Undefined (`None`) when views are zero or any of the three counts is
/// unknown; zero counts are valid inputs and produce a defined rate.
pub fn engagement_rate(record: &NormalizedRecord) -> Option<f64> {
    let views = record.metric(Metric::Views)?;
    if views == 0 {
        return None;
    }
    let likes = record.metric(Metric::Likes)?;
    let comments = record.metric(Metric::Comments)?;
    Some((likes + comments) as f64 / views as f64)
}
