//! Competitor comparison over aligned snapshot pairs
//!
//! Two series are never subtracted point-for-point without alignment: each
//! comparison point pairs one snapshot from each side under the configured
//! policy (same UTC calendar day, or nearest within a tolerance), and any
//! time point one side cannot serve is excluded and counted rather than
//! interpolated. The exclusion count makes the comparison's fidelity
//! inspectable.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use crate::config::AlignmentPolicy;
use crate::models::{EntityKind, Metric, MetricSeries, NormalizedRecord};

/// Which side of a pair holds the higher value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Leader {
    Left,
    Right,
    Tie,
}

/// Delta for one metric at one aligned point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDelta {
    pub left: u64,
    pub right: u64,

    /// left − right; raw counts arrive as `i64` so this cannot overflow
    pub delta: i64,

    /// delta / right; `None` when the right value is zero
    pub relative: Option<f64>,

    pub leader: Leader,
}

/// One aligned time point with per-metric deltas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonPoint {
    /// Snapshot time used from the left series
    pub left_at: DateTime<Utc>,

    /// Snapshot time used from the right series
    pub right_at: DateTime<Utc>,

    /// Deltas for metrics known on both sides at this point
    pub metrics: BTreeMap<Metric, MetricDelta>,
}

/// Leader tally for one metric across the aligned window
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LeaderCount {
    pub left: u64,
    pub right: u64,
    pub ties: u64,
}

/// Aggregate view of one metric across all aligned points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSummary {
    pub points: usize,
    pub leaders: LeaderCount,
    pub mean_delta: Option<f64>,
    pub std_dev_delta: Option<f64>,
}

/// Views-per-subscriber efficiency rating, for channel comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EfficiencyRating {
    High,
    Medium,
    Low,
}

impl EfficiencyRating {
    fn from_ratio(ratio: f64) -> Self {
        if ratio > 10.0 {
            Self::High
        } else if ratio > 5.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Audience-efficiency figure for one channel at its latest snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEfficiency {
    pub id: String,
    pub views_per_subscriber: f64,
    pub rating: EfficiencyRating,
}

/// Comparison of one identifier pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub left: String,
    pub right: String,
    pub alignment: AlignmentPolicy,

    /// Aligned points in time order
    pub points: Vec<ComparisonPoint>,

    /// Time points one side could not serve under the policy
    pub excluded_points: u64,

    /// Per-metric leader counts and delta statistics
    pub per_metric: BTreeMap<Metric, MetricSummary>,

    /// Present when both sides are channels with usable latest counts
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub efficiency: Vec<ChannelEfficiency>,
}

/// Comparator output across every requested pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareOutput {
    pub comparisons: Vec<ComparisonResult>,

    /// Sum of excluded points across all pairs
    pub excluded_total: u64,
}

/// Compare every unordered pair of the given series.
///
/// Pairs are emitted in identifier order, left always the lexicographically
/// smaller id, so output is deterministic.
pub fn compare_all(
    series: &BTreeMap<String, MetricSeries>,
    policy: AlignmentPolicy,
) -> CompareOutput {
    let ids: Vec<&String> = series.keys().collect();
    let mut comparisons = Vec::new();
    let mut excluded_total = 0;

    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            let result = compare_pair(&series[ids[i]], &series[ids[j]], policy);
            excluded_total += result.excluded_points;
            comparisons.push(result);
        }
    }

    CompareOutput {
        comparisons,
        excluded_total,
    }
}

/// Compare one pair of series under the alignment policy.
pub fn compare_pair(
    left: &MetricSeries,
    right: &MetricSeries,
    policy: AlignmentPolicy,
) -> ComparisonResult {
    let (aligned, excluded_points) = match policy {
        AlignmentPolicy::CalendarDay => align_calendar_day(left, right),
        AlignmentPolicy::Nearest { tolerance_hours } => {
            align_nearest(left, right, Duration::hours(tolerance_hours))
        }
    };

    let points: Vec<ComparisonPoint> = aligned
        .into_iter()
        .map(|(l, r)| compare_point(l, r))
        .collect();

    tracing::debug!(
        left = %left.id,
        right = %right.id,
        points = points.len(),
        excluded = excluded_points,
        "aligned series pair"
    );

    ComparisonResult {
        left: left.id.clone(),
        right: right.id.clone(),
        alignment: policy,
        per_metric: summarize(&points),
        efficiency: channel_efficiency(left, right),
        points,
        excluded_points,
    }
}

/// Pair the latest snapshot of each UTC calendar day held by both sides.
/// Days held by only one side are excluded.
fn align_calendar_day<'a>(
    left: &'a MetricSeries,
    right: &'a MetricSeries,
) -> (Vec<(&'a NormalizedRecord, &'a NormalizedRecord)>, u64) {
    let left_days = by_day(left);
    let right_days = by_day(right);

    let mut days: Vec<NaiveDate> = left_days.keys().chain(right_days.keys()).copied().collect();
    days.sort_unstable();
    days.dedup();

    let mut aligned = Vec::new();
    let mut excluded = 0;
    for day in days {
        match (left_days.get(&day), right_days.get(&day)) {
            (Some(&l), Some(&r)) => aligned.push((l, r)),
            _ => excluded += 1,
        }
    }
    (aligned, excluded)
}

fn by_day(series: &MetricSeries) -> BTreeMap<NaiveDate, &NormalizedRecord> {
    let mut days = BTreeMap::new();
    for record in series.records() {
        // Records are time-ordered, so the last insert per day is the latest
        days.insert(record.snapshot_at.date_naive(), record);
    }
    days
}

/// Pair each left snapshot with the nearest unused right snapshot within
/// the tolerance. Unmatched snapshots on either side are excluded.
fn align_nearest<'a>(
    left: &'a MetricSeries,
    right: &'a MetricSeries,
    tolerance: Duration,
) -> (Vec<(&'a NormalizedRecord, &'a NormalizedRecord)>, u64) {
    let right_records = right.records();
    let mut used = vec![false; right_records.len()];
    let mut aligned = Vec::new();
    let mut excluded = 0;

    for l in left.records() {
        let nearest = right_records
            .iter()
            .enumerate()
            .filter(|(idx, r)| {
                !used[*idx] && (r.snapshot_at - l.snapshot_at).abs() <= tolerance
            })
            .min_by_key(|(_, r)| (r.snapshot_at - l.snapshot_at).abs());

        match nearest {
            Some((idx, r)) => {
                used[idx] = true;
                aligned.push((l, r));
            }
            None => excluded += 1,
        }
    }
    excluded += used.iter().filter(|u| !**u).count() as u64;

    (aligned, excluded)
}

fn compare_point(left: &NormalizedRecord, right: &NormalizedRecord) -> ComparisonPoint {
    let mut metrics = BTreeMap::new();
    for metric in Metric::all() {
        if let (Some(l), Some(r)) = (left.metric(metric), right.metric(metric)) {
            let delta = l as i64 - r as i64;
            let leader = match delta {
                d if d > 0 => Leader::Left,
                d if d < 0 => Leader::Right,
                _ => Leader::Tie,
            };
            metrics.insert(
                metric,
                MetricDelta {
                    left: l,
                    right: r,
                    delta,
                    relative: (r != 0).then(|| delta as f64 / r as f64),
                    leader,
                },
            );
        }
    }

    ComparisonPoint {
        left_at: left.snapshot_at,
        right_at: right.snapshot_at,
        metrics,
    }
}

fn summarize(points: &[ComparisonPoint]) -> BTreeMap<Metric, MetricSummary> {
    let mut summaries = BTreeMap::new();

    for metric in Metric::all() {
        let deltas: Vec<f64> = points
            .iter()
            .filter_map(|p| p.metrics.get(&metric))
            .map(|d| d.delta as f64)
            .collect();
        if deltas.is_empty() {
            continue;
        }

        let mut leaders = LeaderCount::default();
        for point in points {
            if let Some(delta) = point.metrics.get(&metric) {
                match delta.leader {
                    Leader::Left => leaders.left += 1,
                    Leader::Right => leaders.right += 1,
                    Leader::Tie => leaders.ties += 1,
                }
            }
        }

        summaries.insert(
            metric,
            MetricSummary {
                points: deltas.len(),
                leaders,
                mean_delta: Some(deltas.iter().mean()),
                std_dev_delta: (deltas.len() >= 2).then(|| deltas.iter().std_dev()),
            },
        );
    }

    summaries
}

/// Views-per-subscriber efficiency at the latest snapshot, channels only.
/// Guarded: absent when either count is unknown or subscribers are zero.
fn channel_efficiency(left: &MetricSeries, right: &MetricSeries) -> Vec<ChannelEfficiency> {
    [left, right]
        .iter()
        .filter(|s| s.kind == EntityKind::Channel)
        .filter_map(|s| {
            let views = s.latest_metric(Metric::Views)?;
            let subscribers = s.latest_metric(Metric::Subscribers)?;
            if subscribers == 0 {
                return None;
            }
            let ratio = views as f64 / subscribers as f64;
            Some(ChannelEfficiency {
                id: s.id.clone(),
                views_per_subscriber: ratio,
                rating: EfficiencyRating::from_ratio(ratio),
            })
        })
        .collect()
}
