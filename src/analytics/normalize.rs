//! Metric normalization for raw platform records
//!
//! This module turns heterogeneous platform records into per-identifier
//! [`MetricSeries`]:
//! - Groups records by identifier and orders them by snapshot time
//! - Drops records with missing or unparseable timestamps, counting them
//! - Resolves duplicate snapshot timestamps (later-arriving record wins)
//! - Treats out-of-domain counts (negative) as absent, never clamped
//!
//! Defective input never fails a run; every drop shows up in the stats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{EntityKind, Metric, MetricSeries, NormalizedRecord, RawItemRecord};

/// Counters describing one normalization pass
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NormalizeStats {
    /// Raw records received
    pub total: u64,

    /// Records present in the output series
    pub normalized: u64,

    /// Records dropped for timestamp defects
    pub skipped: u64,

    /// Records replaced by a later-arriving duplicate timestamp
    pub collisions: u64,
}

impl NormalizeStats {
    /// Fraction of input records dropped, as a percentage
    pub fn skip_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.skipped as f64 / self.total as f64) * 100.0
        }
    }
}

/// Result of normalizing one batch
#[derive(Debug, Clone)]
pub struct NormalizeOutput {
    /// Identifier to time-ordered series
    pub series: BTreeMap<String, MetricSeries>,

    /// Drop and collision counters
    pub stats: NormalizeStats,
}

/// Normalize a batch of raw records into per-identifier series.
///
/// Records whose snapshot or published timestamp is missing or unparseable
/// are dropped, as are records violating `snapshot_at >= published_at`.
/// Nothing is ever given a fabricated timestamp.
pub fn normalize(records: Vec<RawItemRecord>) -> NormalizeOutput {
    let mut stats = NormalizeStats {
        total: records.len() as u64,
        ..Default::default()
    };

    // Per identifier: entity kind at first sight, then snapshots keyed by
    // timestamp so a duplicate naturally replaces its predecessor.
    let mut grouped: BTreeMap<String, (EntityKind, BTreeMap<DateTime<Utc>, NormalizedRecord>)> =
        BTreeMap::new();

    for raw in records {
        let Some(snapshot_at) = parse_timestamp(raw.snapshot_at.as_deref()) else {
            tracing::debug!(id = %raw.id, "dropping record with bad snapshot timestamp");
            stats.skipped += 1;
            continue;
        };
        let Some(published_at) = parse_timestamp(raw.published_at.as_deref()) else {
            tracing::debug!(id = %raw.id, "dropping record with bad published timestamp");
            stats.skipped += 1;
            continue;
        };
        if snapshot_at < published_at {
            tracing::debug!(
                id = %raw.id,
                %snapshot_at,
                %published_at,
                "dropping record observed before publication"
            );
            stats.skipped += 1;
            continue;
        }

        let mut record =
            NormalizedRecord::new(raw.id.clone(), raw.kind, published_at, snapshot_at);
        attach_metric(&mut record, Metric::Views, raw.view_count);
        attach_metric(&mut record, Metric::Likes, raw.like_count);
        attach_metric(&mut record, Metric::Comments, raw.comment_count);
        if raw.kind == EntityKind::Channel {
            attach_metric(&mut record, Metric::Subscribers, raw.subscriber_count);
        }

        let (_, snapshots) = grouped
            .entry(raw.id)
            .or_insert_with(|| (raw.kind, BTreeMap::new()));
        if snapshots.insert(snapshot_at, record).is_some() {
            stats.collisions += 1;
        }
    }

    let mut series = BTreeMap::new();
    for (id, (kind, snapshots)) in grouped {
        stats.normalized += snapshots.len() as u64;
        let records: Vec<NormalizedRecord> = snapshots.into_values().collect();
        series.insert(id.clone(), MetricSeries::new(id, kind, records));
    }

    tracing::debug!(
        total = stats.total,
        normalized = stats.normalized,
        skipped = stats.skipped,
        collisions = stats.collisions,
        "normalization pass complete"
    );

    NormalizeOutput { series, stats }
}

/// Attach a raw count when it exists and is in the valid domain.
/// Negative counts are treated as absent, not clamped to zero.
fn attach_metric(record: &mut NormalizedRecord, metric: Metric, raw: Option<i64>) {
    if let Some(value) = raw {
        if value >= 0 {
            record.set_metric(metric, value as u64);
        }
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, snapshot: &str, views: i64) -> RawItemRecord {
        RawItemRecord {
            id: id.to_string(),
            kind: EntityKind::Video,
            published_at: Some("2024-01-01T00:00:00Z".to_string()),
            snapshot_at: Some(snapshot.to_string()),
            view_count: Some(views),
            ..Default::default()
        }
    }

    #[test]
    fn test_records_grouped_and_ordered() {
        let output = normalize(vec![
            raw("b", "2024-06-03T00:00:00Z", 300),
            raw("a", "2024-06-02T00:00:00Z", 200),
            raw("a", "2024-06-01T00:00:00Z", 100),
        ]);

        assert_eq!(output.series.len(), 2);
        let a = &output.series["a"];
        assert_eq!(a.len(), 2);
        assert!(a.records()[0].snapshot_at < a.records()[1].snapshot_at);
        assert_eq!(output.stats.normalized, 3);
    }

    #[test]
    fn test_missing_snapshot_timestamp_dropped() {
        let mut record = raw("a", "2024-06-01T00:00:00Z", 100);
        record.snapshot_at = None;

        let output = normalize(vec![record]);
        assert!(output.series.is_empty());
        assert_eq!(output.stats.skipped, 1);
    }

    #[test]
    fn test_unparseable_timestamp_dropped() {
        let output = normalize(vec![raw("a", "yesterday-ish", 100)]);
        assert!(output.series.is_empty());
        assert_eq!(output.stats.skipped, 1);
        assert_eq!(output.stats.skip_rate(), 100.0);
    }

    #[test]
    fn test_snapshot_before_publication_dropped() {
        let mut record = raw("a", "2023-12-31T00:00:00Z", 100);
        record.published_at = Some("2024-01-01T00:00:00Z".to_string());

        let output = normalize(vec![record]);
        assert!(output.series.is_empty());
        assert_eq!(output.stats.skipped, 1);
    }

    #[test]
    fn test_duplicate_snapshot_keeps_later_arrival() {
        let output = normalize(vec![
            raw("a", "2024-06-01T00:00:00Z", 100),
            raw("a", "2024-06-01T00:00:00Z", 150),
        ]);

        let series = &output.series["a"];
        assert_eq!(series.len(), 1);
        assert_eq!(series.latest_metric(Metric::Views), Some(150));
        assert_eq!(output.stats.collisions, 1);
        assert_eq!(output.stats.normalized, 1);
    }

    #[test]
    fn test_negative_count_becomes_absent() {
        let output = normalize(vec![raw("a", "2024-06-01T00:00:00Z", -5)]);

        let record = &output.series["a"].records()[0];
        assert_eq!(record.metric(Metric::Views), None);
        assert_eq!(output.stats.skipped, 0);
    }

    #[test]
    fn test_subscribers_only_for_channels() {
        let mut video = raw("v", "2024-06-01T00:00:00Z", 100);
        video.subscriber_count = Some(500);
        let mut channel = raw("c", "2024-06-01T00:00:00Z", 100);
        channel.kind = EntityKind::Channel;
        channel.subscriber_count = Some(500);

        let output = normalize(vec![video, channel]);
        assert_eq!(
            output.series["v"].latest_metric(Metric::Subscribers),
            None
        );
        assert_eq!(
            output.series["c"].latest_metric(Metric::Subscribers),
            Some(500)
        );
    }

    #[test]
    fn test_offset_timezone_converted_to_utc() {
        let output = normalize(vec![raw("a", "2024-06-01T09:00:00+09:00", 100)]);
        let record = &output.series["a"].records()[0];
        assert_eq!(
            record.snapshot_at,
            "2024-06-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }
}
