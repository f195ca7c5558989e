// Core data structures for the tubelens analytics engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metric names tracked per snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Views,
    Likes,
    Comments,
    Subscribers,
}

impl Metric {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::Likes => "likes",
            Self::Comments => "comments",
            Self::Subscribers => "subscribers",
        }
    }

    /// Create from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "views" => Some(Self::Views),
            "likes" => Some(Self::Likes),
            "comments" => Some(Self::Comments),
            "subscribers" => Some(Self::Subscribers),
            _ => None,
        }
    }

    /// Get all metrics
    pub fn all() -> Vec<Self> {
        vec![Self::Views, Self::Likes, Self::Comments, Self::Subscribers]
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of platform entity a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Video,
    Channel,
}

impl EntityKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Channel => "channel",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform-supplied record for one video or channel at one observation time.
///
/// Fields arrive exactly as the platform API sends them: timestamps as
/// RFC 3339 strings, counts nullable and signed. Immutable once fetched;
/// all cleanup happens in the normalizer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawItemRecord {
    pub id: String,
    #[serde(default)]
    pub kind: EntityKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub published_at: Option<String>,
    pub snapshot_at: Option<String>,
    pub view_count: Option<i64>,
    pub like_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub subscriber_count: Option<i64>,
}

/// Uniform typed record produced by the normalizer.
///
/// A metric absent from the map is unknown, which is distinct from a
/// recorded zero. Invariant: `snapshot_at >= published_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub id: String,
    pub kind: EntityKind,
    pub published_at: DateTime<Utc>,
    pub snapshot_at: DateTime<Utc>,
    metrics: BTreeMap<Metric, u64>,
}

impl NormalizedRecord {
    /// Create a record with no metrics attached
    pub fn new(
        id: String,
        kind: EntityKind,
        published_at: DateTime<Utc>,
        snapshot_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            published_at,
            snapshot_at,
            metrics: BTreeMap::new(),
        }
    }

    /// Attach a known metric value
    pub fn set_metric(&mut self, metric: Metric, value: u64) {
        self.metrics.insert(metric, value);
    }

    /// Look up a metric; `None` means unknown, not zero
    pub fn metric(&self, metric: Metric) -> Option<u64> {
        self.metrics.get(&metric).copied()
    }

    /// All known metrics in stable order
    pub fn metrics(&self) -> &BTreeMap<Metric, u64> {
        &self.metrics
    }
}

/// Time-ordered snapshots for a single identifier.
///
/// Records are sorted by snapshot timestamp ascending and no two records
/// share a timestamp; both are guaranteed by the normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSeries {
    pub id: String,
    pub kind: EntityKind,
    records: Vec<NormalizedRecord>,
}

impl MetricSeries {
    pub(crate) fn new(id: String, kind: EntityKind, records: Vec<NormalizedRecord>) -> Self {
        Self { id, kind, records }
    }

    /// Get all records in chronological order
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if there are no snapshots
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent snapshot, if any
    pub fn latest(&self) -> Option<&NormalizedRecord> {
        self.records.last()
    }

    /// Value of a metric at the most recent snapshot
    pub fn latest_metric(&self, metric: Metric) -> Option<u64> {
        self.latest().and_then(|r| r.metric(metric))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_metric_string_roundtrip() {
        for metric in Metric::all() {
            let s = metric.as_str();
            assert_eq!(Metric::parse(s), Some(metric));
        }
        assert_eq!(Metric::parse("dislikes"), None);
    }

    #[test]
    fn test_metric_parse_case_insensitive() {
        assert_eq!(Metric::parse("Views"), Some(Metric::Views));
        assert_eq!(Metric::parse("SUBSCRIBERS"), Some(Metric::Subscribers));
    }

    #[test]
    fn test_absent_metric_is_not_zero() {
        let mut record =
            NormalizedRecord::new("vid1".to_string(), EntityKind::Video, ts(1), ts(2));
        record.set_metric(Metric::Likes, 0);

        assert_eq!(record.metric(Metric::Likes), Some(0));
        assert_eq!(record.metric(Metric::Views), None);
    }

    #[test]
    fn test_series_latest() {
        let mut first =
            NormalizedRecord::new("vid1".to_string(), EntityKind::Video, ts(1), ts(2));
        first.set_metric(Metric::Views, 100);
        let mut second =
            NormalizedRecord::new("vid1".to_string(), EntityKind::Video, ts(1), ts(3));
        second.set_metric(Metric::Views, 250);

        let series =
            MetricSeries::new("vid1".to_string(), EntityKind::Video, vec![first, second]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.latest_metric(Metric::Views), Some(250));
    }

    #[test]
    fn test_raw_record_deserializes_platform_shape() {
        let json = r#"{
            "id": "dQw4w9WgXcQ",
            "kind": "video",
            "title": "Never Gonna Give You Up",
            "tags": ["music", "80s"],
            "published_at": "2009-10-25T06:57:33Z",
            "snapshot_at": "2024-06-01T00:00:00Z",
            "view_count": 1400000000,
            "like_count": 16000000
        }"#;

        let record: RawItemRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "dQw4w9WgXcQ");
        assert_eq!(record.kind, EntityKind::Video);
        assert_eq!(record.comment_count, None);
        assert_eq!(record.tags.len(), 2);
    }
}
