//! Tests for the metric normalizer

mod common;

use tubelens::analytics::normalize;
use tubelens::models::Metric;

use common::video_snapshot;

#[test]
fn test_batch_groups_by_identifier() {
    let output = normalize(vec![
        video_snapshot("alpha", "2024-06-01T00:00:00Z", 100, 1, 0),
        video_snapshot("beta", "2024-06-01T00:00:00Z", 200, 2, 0),
        video_snapshot("alpha", "2024-06-02T00:00:00Z", 150, 1, 0),
    ]);

    assert_eq!(output.series.len(), 2);
    assert_eq!(output.series["alpha"].len(), 2);
    assert_eq!(output.series["beta"].len(), 1);
    assert_eq!(output.stats.normalized, 3);
    assert_eq!(output.stats.skipped, 0);
}

#[test]
fn test_series_ordered_by_snapshot_time() {
    let output = normalize(vec![
        video_snapshot("a", "2024-06-05T00:00:00Z", 500, 5, 1),
        video_snapshot("a", "2024-06-01T00:00:00Z", 100, 1, 0),
        video_snapshot("a", "2024-06-03T00:00:00Z", 300, 3, 1),
    ]);

    let series = &output.series["a"];
    let timestamps: Vec<_> = series.records().iter().map(|r| r.snapshot_at).collect();
    let mut sorted = timestamps.clone();
    sorted.sort();
    assert_eq!(timestamps, sorted);
}

#[test]
fn test_exactly_one_record_survives_a_collision() {
    let output = normalize(vec![
        video_snapshot("a", "2024-06-01T00:00:00Z", 100, 1, 0),
        video_snapshot("a", "2024-06-01T00:00:00Z", 120, 2, 0),
        video_snapshot("a", "2024-06-01T00:00:00Z", 140, 3, 0),
    ]);

    assert_eq!(output.series["a"].len(), 1);
    assert_eq!(output.stats.collisions, 2);
    // later-arriving record wins
    assert_eq!(output.series["a"].latest_metric(Metric::Views), Some(140));
}

#[test]
fn test_bad_timestamps_counted_never_fabricated() {
    let mut missing = video_snapshot("a", "2024-06-01T00:00:00Z", 100, 1, 0);
    missing.snapshot_at = None;
    let garbled = video_snapshot("b", "last tuesday", 100, 1, 0);
    let good = video_snapshot("c", "2024-06-01T00:00:00Z", 100, 1, 0);

    let output = normalize(vec![missing, garbled, good]);
    assert_eq!(output.stats.skipped, 2);
    assert_eq!(output.series.len(), 1);
    assert!(output.series.contains_key("c"));
}

#[test]
fn test_negative_counts_absent_not_clamped() {
    let mut record = video_snapshot("a", "2024-06-01T00:00:00Z", 100, -7, 0);
    record.comment_count = Some(-1);

    let output = normalize(vec![record]);
    let normalized = &output.series["a"].records()[0];
    assert_eq!(normalized.metric(Metric::Views), Some(100));
    assert_eq!(normalized.metric(Metric::Likes), None);
    assert_eq!(normalized.metric(Metric::Comments), None);
}
