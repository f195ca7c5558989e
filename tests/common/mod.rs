//! Common test utilities

use tubelens::models::{EntityKind, RawItemRecord};

/// Create a video record with the given snapshot time and counts
pub fn video_snapshot(
    id: &str,
    snapshot_at: &str,
    views: i64,
    likes: i64,
    comments: i64,
) -> RawItemRecord {
    RawItemRecord {
        id: id.to_string(),
        kind: EntityKind::Video,
        title: format!("{id} weekly devlog"),
        description: "Progress update and roadmap discussion".to_string(),
        tags: vec!["devlog".to_string(), "programming".to_string()],
        published_at: Some("2024-01-15T08:00:00Z".to_string()),
        snapshot_at: Some(snapshot_at.to_string()),
        view_count: Some(views),
        like_count: Some(likes),
        comment_count: Some(comments),
        subscriber_count: None,
    }
}

/// Create a channel record with subscriber data
#[allow(dead_code)]
pub fn channel_snapshot(
    id: &str,
    snapshot_at: &str,
    views: i64,
    subscribers: i64,
) -> RawItemRecord {
    RawItemRecord {
        id: id.to_string(),
        kind: EntityKind::Channel,
        title: format!("{id} channel"),
        published_at: Some("2020-03-01T00:00:00Z".to_string()),
        snapshot_at: Some(snapshot_at.to_string()),
        view_count: Some(views),
        subscriber_count: Some(subscribers),
        ..Default::default()
    }
}

/// The worked growth scenario: views 1000/1500/2000 and likes 10/20/40
/// observed at day 0, day 1, and day 3.
#[allow(dead_code)]
pub fn growth_scenario(id: &str) -> Vec<RawItemRecord> {
    vec![
        video_snapshot(id, "2024-06-01T00:00:00Z", 1000, 10, 2),
        video_snapshot(id, "2024-06-02T00:00:00Z", 1500, 20, 3),
        video_snapshot(id, "2024-06-04T00:00:00Z", 2000, 40, 5),
    ]
}
