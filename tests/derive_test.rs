//! Tests for the derived-metric calculator

mod common;

use proptest::prelude::*;

use tubelens::analytics::{derive_series, normalize};
use tubelens::models::Metric;

use common::{growth_scenario, video_snapshot};

#[test]
fn test_worked_growth_scenario() {
    let output = normalize(growth_scenario("vid"));
    let derived = derive_series(&output.series["vid"]);

    assert_eq!(derived.windows.len(), 2);

    // day 0 -> day 1: +500 views over one day
    assert_eq!(derived.windows[0].growth[&Metric::Views], 500.0);
    // day 1 -> day 3: +500 views over two days
    assert_eq!(derived.windows[1].elapsed_days, 2);
    assert_eq!(derived.windows[1].growth[&Metric::Views], 250.0);

    // engagement at the final snapshot: (40 likes + 5 comments) / 2000 views
    let engagement = derived.windows[1].engagement_rate.unwrap();
    assert!((engagement - 45.0 / 2000.0).abs() < 1e-12);
}

#[test]
fn test_series_shorter_than_two_is_empty() {
    let output = normalize(vec![video_snapshot("solo", "2024-06-01T00:00:00Z", 100, 1, 0)]);
    let derived = derive_series(&output.series["solo"]);
    assert!(derived.windows.is_empty());
    assert_eq!(derived.degenerate, 0);
}

proptest! {
    /// Growth rate sign always matches the sign of the raw metric delta.
    #[test]
    fn growth_sign_matches_delta_sign(views in prop::collection::vec(0i64..1_000_000, 2..8)) {
        let batch: Vec<_> = views
            .iter()
            .enumerate()
            .map(|(day, &v)| {
                video_snapshot(
                    "vid",
                    &format!("2024-06-{:02}T00:00:00Z", day + 1),
                    v,
                    0,
                    0,
                )
            })
            .collect();

        let output = normalize(batch);
        let derived = derive_series(&output.series["vid"]);

        prop_assert_eq!(derived.windows.len(), views.len() - 1);
        for (window, pair) in derived.windows.iter().zip(views.windows(2)) {
            let delta = pair[1] - pair[0];
            let growth = window.growth[&Metric::Views];
            let growth_sign = if growth > 0.0 {
                1
            } else if growth < 0.0 {
                -1
            } else {
                0
            };
            prop_assert_eq!(growth_sign, delta.signum());
        }
    }

    /// Derived windows always cover n-1 consecutive pairs of a clean series.
    #[test]
    fn window_count_is_len_minus_one(len in 2usize..10) {
        let batch: Vec<_> = (0..len)
            .map(|day| {
                video_snapshot(
                    "vid",
                    &format!("2024-06-{:02}T00:00:00Z", day + 1),
                    (day as i64 + 1) * 100,
                    day as i64,
                    0,
                )
            })
            .collect();

        let output = normalize(batch);
        let derived = derive_series(&output.series["vid"]);
        prop_assert_eq!(derived.windows.len(), len - 1);
        prop_assert_eq!(derived.degenerate, 0);
    }
}
