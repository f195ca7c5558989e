//! Trend scoring across identifiers
//!
//! Combines each identifier's derived windows into a single comparable
//! score: a weighted sum of engagement and per-metric growth, with each
//! window's contribution exponentially decayed by its age against the
//! configured half-life. Identifiers with too few windows are reported as
//! insufficient data rather than scored; a zero score is a valid low score,
//! not a sentinel.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::analytics::derive::DerivedOutput;
use crate::config::{RunConfig, ENGAGEMENT_KEY};
use crate::models::{Metric, MetricSeries};

/// One labelled contribution to a trend score, kept for explainability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreComponent {
    /// Weight key this contribution came from
    pub label: String,

    /// Configured weight
    pub weight: f64,

    /// Decayed, weighted sum across the identifier's windows
    pub contribution: f64,
}

/// Final score and rank for one identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendScore {
    pub id: String,
    pub score: f64,

    /// 1-based position after the descending sort
    pub rank: usize,

    /// Per-component breakdown summing to `score`
    pub components: Vec<ScoreComponent>,

    /// Latest known view count, surfaced because it breaks ties
    pub latest_views: Option<u64>,

    /// Engagement rate at the newest window, when defined
    pub latest_engagement: Option<f64>,

    /// Derived windows that fed the score
    pub observations: usize,
}

/// Identifier excluded from scoring for lack of data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsufficientData {
    pub id: String,
    pub observations: usize,
    pub required: usize,
}

/// Distribution of the scored set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub scored: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

/// Scorer output: ranked scores plus the excluded identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendOutput {
    /// Scores sorted descending; ties broken by latest view count, then id
    pub scores: Vec<TrendScore>,

    /// Identifiers below the minimum-observations threshold
    pub insufficient: Vec<InsufficientData>,

    pub summary: ScoreSummary,
}

/// Score every identifier's derived windows and rank the results.
///
/// Ordering is deterministic: score descending, then latest view count
/// descending (unknown counts sort last), then identifier ascending.
pub fn score_trends(
    derived: &BTreeMap<String, DerivedOutput>,
    series: &BTreeMap<String, MetricSeries>,
    config: &RunConfig,
) -> TrendOutput {
    let mut scores = Vec::new();
    let mut insufficient = Vec::new();

    for (id, output) in derived {
        let observations = output.observations();
        if observations < config.min_observations {
            insufficient.push(InsufficientData {
                id: id.clone(),
                observations,
                required: config.min_observations,
            });
            continue;
        }

        let latest_views = series.get(id).and_then(|s| s.latest_metric(Metric::Views));
        scores.push(score_one(id, output, latest_views, config));
    }

    scores.sort_by(compare_scores);
    for (index, score) in scores.iter_mut().enumerate() {
        score.rank = index + 1;
    }

    let values: Vec<f64> = scores.iter().map(|s| s.score).collect();
    let summary = ScoreSummary {
        scored: values.len(),
        mean: (!values.is_empty()).then(|| values.iter().mean()),
        std_dev: (values.len() >= 2).then(|| values.iter().std_dev()),
    };

    tracing::debug!(
        scored = scores.len(),
        insufficient = insufficient.len(),
        "trend scoring complete"
    );

    TrendOutput {
        scores,
        insufficient,
        summary,
    }
}

fn score_one(
    id: &str,
    output: &DerivedOutput,
    latest_views: Option<u64>,
    config: &RunConfig,
) -> TrendScore {
    // A zero threshold admits identifiers with no windows; their score is
    // an empty sum, which is a valid low score rather than a sentinel.
    let Some(reference) = output.windows.last().map(|w| w.window_end) else {
        return TrendScore {
            id: id.to_string(),
            score: 0.0,
            rank: 0,
            components: Vec::new(),
            latest_views,
            latest_engagement: None,
            observations: 0,
        };
    };

    let mut contributions: BTreeMap<String, f64> = BTreeMap::new();
    let engagement_weight = config.engagement_weight();

    for window in &output.windows {
        // Age against this identifier's own newest window, so a stale
        // series is not decayed twice relative to fresher competitors.
        let age_days = (reference - window.window_end).num_seconds() as f64 / 86_400.0;
        let decay = 0.5_f64.powf(age_days / config.half_life_days);

        if engagement_weight > 0.0 {
            if let Some(rate) = window.engagement_rate {
                *contributions.entry(ENGAGEMENT_KEY.to_string()).or_insert(0.0) +=
                    decay * engagement_weight * rate;
            }
        }

        for (&metric, &growth) in &window.growth {
            let weight = config.metric_weight(metric);
            if weight > 0.0 {
                *contributions.entry(metric.as_str().to_string()).or_insert(0.0) +=
                    decay * weight * growth;
            }
        }
    }

    let components: Vec<ScoreComponent> = contributions
        .into_iter()
        .map(|(label, contribution)| {
            let weight = if label == ENGAGEMENT_KEY {
                engagement_weight
            } else {
                Metric::parse(&label).map_or(0.0, |m| config.metric_weight(m))
            };
            ScoreComponent {
                label,
                weight,
                contribution,
            }
        })
        .collect();

    TrendScore {
        id: id.to_string(),
        score: components.iter().map(|c| c.contribution).sum(),
        rank: 0,
        components,
        latest_views,
        latest_engagement: output.windows.last().and_then(|w| w.engagement_rate),
        observations: output.observations(),
    }
}

fn compare_scores(a: &TrendScore, b: &TrendScore) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.latest_views.cmp(&a.latest_views))
        .then_with(|| a.id.cmp(&b.id))
}
