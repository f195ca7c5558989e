//! Analytics orchestration
//!
//! The engine owns the full lifecycle of one analytics run: it validates
//! the configuration up front, normalizes the raw batch, derives metrics
//! per identifier on a bounded worker pool, then assembles the requested
//! sections into a single report. The engine is stateless and performs no
//! I/O; independent runs may execute concurrently with no shared state.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐    ┌────────────┐    ┌───────────────┐    ┌──────────┐
//! │ Raw batch │───▶│ Normalizer │───▶│ Derive workers│───▶│ Sections │
//! └───────────┘    └────────────┘    │  (N tasks)    │    │ + report │
//!                                    └───────────────┘    └──────────┘
//! ```
//!
//! Per-identifier derivation jobs flow through an mpsc channel to worker
//! tasks; the join before section assembly is the single synchronization
//! point, which keeps ordering guarantees explicit.

pub mod report;

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::analytics::derive::{derive_series, DerivedOutput};
use crate::analytics::{compare, keywords, normalize, trend};
use crate::config::{RunConfig, Section};
use crate::error::{Error, Result};
use crate::models::{MetricSeries, RawItemRecord};

pub use report::{Diagnostics, Report, SectionOutcome, UnavailableReason};

/// One-shot analytics engine for a validated configuration
#[derive(Debug, Clone)]
pub struct Engine {
    config: RunConfig,
}

impl Engine {
    /// Create an engine, failing fast on configuration mistakes
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration this engine runs with
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute one analytics run over a raw batch.
    ///
    /// Data defects never fail the run; they surface as diagnostic
    /// counters. Requested sections that cannot be produced are marked
    /// unavailable with a reason code while the rest proceed.
    pub async fn run(&self, batch: Vec<RawItemRecord>) -> Result<Report> {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, records = batch.len(), "starting analytics run");

        // Keyword extraction reads the raw text fields, so it runs on the
        // batch before normalization consumes it.
        let keyword_output = self.config.wants(Section::Keywords).then(|| {
            keywords::extract_keywords(
                &batch,
                &self.config.stop_words,
                self.config.min_token_len,
                self.config.keyword_limit,
            )
        });

        let normalized = normalize::normalize(batch);
        let series = normalized.series;

        let derived = derive_parallel(&series, self.config.parallelism).await?;
        let degenerate: u64 = derived.values().map(|d| d.degenerate).sum();

        let mut diagnostics = Diagnostics {
            records_total: normalized.stats.total,
            records_normalized: normalized.stats.normalized,
            skipped: normalized.stats.skipped,
            collisions: normalized.stats.collisions,
            degenerate,
            excluded_points: 0,
        };

        let trend_section = self.config.wants(Section::Trend).then(|| {
            if series.is_empty() {
                SectionOutcome::Unavailable {
                    reason: UnavailableReason::InsufficientData,
                }
            } else {
                SectionOutcome::Available {
                    data: trend::score_trends(&derived, &series, &self.config),
                }
            }
        });

        let comparison_section = self.config.wants(Section::Comparison).then(|| {
            if series.len() < 2 {
                SectionOutcome::Unavailable {
                    reason: UnavailableReason::NotEnoughSeries,
                }
            } else {
                let output = compare::compare_all(&series, self.config.alignment);
                diagnostics.excluded_points = output.excluded_total;
                SectionOutcome::Available { data: output }
            }
        });

        let keyword_section = keyword_output.map(|output| {
            if output.is_empty() {
                SectionOutcome::Unavailable {
                    reason: UnavailableReason::EmptyTextBatch,
                }
            } else {
                SectionOutcome::Available { data: output }
            }
        });

        tracing::info!(
            %run_id,
            identifiers = series.len(),
            skipped = diagnostics.skipped,
            collisions = diagnostics.collisions,
            degenerate = diagnostics.degenerate,
            excluded = diagnostics.excluded_points,
            "analytics run complete"
        );

        Ok(Report {
            run_id,
            generated_at: chrono::Utc::now(),
            identifiers: series.len(),
            diagnostics,
            trend: trend_section,
            comparison: comparison_section,
            keywords: keyword_section,
        })
    }
}

/// Validate a configuration and run a single batch through a fresh engine.
pub async fn run_batch(batch: Vec<RawItemRecord>, config: RunConfig) -> Result<Report> {
    Engine::new(config)?.run(batch).await
}

/// Derive metrics for every series on a pool of worker tasks.
///
/// Each task owns disjoint per-identifier state; results merge into a
/// keyed map, so worker scheduling cannot affect output ordering.
async fn derive_parallel(
    series: &BTreeMap<String, MetricSeries>,
    parallelism: usize,
) -> Result<BTreeMap<String, DerivedOutput>> {
    if series.is_empty() {
        return Ok(BTreeMap::new());
    }

    let (job_tx, job_rx) = mpsc::channel::<MetricSeries>(series.len());
    for s in series.values() {
        job_tx
            .send(s.clone())
            .await
            .map_err(|e| Error::worker(format!("job queue closed early: {e}")))?;
    }
    drop(job_tx);

    let job_rx = Arc::new(Mutex::new(job_rx));
    let worker_count = parallelism.min(series.len());

    let mut handles = Vec::with_capacity(worker_count);
    for worker_id in 0..worker_count {
        let job_rx = Arc::clone(&job_rx);
        handles.push(tokio::spawn(async move {
            let mut results = Vec::new();
            loop {
                let job = { job_rx.lock().await.recv().await };
                let Some(series) = job else { break };
                tracing::trace!(worker_id, id = %series.id, "deriving series");
                let output = derive_series(&series);
                results.push((series.id, output));
            }
            results
        }));
    }

    let mut derived = BTreeMap::new();
    for handle in handles {
        let results = handle
            .await
            .map_err(|e| Error::worker(format!("derive worker failed: {e}")))?;
        for (id, output) in results {
            derived.insert(id, output);
        }
    }

    Ok(derived)
}
