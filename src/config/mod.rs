//! Run configuration for the analytics engine
//!
//! This module handles loading and validating the per-run configuration:
//! requested sections, trend weights, alignment policy, keyword options,
//! and the parallelism limit. Configuration mistakes fail a run up front,
//! before any computation starts; data defects never do.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

use crate::models::Metric;

/// Errors raised by configuration validation and loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown weight key: {0}")]
    UnknownWeightKey(String),

    #[error("Invalid weight for {key}: {value}")]
    InvalidWeight { key: String, value: f64 },

    #[error("Half-life must be positive, got {0}")]
    NonPositiveHalfLife(f64),

    #[error("Parallelism limit must be at least 1")]
    ZeroParallelism,

    #[error("Minimum token length must be at least 1")]
    ZeroTokenLength,

    #[error("Alignment tolerance must be non-negative, got {0} hours")]
    NegativeTolerance(i64),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Report sections a caller can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Trend,
    Comparison,
    Keywords,
}

impl Section {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::Comparison => "comparison",
            Self::Keywords => "keywords",
        }
    }
}

/// How two series are paired on a common time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Pair the latest snapshots that fall on the same UTC calendar day
    CalendarDay,

    /// Pair each snapshot with the nearest counterpart within a tolerance
    Nearest { tolerance_hours: i64 },
}

impl Default for AlignmentPolicy {
    fn default() -> Self {
        Self::CalendarDay
    }
}

/// Weight key for the engagement-rate component. The other recognized keys
/// are the metric names themselves.
pub const ENGAGEMENT_KEY: &str = "engagement";

/// Full configuration for one analytics run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Sections to compute; omitted sections are absent from the report
    pub sections: Vec<Section>,

    /// Named component weights for the trend score
    pub weights: BTreeMap<String, f64>,

    /// Exponential decay half-life for older windows, in days
    pub half_life_days: f64,

    /// Derived windows required before an identifier is scored
    pub min_observations: usize,

    /// Snapshot alignment policy for comparisons
    pub alignment: AlignmentPolicy,

    /// Tokens excluded from keyword extraction
    pub stop_words: BTreeSet<String>,

    /// Minimum token length kept by the keyword extractor
    pub min_token_len: usize,

    /// Truncate ranked keyword lists to this many entries
    pub keyword_limit: Option<usize>,

    /// Worker tasks for per-identifier computation
    pub parallelism: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(Metric::Views.as_str().to_string(), 1.0);
        weights.insert(ENGAGEMENT_KEY.to_string(), 1.0);

        Self {
            sections: vec![Section::Trend, Section::Comparison, Section::Keywords],
            weights,
            half_life_days: 7.0,
            min_observations: 2,
            alignment: AlignmentPolicy::default(),
            stop_words: default_stop_words(),
            min_token_len: 3,
            keyword_limit: None,
            parallelism: 4,
        }
    }
}

impl RunConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load scalar overrides from environment variables, defaults elsewhere
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_parse::<f64>("TUBELENS_HALF_LIFE_DAYS") {
            config.half_life_days = v;
        }
        if let Some(v) = env_parse::<usize>("TUBELENS_MIN_OBSERVATIONS") {
            config.min_observations = v;
        }
        if let Some(v) = env_parse::<usize>("TUBELENS_PARALLELISM") {
            config.parallelism = v;
        }
        if let Some(v) = env_parse::<usize>("TUBELENS_MIN_TOKEN_LEN") {
            config.min_token_len = v;
        }

        config
    }

    /// Validate the configuration, failing fast on caller mistakes
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, &value) in &self.weights {
            if key != ENGAGEMENT_KEY && Metric::parse(key).is_none() {
                return Err(ConfigError::UnknownWeightKey(key.clone()));
            }
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    key: key.clone(),
                    value,
                });
            }
        }

        if !self.half_life_days.is_finite() || self.half_life_days <= 0.0 {
            return Err(ConfigError::NonPositiveHalfLife(self.half_life_days));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        if self.min_token_len == 0 {
            return Err(ConfigError::ZeroTokenLength);
        }
        if let AlignmentPolicy::Nearest { tolerance_hours } = self.alignment {
            if tolerance_hours < 0 {
                return Err(ConfigError::NegativeTolerance(tolerance_hours));
            }
        }

        Ok(())
    }

    /// Weight configured for a metric's growth component (0 when unset)
    pub fn metric_weight(&self, metric: Metric) -> f64 {
        self.weights.get(metric.as_str()).copied().unwrap_or(0.0)
    }

    /// Weight configured for the engagement-rate component (0 when unset)
    pub fn engagement_weight(&self) -> f64 {
        self.weights.get(ENGAGEMENT_KEY).copied().unwrap_or(0.0)
    }

    /// Whether a section was requested for this run
    pub fn wants(&self, section: Section) -> bool {
        self.sections.contains(&section)
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|v| v.parse::<T>().ok())
}

/// Default English stop-word set used by the keyword extractor
pub fn default_stop_words() -> BTreeSet<String> {
    [
        "a", "about", "after", "all", "also", "and", "are", "been", "best", "but", "can",
        "could", "did", "for", "from", "get", "had", "has", "have", "how", "its", "just",
        "more", "most", "new", "not", "now", "off", "one", "our", "out", "over", "should",
        "the", "their", "them", "then", "there", "these", "they", "this", "video", "was",
        "were", "what", "when", "which", "who", "will", "with", "would", "you", "your",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}
