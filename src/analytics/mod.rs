//! Analytics components, leaf-first: normalization, derived metrics,
//! trend scoring, competitor comparison, and keyword extraction

pub mod compare;
pub mod derive;
pub mod keywords;
pub mod normalize;
pub mod trend;

pub use compare::{compare_all, compare_pair, CompareOutput, ComparisonResult, Leader};
pub use derive::{derive_series, derive_series_with_prior, DerivedMetrics, DerivedOutput};
pub use keywords::{extract_keywords, KeywordOutput, KeywordStat};
pub use normalize::{normalize, NormalizeOutput, NormalizeStats};
pub use trend::{score_trends, InsufficientData, TrendOutput, TrendScore};
