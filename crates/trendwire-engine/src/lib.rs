//! Multi-source trend aggregation, scoring, and cross-validation engine.
//!
//! Fetches trending signals from five source families (news, video, search
//! trends, microblog, forum) through cascading fallback strategies, scores
//! every item for viral potential, deduplicates and clusters items that
//! describe the same topic across sources, and validates whether a news
//! item is corroborated by social activity.
//!
//! Adapters never fail: expected upstream problems degrade through the
//! strategy chain down to a curated synthetic fallback that is flagged as
//! such. The consumer surface is a handful of plain data-producing
//! functions in [`aggregate`].

pub mod aggregate;
pub mod crossmatch;
pub mod error;
pub mod scorer;
pub mod types;
pub mod viral;

mod fetch;
mod sources;
mod text;

pub use aggregate::{cross_match, detect_viral_news, fetch_all, rank_viral};
pub use crossmatch::{dedup_items, lexical_clusters, titles_similar, Clusterer};
pub use error::EngineError;
pub use scorer::headline_score;
pub use sources::{
    fetch_forum_trends, fetch_microblog_trends, fetch_news, fetch_search_trends, fetch_videos,
};
pub use text::extract_keywords;
pub use types::{
    AggregatedTrends, EngineContext, ForumSignal, MicroblogSignal, SamplePost, SourceEndpoints,
    SourceKind, TopicCluster, TrendItem, ViralAssessment, ViralNewsItem, ViralReport,
};
pub use viral::{composite_viral_score, viral_decision};
