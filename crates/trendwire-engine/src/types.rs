use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use trendwire_core::AppConfig;

/// Which of the five upstream source families an item came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    News,
    Video,
    SearchTrend,
    Microblog,
    Forum,
}

impl SourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::News => "news",
            SourceKind::Video => "video",
            SourceKind::SearchTrend => "search_trend",
            SourceKind::Microblog => "microblog",
            SourceKind::Forum => "forum",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single normalized piece of trending content from any source.
///
/// Immutable once an adapter produces it; `score` is computed exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendItem {
    pub title: String,
    /// Provider identifier, e.g. `newsdata`, `youtube`, `trends24`.
    pub source_name: String,
    pub kind: SourceKind,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub score: u32,
    /// Engagement counters; keys vary per source (`views`, `upvotes`, ...).
    pub metrics: BTreeMap<String, u64>,
    /// True when the item comes from the curated synthetic fallback.
    pub is_fallback: bool,
}

impl TrendItem {
    pub fn new(title: impl Into<String>, source_name: &str, kind: SourceKind) -> Self {
        Self {
            title: title.into(),
            source_name: source_name.to_string(),
            kind,
            url: None,
            published_at: None,
            score: 0,
            metrics: BTreeMap::new(),
            is_fallback: false,
        }
    }
}

/// A group of items from at least two distinct source kinds judged to
/// describe the same topic.
#[derive(Debug, Clone, Serialize)]
pub struct TopicCluster {
    pub representative_title: String,
    pub source_kinds: BTreeSet<SourceKind>,
    pub items: Vec<TrendItem>,
    /// In `[0, 1]`; grows with the number of corroborating source kinds.
    pub confidence: f32,
    pub keywords: Vec<String>,
}

/// A synthesized representative microblog post, for evidence display only.
#[derive(Debug, Clone, Serialize)]
pub struct SamplePost {
    pub text: String,
    pub impressions: u32,
    pub engagements: u32,
}

/// Estimated microblog activity around a news item.
#[derive(Debug, Clone, Serialize)]
pub struct MicroblogSignal {
    pub post_count: u32,
    pub avg_impressions: u32,
    pub sample_posts: Vec<SamplePost>,
}

/// Measured forum activity around a news item.
#[derive(Debug, Clone, Serialize)]
pub struct ForumSignal {
    pub post_count: u32,
    pub good_engagement_count: u32,
    pub total_upvotes: u64,
}

/// Outcome of the viral validation pipeline for one news item.
#[derive(Debug, Clone, Serialize)]
pub struct ViralAssessment {
    pub is_viral: bool,
    pub viral_score: u8,
    pub microblog: MicroblogSignal,
    pub forum: ForumSignal,
    pub evidence_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViralNewsItem {
    pub item: TrendItem,
    pub assessment: ViralAssessment,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViralReport {
    pub total_news: usize,
    pub viral_news: usize,
    pub items: Vec<ViralNewsItem>,
}

/// Fan-in result of one full aggregation run.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedTrends {
    pub news: Vec<TrendItem>,
    pub videos: Vec<TrendItem>,
    pub search_trends: Vec<TrendItem>,
    pub microblog: Vec<TrendItem>,
    pub forum: Vec<TrendItem>,
}

impl AggregatedTrends {
    /// All items across the five lists, in fixed source order.
    #[must_use]
    pub fn merged(&self) -> Vec<TrendItem> {
        let mut all = Vec::with_capacity(
            self.news.len()
                + self.videos.len()
                + self.search_trends.len()
                + self.microblog.len()
                + self.forum.len(),
        );
        all.extend(self.news.iter().cloned());
        all.extend(self.videos.iter().cloned());
        all.extend(self.search_trends.iter().cloned());
        all.extend(self.microblog.iter().cloned());
        all.extend(self.forum.iter().cloned());
        all
    }
}

/// Upstream endpoints, overridable so tests can point at a mock server.
#[derive(Debug, Clone)]
pub struct SourceEndpoints {
    pub newsdata_api: String,
    pub google_news_rss: String,
    pub news_trending_pages: Vec<String>,
    pub youtube_api: String,
    pub youtube_search_rss: String,
    pub daily_trends_api: String,
    pub trends_aggregator_page: String,
    pub regional_trending_pages: Vec<String>,
    pub microblog_trend_pages: Vec<String>,
    pub forum_base: String,
    pub forum_alt_base: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            newsdata_api: "https://newsdata.io/api/1/latest".to_string(),
            google_news_rss: "https://news.google.com/rss".to_string(),
            news_trending_pages: vec![
                "https://www.ndtv.com/trending".to_string(),
                "https://www.indiatoday.in/trending-news".to_string(),
            ],
            youtube_api: "https://www.googleapis.com/youtube/v3".to_string(),
            youtube_search_rss: "https://www.youtube.com/feeds/videos.xml".to_string(),
            daily_trends_api: "https://trends.google.com/trends/api/dailytrends".to_string(),
            trends_aggregator_page: "https://trends24.in/india/".to_string(),
            regional_trending_pages: vec![
                "https://www.ndtv.com/trending".to_string(),
                "https://www.indiatoday.in/trending-news".to_string(),
            ],
            microblog_trend_pages: vec![
                "https://trends24.in/india/".to_string(),
                "https://getdaytrends.com/india/".to_string(),
            ],
            forum_base: "https://www.reddit.com".to_string(),
            forum_alt_base: "https://old.reddit.com".to_string(),
        }
    }
}

/// Read-only state shared by every adapter call: configuration plus the
/// endpoint table. Nothing here is written after construction.
#[derive(Debug, Clone)]
pub struct EngineContext {
    pub config: AppConfig,
    pub endpoints: SourceEndpoints,
}

impl EngineContext {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            endpoints: SourceEndpoints::default(),
        }
    }

    #[must_use]
    pub fn with_endpoints(config: AppConfig, endpoints: SourceEndpoints) -> Self {
        Self { config, endpoints }
    }

    /// RNG for synthetic data: seeded from config when a seed is set so
    /// curated-fallback generation is reproducible in tests.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
