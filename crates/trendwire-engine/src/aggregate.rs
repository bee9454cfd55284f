//! Aggregation orchestrator: fan the five adapters out concurrently, fan
//! the results back in, and feed them to scoring, cross-matching, or the
//! viral pipeline as the caller asks.
//!
//! No shared mutable state is written concurrently; the only shared state
//! is the read-only [`EngineContext`]. Per-adapter failures never cancel
//! siblings — isolation lives inside each adapter.

use crate::crossmatch::{dedup_items, Clusterer};
use crate::error::EngineError;
use crate::sources::{
    fetch_forum_trends, fetch_microblog_trends, fetch_news, fetch_search_trends, fetch_videos,
};
use crate::types::{AggregatedTrends, EngineContext, TopicCluster, TrendItem, ViralReport};
use crate::viral;

/// Run all five adapters concurrently and collect their results.
pub async fn fetch_all(ctx: &EngineContext) -> AggregatedTrends {
    let (news, videos, search_trends, microblog, forum) = tokio::join!(
        fetch_news(ctx),
        fetch_videos(ctx),
        fetch_search_trends(ctx),
        fetch_microblog_trends(ctx),
        fetch_forum_trends(ctx),
    );

    tracing::info!(
        news = news.len(),
        videos = videos.len(),
        search_trends = search_trends.len(),
        microblog = microblog.len(),
        forum = forum.len(),
        "aggregation complete"
    );

    AggregatedTrends {
        news,
        videos,
        search_trends,
        microblog,
        forum,
    }
}

/// Deduplicate each list within its source, then cluster the merged batch
/// into cross-source topics.
pub async fn cross_match(
    ctx: &EngineContext,
    news: &[TrendItem],
    videos: &[TrendItem],
    search_trends: &[TrendItem],
    microblog: &[TrendItem],
    forum: &[TrendItem],
) -> Vec<TopicCluster> {
    let mut batch = Vec::new();
    for list in [news, videos, search_trends, microblog, forum] {
        batch.extend(dedup_items(list));
    }

    Clusterer::from_context(ctx).cluster(&batch).await
}

/// Merge the five lists and sort by score descending — a thin ranking
/// wrapper over the per-item scores the adapters already computed.
#[must_use]
pub fn rank_viral(
    news: &[TrendItem],
    videos: &[TrendItem],
    search_trends: &[TrendItem],
    microblog: &[TrendItem],
    forum: &[TrendItem],
) -> Vec<TrendItem> {
    let mut merged: Vec<TrendItem> = news
        .iter()
        .chain(videos)
        .chain(search_trends)
        .chain(microblog)
        .chain(forum)
        .cloned()
        .collect();
    merged.sort_by(|a, b| b.score.cmp(&a.score));
    merged
}

/// Fetch fresh news and push the top candidates through the viral
/// validation pipeline.
///
/// # Errors
///
/// The only top-level operation permitted to fail visibly; see
/// [`viral::detect_viral_news`].
pub async fn detect_viral_news(ctx: &EngineContext) -> Result<ViralReport, EngineError> {
    viral::detect_viral_news(ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;
    use trendwire_core::AppConfig;

    fn item(title: &str, kind: SourceKind, score: u32) -> TrendItem {
        let mut item = TrendItem::new(title, "test", kind);
        item.score = score;
        item
    }

    fn test_ctx() -> EngineContext {
        EngineContext::new(AppConfig {
            log_level: "info".to_string(),
            newsdata_api_key: None,
            youtube_api_key: None,
            llm_api_url: None,
            llm_api_key: None,
            request_timeout_secs: 5,
            probe_timeout_secs: 2,
            user_agent: "trendwire-test".to_string(),
            forum_inter_request_delay_ms: 0,
            rng_seed: Some(7),
        })
    }

    #[test]
    fn rank_merges_and_sorts_descending() {
        let news = vec![item("a", SourceKind::News, 10)];
        let videos = vec![item("b", SourceKind::Video, 45)];
        let trends = vec![item("c", SourceKind::SearchTrend, 25)];
        let ranked = rank_viral(&news, &videos, &trends, &[], &[]);
        let scores: Vec<u32> = ranked.iter().map(|i| i.score).collect();
        assert_eq!(scores, vec![45, 25, 10]);
    }

    #[tokio::test]
    async fn cross_match_dedups_within_source_before_clustering() {
        let ctx = test_ctx();

        let news = vec![
            item("Election results declared", SourceKind::News, 10),
            item("election results declared", SourceKind::News, 10),
        ];
        let trends = vec![item("election results", SourceKind::SearchTrend, 5)];

        let clusters = cross_match(&ctx, &news, &[], &trends, &[], &[]).await;
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].items.len(), 2, "duplicate news item must be dropped");
    }

    #[tokio::test]
    async fn end_to_end_election_batch_produces_a_cluster() {
        let ctx = test_ctx();

        let news = vec![
            item("Election results declared in five states", SourceKind::News, 30),
            item("Ruling party sweeps election results", SourceKind::News, 20),
            item("Opposition questions election process", SourceKind::News, 15),
            item("Markets rally after election verdict", SourceKind::News, 10),
            item("Voter turnout hits record high", SourceKind::News, 5),
        ];
        let videos = vec![
            item("Election results live coverage", SourceKind::Video, 25),
            item("Analysis: what the election results mean", SourceKind::Video, 20),
            item("Cricket highlights from yesterday", SourceKind::Video, 5),
        ];
        let trends = vec![
            item("election results", SourceKind::SearchTrend, 15),
            item("assembly election winners", SourceKind::SearchTrend, 10),
        ];

        let clusters = cross_match(&ctx, &news, &videos, &trends, &[], &[]).await;
        assert!(!clusters.is_empty());
        assert!(clusters.iter().any(|c| {
            c.keywords.iter().any(|k| k.contains("election")) && c.source_kinds.len() >= 2
        }));
    }
}
