//! Video adapter: YouTube Data API search + statistics join → search RSS →
//! curated fallback.

use chrono::{Duration, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use super::curated::curated_items;
use super::feed::{parse_feed_entries, parse_feed_timestamp};
use crate::error::EngineError;
use crate::fetch::{get_json, get_text, http_client, log_strategy_failure};
use crate::scorer::headline_score;
use crate::text::has_devanagari;
use crate::types::{EngineContext, SourceKind, TrendItem};

const ADAPTER: &str = "video";
const SOURCE: &str = "youtube";
const MAX_ITEMS: usize = 15;
const SEARCH_QUERY: &str = "india trending news";
const WINDOW_HOURS: i64 = 72;
/// Final keep gate: this much engagement, or a domain keyword in the title.
const MIN_VIEWS: u64 = 100_000;

/// Off-topic categories excluded by the suitability classifier.
const UNSUITABLE_TERMS: &[&str] = &[
    "nursery",
    "rhymes",
    "cartoon",
    "kids song",
    "baby shark",
    "toy review",
];

const DOMAIN_TERMS: &[&str] = &[
    "india",
    "news",
    "election",
    "cricket",
    "bollywood",
    "modi",
    "delhi",
    "mumbai",
    "minister",
    "market",
];

const CHANNEL_PATTERNS: &[&str] = &["news", "tv", "india", "bharat", "live"];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    items: Vec<StatsItem>,
}

#[derive(Debug, Deserialize)]
struct StatsItem {
    id: String,
    statistics: Statistics,
}

/// YouTube returns counters as strings.
#[derive(Debug, Deserialize)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
    #[serde(rename = "commentCount")]
    comment_count: Option<String>,
}

/// Fetch trending videos. Same cascading contract as every adapter.
pub async fn fetch_videos(ctx: &EngineContext) -> Vec<TrendItem> {
    if let Some(api_key) = ctx.config.youtube_api_key.clone() {
        match fetch_youtube_api(ctx, &api_key).await {
            Ok(items) if !items.is_empty() => {
                tracing::debug!(adapter = ADAPTER, strategy = "data_api", count = items.len(), "collected videos");
                return items;
            }
            Ok(_) => tracing::debug!(adapter = ADAPTER, strategy = "data_api", "no items"),
            Err(e) => log_strategy_failure(ADAPTER, "data_api", &e),
        }
    } else {
        tracing::debug!(adapter = ADAPTER, "youtube credential absent, skipping primary strategy");
    }

    match fetch_search_rss(ctx).await {
        Ok(items) if !items.is_empty() => {
            tracing::debug!(adapter = ADAPTER, strategy = "search_rss", count = items.len(), "collected videos");
            return items;
        }
        Ok(_) => tracing::debug!(adapter = ADAPTER, strategy = "search_rss", "no items"),
        Err(e) => log_strategy_failure(ADAPTER, "search_rss", &e),
    }

    tracing::warn!(adapter = ADAPTER, "all strategies exhausted, using curated fallback");
    curated_items(SourceKind::Video, Utc::now(), &mut ctx.rng())
}

/// Strategy 1: region- and duration-constrained search, then a statistics
/// enrichment pass joining engagement counters onto the returned ids.
async fn fetch_youtube_api(
    ctx: &EngineContext,
    api_key: &str,
) -> Result<Vec<TrendItem>, EngineError> {
    let client = http_client(ctx.config.request_timeout_secs, &ctx.config.user_agent)?;
    let published_after = (Utc::now() - Duration::hours(WINDOW_HOURS)).to_rfc3339();
    let query = utf8_percent_encode(SEARCH_QUERY, NON_ALPHANUMERIC).to_string();

    let search_url = format!(
        "{}/search?part=snippet&q={query}&type=video&regionCode=IN&videoDuration=medium\
         &order=viewCount&publishedAfter={published_after}&maxResults=25&key={api_key}",
        ctx.endpoints.youtube_api
    );
    let search: SearchResponse = get_json(&client, &search_url, "youtube_search").await?;

    let mut candidates: Vec<(String, Snippet)> = search
        .items
        .into_iter()
        .filter_map(|item| {
            let id = item.id.video_id?;
            is_suitable(&item.snippet.title, &item.snippet.channel_title).then_some((id, item.snippet))
        })
        .collect();

    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<&str> = candidates.iter().map(|(id, _)| id.as_str()).collect();
    let stats_url = format!(
        "{}/videos?part=statistics&id={}&key={api_key}",
        ctx.endpoints.youtube_api,
        ids.join(",")
    );
    let stats: StatsResponse = get_json(&client, &stats_url, "youtube_stats").await?;

    let mut items: Vec<TrendItem> = candidates
        .drain(..)
        .map(|(id, snippet)| {
            let stat = stats.items.iter().find(|s| s.id == id);
            let views = stat.and_then(|s| parse_count(s.statistics.view_count.as_deref()));
            let likes = stat.and_then(|s| parse_count(s.statistics.like_count.as_deref()));
            let comments = stat.and_then(|s| parse_count(s.statistics.comment_count.as_deref()));

            let mut item = TrendItem::new(snippet.title.clone(), SOURCE, SourceKind::Video);
            item.url = Some(format!("https://www.youtube.com/watch?v={id}"));
            item.published_at = snippet
                .published_at
                .as_deref()
                .and_then(parse_feed_timestamp);
            item.score = headline_score(&snippet.title, SOURCE);
            if let Some(v) = views {
                item.metrics.insert("views".to_string(), v);
            }
            if let Some(l) = likes {
                item.metrics.insert("likes".to_string(), l);
            }
            if let Some(c) = comments {
                item.metrics.insert("comments".to_string(), c);
            }
            item
        })
        .filter(|item| {
            let views = item.metrics.get("views").copied().unwrap_or(0);
            views >= MIN_VIEWS || has_domain_term(&item.title)
        })
        .collect();

    items.sort_by(|a, b| {
        let va = a.metrics.get("views").copied().unwrap_or(0);
        let vb = b.metrics.get("views").copied().unwrap_or(0);
        vb.cmp(&va)
    });
    items.truncate(MAX_ITEMS);

    Ok(items)
}

/// Strategy 2: the public search feed — no statistics available, so the
/// engagement gate reduces to the keyword branch.
async fn fetch_search_rss(ctx: &EngineContext) -> Result<Vec<TrendItem>, EngineError> {
    let client = http_client(ctx.config.request_timeout_secs, &ctx.config.user_agent)?;
    let query = utf8_percent_encode(SEARCH_QUERY, NON_ALPHANUMERIC).to_string();
    let url = format!("{}?search_query={query}", ctx.endpoints.youtube_search_rss);
    let body = get_text(&client, &url, "youtube_rss").await?;

    let items = parse_feed_entries(&body, MAX_ITEMS * 2)?
        .into_iter()
        .filter(|entry| is_suitable(&entry.title, ""))
        .filter(|entry| has_domain_term(&entry.title))
        .take(MAX_ITEMS)
        .map(|entry| {
            let mut item = TrendItem::new(entry.title.clone(), SOURCE, SourceKind::Video);
            item.url = Some(entry.link);
            item.published_at = entry.published.as_deref().and_then(parse_feed_timestamp);
            item.score = headline_score(&entry.title, SOURCE);
            item
        })
        .collect();

    Ok(items)
}

/// Content-suitability classifier: drop children's-content categories and
/// require at least one domain-relevance signal (Devanagari script, a
/// domain keyword, or a news-like channel name).
fn is_suitable(title: &str, channel: &str) -> bool {
    let title_lower = title.to_lowercase();
    if UNSUITABLE_TERMS.iter().any(|t| title_lower.contains(t)) {
        return false;
    }
    let channel_lower = channel.to_lowercase();
    has_devanagari(title)
        || DOMAIN_TERMS.iter().any(|t| title_lower.contains(t))
        || CHANNEL_PATTERNS.iter().any(|p| channel_lower.contains(p))
}

fn has_domain_term(title: &str) -> bool {
    let lower = title.to_lowercase();
    DOMAIN_TERMS.iter().any(|t| lower.contains(t))
}

fn parse_count(raw: Option<&str>) -> Option<u64> {
    raw?.parse().ok()
}
