//! Forum adapter: per-community feeds first (most reliable in production),
//! an alternate feed host second, and the JSON listing endpoint last, gated
//! by a connectivity probe. Communities are fetched sequentially with
//! pacing delays to stay under the provider's rate limits.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::curated::curated_items;
use super::feed::{parse_feed_entries, parse_feed_timestamp};
use crate::error::EngineError;
use crate::fetch::{get_json, get_text, http_client, log_strategy_failure, probe};
use crate::scorer::headline_score;
use crate::types::{EngineContext, SourceKind, TrendItem};

const ADAPTER: &str = "forum";
const SOURCE: &str = "reddit";
const COMMUNITIES: &[&str] = &["india", "IndiaSpeaks", "unitedstatesofindia", "worldnews"];
const MAX_ITEMS: usize = 25;
const LISTING_LIMIT: usize = 25;

/// Engagement gate floors.
const VERY_HIGH_UPVOTES: u64 = 500;
const MODERATE_UPVOTES: u64 = 100;
const MIN_UPVOTE_RATIO: f64 = 0.7;
const MIN_COMMENTS: u64 = 20;

/// Terms that let a post through the gate at a lower engagement floor.
const TRENDING_TERMS: &[&str] = &[
    "viral",
    "breaking",
    "trending",
    "everyone is talking",
    "blows up",
    "megathread",
];

/// Engagement composite bonus cap (the base headline score stays uncapped).
const ENGAGEMENT_BONUS_CAP: u32 = 50;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: Option<String>,
    permalink: Option<String>,
    subreddit: Option<String>,
    #[serde(default)]
    ups: u64,
    #[serde(default)]
    upvote_ratio: f64,
    #[serde(default)]
    num_comments: u64,
    created_utc: Option<f64>,
}

/// Fetch trending forum posts. Cascade: community feeds → alternate feed
/// host → probe-gated JSON listings → curated fallback.
pub async fn fetch_forum_trends(ctx: &EngineContext) -> Vec<TrendItem> {
    let base = ctx.endpoints.forum_base.clone();
    match fetch_community_feeds(ctx, &base).await {
        Ok(items) if !items.is_empty() => {
            tracing::debug!(adapter = ADAPTER, strategy = "community_feeds", count = items.len(), "collected posts");
            return items;
        }
        Ok(_) => tracing::debug!(adapter = ADAPTER, strategy = "community_feeds", "no items"),
        Err(e) => log_strategy_failure(ADAPTER, "community_feeds", &e),
    }

    let alt = ctx.endpoints.forum_alt_base.clone();
    match fetch_community_feeds(ctx, &alt).await {
        Ok(items) if !items.is_empty() => {
            tracing::debug!(adapter = ADAPTER, strategy = "alt_feeds", count = items.len(), "collected posts");
            return items;
        }
        Ok(_) => tracing::debug!(adapter = ADAPTER, strategy = "alt_feeds", "no items"),
        Err(e) => log_strategy_failure(ADAPTER, "alt_feeds", &e),
    }

    // The JSON listing blocks unauthenticated clients most aggressively;
    // probe before spending a request per community on it.
    let probe_url = format!("{}/robots.txt", ctx.endpoints.forum_base);
    if probe(&probe_url, ctx.config.probe_timeout_secs, &ctx.config.user_agent).await {
        match fetch_json_listings(ctx).await {
            Ok(items) if !items.is_empty() => {
                tracing::debug!(adapter = ADAPTER, strategy = "json_listing", count = items.len(), "collected posts");
                return items;
            }
            Ok(_) => tracing::debug!(adapter = ADAPTER, strategy = "json_listing", "no items"),
            Err(e) => log_strategy_failure(ADAPTER, "json_listing", &e),
        }
    } else {
        tracing::debug!(adapter = ADAPTER, "connectivity probe failed, skipping json listing");
    }

    tracing::warn!(adapter = ADAPTER, "all strategies exhausted, using curated fallback");
    curated_items(SourceKind::Forum, Utc::now(), &mut ctx.rng())
}

/// Feed strategy: one request per community, sequential with pacing. Feed
/// entries carry no counters, so only the trending-lexicon branch of the
/// gate can admit them.
async fn fetch_community_feeds(
    ctx: &EngineContext,
    base: &str,
) -> Result<Vec<TrendItem>, EngineError> {
    let client = http_client(ctx.config.request_timeout_secs, &ctx.config.user_agent)?;
    let mut items = Vec::new();

    for (i, community) in COMMUNITIES.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(ctx.config.forum_inter_request_delay_ms))
                .await;
        }

        let url = format!("{base}/r/{community}/hot/.rss");
        let body = match get_text(&client, &url, "forum_feed").await {
            Ok(body) => body,
            Err(e) => {
                log_strategy_failure(ADAPTER, "community_feed", &e);
                continue;
            }
        };

        let entries = match parse_feed_entries(&body, LISTING_LIMIT) {
            Ok(entries) => entries,
            Err(e) => {
                log_strategy_failure(ADAPTER, "community_feed_parse", &e);
                continue;
            }
        };

        for entry in entries {
            if !passes_engagement_gate(0, 0.0, 0, &entry.title) {
                continue;
            }
            let mut item = TrendItem::new(entry.title.clone(), SOURCE, SourceKind::Forum);
            item.url = Some(entry.link);
            item.published_at = entry.published.as_deref().and_then(parse_feed_timestamp);
            item.score = forum_score(&entry.title, community, 0, 0.0, 0);
            item.metrics.insert("upvotes".to_string(), 0);
            item.metrics.insert("comments".to_string(), 0);
            items.push(item);
            if items.len() >= MAX_ITEMS {
                return Ok(items);
            }
        }
    }

    Ok(items)
}

/// JSON listing strategy: full engagement counters per post.
async fn fetch_json_listings(ctx: &EngineContext) -> Result<Vec<TrendItem>, EngineError> {
    let client = http_client(ctx.config.request_timeout_secs, &ctx.config.user_agent)?;
    let mut items = Vec::new();

    for (i, community) in COMMUNITIES.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(ctx.config.forum_inter_request_delay_ms))
                .await;
        }

        let url = format!(
            "{}/r/{community}/hot.json?limit={LISTING_LIMIT}",
            ctx.endpoints.forum_base
        );
        let listing: Listing = match get_json(&client, &url, "forum_listing").await {
            Ok(listing) => listing,
            Err(e) => {
                log_strategy_failure(ADAPTER, "json_listing_page", &e);
                continue;
            }
        };

        for post in listing.data.children {
            let Some(item) = to_item(post.data, community) else {
                continue;
            };
            items.push(item);
            if items.len() >= MAX_ITEMS {
                return Ok(items);
            }
        }
    }

    Ok(items)
}

fn to_item(post: PostData, community: &str) -> Option<TrendItem> {
    let title = post.title?.trim().to_string();
    if title.is_empty() {
        return None;
    }
    if !passes_engagement_gate(post.ups, post.upvote_ratio, post.num_comments, &title) {
        return None;
    }

    let community = post.subreddit.as_deref().unwrap_or(community);
    let mut item = TrendItem::new(title.clone(), SOURCE, SourceKind::Forum);
    item.url = post
        .permalink
        .map(|permalink| format!("https://reddit.com{permalink}"));
    item.published_at = post.created_utc.and_then(timestamp_from_epoch);
    item.score = forum_score(&title, community, post.ups, post.upvote_ratio, post.num_comments);
    item.metrics.insert("upvotes".to_string(), post.ups);
    item.metrics.insert("comments".to_string(), post.num_comments);
    Some(item)
}

/// The engagement gate: very high engagement, OR moderate engagement with
/// quality floors, OR a trending-lexicon term at a lower floor.
fn passes_engagement_gate(ups: u64, ratio: f64, comments: u64, title: &str) -> bool {
    if ups >= VERY_HIGH_UPVOTES {
        return true;
    }
    if ups >= MODERATE_UPVOTES && ratio >= MIN_UPVOTE_RATIO && comments >= MIN_COMMENTS {
        return true;
    }
    let lower = title.to_lowercase();
    TRENDING_TERMS.iter().any(|t| lower.contains(t))
}

/// Composite forum scorer: uncapped base headline score plus an engagement
/// bonus capped at 50.
fn forum_score(title: &str, community: &str, ups: u64, ratio: f64, comments: u64) -> u32 {
    let base = headline_score(title, "reddit.com");

    let upvote_bonus = match ups {
        10_000.. => 20,
        1_000..=9_999 => 15,
        100..=999 => 10,
        10..=99 => 5,
        _ => 0,
    };
    let comment_bonus = match comments {
        1_000.. => 10,
        100..=999 => 7,
        10..=99 => 4,
        _ => 0,
    };
    let ratio_bonus = if ratio >= 0.9 {
        8
    } else if ratio >= 0.8 {
        5
    } else if ratio >= MIN_UPVOTE_RATIO {
        3
    } else {
        0
    };
    let community_bonus = match community {
        "india" => 6,
        "IndiaSpeaks" => 5,
        "unitedstatesofindia" => 4,
        "worldnews" => 3,
        _ => 0,
    };
    // Comments per upvote: discussion-heavy posts spread further.
    #[allow(clippy::cast_precision_loss)]
    let rate = if ups > 0 {
        comments as f64 / ups as f64
    } else {
        0.0
    };
    let rate_bonus = if rate >= 0.5 {
        6
    } else if rate >= 0.2 {
        3
    } else {
        0
    };

    let engagement =
        (upvote_bonus + comment_bonus + ratio_bonus + community_bonus + rate_bonus)
            .min(ENGAGEMENT_BONUS_CAP);
    base + engagement
}

#[allow(clippy::cast_possible_truncation)]
fn timestamp_from_epoch(epoch: f64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(epoch as i64, 0)
}
