//! News adapter: NewsData.io API → Google News RSS → trending-page scrape →
//! curated fallback.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Deserialize;

use super::curated::curated_items;
use super::feed::{parse_feed_entries, parse_feed_timestamp};
use super::scrape::{extract_candidates, is_valid_headline};
use crate::error::EngineError;
use crate::fetch::{get_json, get_text, http_client, log_strategy_failure};
use crate::scorer::headline_score;
use crate::text::normalize_title;
use crate::types::{EngineContext, SourceKind, TrendItem};

const ADAPTER: &str = "news";
const MAX_ITEMS: usize = 20;
/// News-like requests are bounded to the last 72 hours; stale server results
/// are re-filtered client-side against the same window.
const WINDOW_HOURS: i64 = 72;

/// Selector priority for the trending-page scrape strategy.
const HEADLINE_SELECTORS: &[&str] = &[
    "ol li a",
    "ul.trending-list li a",
    "div.trending a",
    "h2 a",
    "h3 a",
];

#[derive(Debug, Deserialize)]
struct NewsDataResponse {
    #[serde(default)]
    results: Vec<NewsDataArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsDataArticle {
    title: Option<String>,
    link: Option<String>,
    source_id: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Fetch trending news items.
///
/// Never errors: strategies are tried in fixed order, the first one that
/// yields at least one item wins, and exhaustion falls back to the curated
/// synthetic list.
pub async fn fetch_news(ctx: &EngineContext) -> Vec<TrendItem> {
    if let Some(api_key) = ctx.config.newsdata_api_key.clone() {
        match fetch_newsdata(ctx, &api_key).await {
            Ok(items) if !items.is_empty() => {
                tracing::debug!(adapter = ADAPTER, strategy = "newsdata_api", count = items.len(), "collected news");
                return items;
            }
            Ok(_) => tracing::debug!(adapter = ADAPTER, strategy = "newsdata_api", "no items"),
            Err(e) => log_strategy_failure(ADAPTER, "newsdata_api", &e),
        }
    } else {
        tracing::debug!(adapter = ADAPTER, "newsdata credential absent, skipping primary strategy");
    }

    match fetch_google_news_rss(ctx).await {
        Ok(items) if !items.is_empty() => {
            tracing::debug!(adapter = ADAPTER, strategy = "google_news_rss", count = items.len(), "collected news");
            return items;
        }
        Ok(_) => tracing::debug!(adapter = ADAPTER, strategy = "google_news_rss", "no items"),
        Err(e) => log_strategy_failure(ADAPTER, "google_news_rss", &e),
    }

    match scrape_trending_pages(ctx).await {
        Ok(items) if !items.is_empty() => {
            tracing::debug!(adapter = ADAPTER, strategy = "trending_scrape", count = items.len(), "collected news");
            return items;
        }
        Ok(_) => tracing::debug!(adapter = ADAPTER, strategy = "trending_scrape", "no items"),
        Err(e) => log_strategy_failure(ADAPTER, "trending_scrape", &e),
    }

    tracing::warn!(adapter = ADAPTER, "all strategies exhausted, using curated fallback");
    curated_items(SourceKind::News, Utc::now(), &mut ctx.rng())
}

/// Strategy 1: the NewsData.io latest-news API, credential-gated.
async fn fetch_newsdata(ctx: &EngineContext, api_key: &str) -> Result<Vec<TrendItem>, EngineError> {
    let client = http_client(ctx.config.request_timeout_secs, &ctx.config.user_agent)?;
    let url = format!(
        "{}?apikey={api_key}&country=in&language=en&timeframe={WINDOW_HOURS}",
        ctx.endpoints.newsdata_api
    );

    let response: NewsDataResponse = get_json(&client, &url, "newsdata").await?;
    let cutoff = Utc::now() - Duration::hours(WINDOW_HOURS);

    let items = response
        .results
        .into_iter()
        .filter_map(|article| {
            let title = article.title?.trim().to_string();
            if title.is_empty() {
                return None;
            }
            let source = article.source_id.unwrap_or_else(|| "newsdata".to_string());
            let published = article.pub_date.as_deref().and_then(parse_newsdata_timestamp);
            // Providers return stale rows despite the timeframe parameter.
            if let Some(ts) = published {
                if ts < cutoff {
                    return None;
                }
            }
            let mut item = TrendItem::new(title.clone(), &source, SourceKind::News);
            item.url = article.link;
            item.published_at = published;
            item.score = headline_score(&title, &source);
            Some(item)
        })
        .take(MAX_ITEMS)
        .collect();

    Ok(items)
}

/// Strategy 2: Google News top-stories RSS for the region.
async fn fetch_google_news_rss(ctx: &EngineContext) -> Result<Vec<TrendItem>, EngineError> {
    let client = http_client(ctx.config.request_timeout_secs, &ctx.config.user_agent)?;
    let url = format!("{}?hl=en-IN&gl=IN&ceid=IN:en", ctx.endpoints.google_news_rss);
    let body = get_text(&client, &url, "google_news").await?;

    let cutoff = Utc::now() - Duration::hours(WINDOW_HOURS);
    let items = parse_feed_entries(&body, MAX_ITEMS * 2)?
        .into_iter()
        .filter_map(|entry| {
            let published = entry.published.as_deref().and_then(parse_feed_timestamp);
            if let Some(ts) = published {
                if ts < cutoff {
                    return None;
                }
            }
            let mut item = TrendItem::new(entry.title.clone(), "google_news", SourceKind::News);
            item.url = Some(entry.link);
            item.published_at = published;
            item.score = headline_score(&entry.title, "news.google.com");
            Some(item)
        })
        .take(MAX_ITEMS)
        .collect();

    Ok(items)
}

/// Strategy 3: scrape public trending pages; the first page that yields
/// valid headlines wins.
async fn scrape_trending_pages(ctx: &EngineContext) -> Result<Vec<TrendItem>, EngineError> {
    let client = http_client(ctx.config.request_timeout_secs, &ctx.config.user_agent)?;

    for page in &ctx.endpoints.news_trending_pages {
        let body = match get_text(&client, page, "news_trending_page").await {
            Ok(body) => body,
            Err(e) => {
                log_strategy_failure(ADAPTER, "trending_scrape_page", &e);
                continue;
            }
        };

        let host = host_of(page);
        let mut seen = std::collections::HashSet::new();
        let items: Vec<TrendItem> = extract_candidates(&body, HEADLINE_SELECTORS)
            .into_iter()
            .filter(|text| is_valid_headline(text))
            .filter(|text| seen.insert(normalize_title(text)))
            .take(MAX_ITEMS)
            .map(|title| {
                let mut item = TrendItem::new(title.clone(), &host, SourceKind::News);
                item.url = Some(page.clone());
                item.score = headline_score(&title, &host);
                item
            })
            .collect();

        if !items.is_empty() {
            return Ok(items);
        }
    }

    Ok(Vec::new())
}

/// NewsData timestamps come as `YYYY-MM-DD HH:MM:SS` in UTC.
fn parse_newsdata_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn host_of(url: &str) -> String {
    url.split("://")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or(url)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newsdata_timestamp_parses() {
        let ts = parse_newsdata_timestamp("2026-08-05 12:30:00").expect("valid");
        assert_eq!(ts.to_rfc3339(), "2026-08-05T12:30:00+00:00");
        assert!(parse_newsdata_timestamp("05/08/2026").is_none());
    }

    #[test]
    fn host_extraction() {
        assert_eq!(host_of("https://www.ndtv.com/trending"), "www.ndtv.com");
        assert_eq!(host_of("not-a-url"), "not-a-url");
    }

    #[test]
    fn newsdata_response_deserializes_with_missing_fields() {
        let json = r#"{"results": [{"title": "Breaking story from Delhi", "link": null}]}"#;
        let parsed: NewsDataResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert!(parsed.results[0].source_id.is_none());
    }
}
