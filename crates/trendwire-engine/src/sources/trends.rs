//! Search-trend adapter: official daily-trends endpoint → aggregator
//! scrape → regional trending sections → microblog fallback → curated.

use chrono::Utc;
use serde::Deserialize;

use super::curated::curated_items;
use super::scrape::{extract_candidates, is_valid_trend_label};
use super::social_a;
use crate::error::EngineError;
use crate::fetch::{get_text, http_client, log_strategy_failure};
use crate::scorer::headline_score;
use crate::text::normalize_title;
use crate::types::{EngineContext, SourceKind, TrendItem};

const ADAPTER: &str = "search_trend";
const SOURCE: &str = "google_trends";
const MAX_ITEMS: usize = 20;

/// The daily-trends endpoint prefixes its JSON with this anti-hijacking
/// marker; strip it before parsing.
const ANTI_JSON_PREFIX: &str = ")]}',";

const AGGREGATOR_SELECTORS: &[&str] = &[
    "ol.trend-card__list li a",
    ".trend-card li a",
    "ol li a",
    "h3 a",
];

#[derive(Debug, Deserialize)]
struct DailyTrendsResponse {
    default: DailyTrendsDefault,
}

#[derive(Debug, Deserialize)]
struct DailyTrendsDefault {
    #[serde(rename = "trendingSearchesDays", default)]
    days: Vec<TrendingDay>,
}

#[derive(Debug, Deserialize)]
struct TrendingDay {
    #[serde(rename = "trendingSearches", default)]
    searches: Vec<TrendingSearch>,
}

#[derive(Debug, Deserialize)]
struct TrendingSearch {
    title: TrendTitle,
    #[serde(rename = "formattedTraffic")]
    formatted_traffic: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrendTitle {
    query: String,
}

/// Fetch trending searches. Same cascading contract as every adapter.
pub async fn fetch_search_trends(ctx: &EngineContext) -> Vec<TrendItem> {
    match fetch_daily_trends(ctx).await {
        Ok(items) if !items.is_empty() => {
            tracing::debug!(adapter = ADAPTER, strategy = "daily_trends_api", count = items.len(), "collected trends");
            return items;
        }
        Ok(_) => tracing::debug!(adapter = ADAPTER, strategy = "daily_trends_api", "no items"),
        Err(e) => log_strategy_failure(ADAPTER, "daily_trends_api", &e),
    }

    match scrape_aggregator(ctx).await {
        Ok(items) if !items.is_empty() => {
            tracing::debug!(adapter = ADAPTER, strategy = "aggregator_scrape", count = items.len(), "collected trends");
            return items;
        }
        Ok(_) => tracing::debug!(adapter = ADAPTER, strategy = "aggregator_scrape", "no items"),
        Err(e) => log_strategy_failure(ADAPTER, "aggregator_scrape", &e),
    }

    match scrape_regional_sections(ctx).await {
        Ok(items) if !items.is_empty() => {
            tracing::debug!(adapter = ADAPTER, strategy = "regional_scrape", count = items.len(), "collected trends");
            return items;
        }
        Ok(_) => tracing::debug!(adapter = ADAPTER, strategy = "regional_scrape", "no items"),
        Err(e) => log_strategy_failure(ADAPTER, "regional_scrape", &e),
    }

    // Social trend lists still reflect what people search for.
    match social_a::scrape_trend_pages(ctx).await {
        Ok(items) if !items.is_empty() => {
            let relabeled: Vec<TrendItem> = items
                .into_iter()
                .map(|item| {
                    let mut relabeled = TrendItem::new(
                        item.title.clone(),
                        &item.source_name,
                        SourceKind::SearchTrend,
                    );
                    relabeled.url = item.url;
                    relabeled.score = item.score;
                    relabeled
                })
                .collect();
            tracing::debug!(adapter = ADAPTER, strategy = "social_fallback", count = relabeled.len(), "collected trends");
            return relabeled;
        }
        Ok(_) => tracing::debug!(adapter = ADAPTER, strategy = "social_fallback", "no items"),
        Err(e) => log_strategy_failure(ADAPTER, "social_fallback", &e),
    }

    tracing::warn!(adapter = ADAPTER, "all strategies exhausted, using curated fallback");
    curated_items(SourceKind::SearchTrend, Utc::now(), &mut ctx.rng())
}

/// Strategy 1: the official daily-trends endpoint.
async fn fetch_daily_trends(ctx: &EngineContext) -> Result<Vec<TrendItem>, EngineError> {
    let client = http_client(ctx.config.request_timeout_secs, &ctx.config.user_agent)?;
    let url = format!("{}?geo=IN", ctx.endpoints.daily_trends_api);
    let body = get_text(&client, &url, SOURCE).await?;

    let json = body.strip_prefix(ANTI_JSON_PREFIX).unwrap_or(&body);
    let response: DailyTrendsResponse =
        serde_json::from_str(json.trim_start()).map_err(|e| EngineError::Deserialize {
            context: SOURCE.to_string(),
            source: e,
        })?;

    let items = response
        .default
        .days
        .into_iter()
        .flat_map(|day| day.searches)
        .map(|search| {
            let mut item = TrendItem::new(search.title.query.clone(), SOURCE, SourceKind::SearchTrend);
            item.score = headline_score(&search.title.query, SOURCE);
            if let Some(traffic) = search.formatted_traffic.as_deref().and_then(parse_traffic) {
                item.metrics.insert("searches".to_string(), traffic);
            }
            item
        })
        .take(MAX_ITEMS)
        .collect();

    Ok(items)
}

/// Strategy 2: one aggregator page.
async fn scrape_aggregator(ctx: &EngineContext) -> Result<Vec<TrendItem>, EngineError> {
    let client = http_client(ctx.config.request_timeout_secs, &ctx.config.user_agent)?;
    let body = get_text(&client, &ctx.endpoints.trends_aggregator_page, "trends_aggregator").await?;
    Ok(candidates_to_items(
        &body,
        &ctx.endpoints.trends_aggregator_page,
    ))
}

/// Strategy 3: regional news "trending" sections, first page with items wins.
async fn scrape_regional_sections(ctx: &EngineContext) -> Result<Vec<TrendItem>, EngineError> {
    let client = http_client(ctx.config.request_timeout_secs, &ctx.config.user_agent)?;

    for page in &ctx.endpoints.regional_trending_pages {
        match get_text(&client, page, "regional_trending").await {
            Ok(body) => {
                let items = candidates_to_items(&body, page);
                if !items.is_empty() {
                    return Ok(items);
                }
            }
            Err(e) => log_strategy_failure(ADAPTER, "regional_page", &e),
        }
    }

    Ok(Vec::new())
}

fn candidates_to_items(html: &str, page: &str) -> Vec<TrendItem> {
    let host = page
        .split("://")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or(page)
        .to_string();

    let mut seen = std::collections::HashSet::new();
    extract_candidates(html, AGGREGATOR_SELECTORS)
        .into_iter()
        .filter(|text| is_valid_trend_label(text))
        .filter(|text| seen.insert(normalize_title(text)))
        .take(MAX_ITEMS)
        .map(|title| {
            let mut item = TrendItem::new(title.clone(), &host, SourceKind::SearchTrend);
            item.url = Some(page.to_string());
            item.score = headline_score(&title, &host);
            item
        })
        .collect()
}

/// `"200K+"` → 200000, `"1M+"` → 1000000, `"5,000+"` → 5000.
fn parse_traffic(raw: &str) -> Option<u64> {
    let cleaned = raw.trim().trim_end_matches('+').replace(',', "");
    if let Some(thousands) = cleaned.strip_suffix(['K', 'k']) {
        return thousands.parse::<u64>().ok().map(|n| n * 1_000);
    }
    if let Some(millions) = cleaned.strip_suffix(['M', 'm']) {
        return millions.parse::<u64>().ok().map(|n| n * 1_000_000);
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traffic_suffixes_parse() {
        assert_eq!(parse_traffic("200K+"), Some(200_000));
        assert_eq!(parse_traffic("1M+"), Some(1_000_000));
        assert_eq!(parse_traffic("5,000+"), Some(5_000));
        assert_eq!(parse_traffic("n/a"), None);
    }

    #[test]
    fn daily_trends_body_parses_after_prefix_strip() {
        let body = format!(
            "{ANTI_JSON_PREFIX}\n{}",
            r#"{"default": {"trendingSearchesDays": [{"trendingSearches": [
                {"title": {"query": "election results"}, "formattedTraffic": "500K+"}
            ]}]}}"#
        );
        let json = body.strip_prefix(ANTI_JSON_PREFIX).unwrap();
        let parsed: DailyTrendsResponse = serde_json::from_str(json.trim_start()).unwrap();
        assert_eq!(parsed.default.days[0].searches[0].title.query, "election results");
    }
}
