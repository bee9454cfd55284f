//! Microblog adapter: public trend-list pages scraped in priority order,
//! scored by a platform scorer layered on the headline scorer.

use chrono::Utc;

use super::curated::curated_items;
use super::scrape::{extract_candidates, is_valid_trend_label};
use crate::error::EngineError;
use crate::fetch::{get_text, http_client, log_strategy_failure};
use crate::scorer::{headline_score, VIRAL_KEYWORDS};
use crate::text::{mixes_scripts, normalize_title};
use crate::types::{EngineContext, SourceKind, TrendItem};

const ADAPTER: &str = "microblog";
const MAX_ITEMS: usize = 20;
/// Candidates below this score are dropped unless they match the broader
/// viral lexicon.
const SCORE_FLOOR: u32 = 25;

/// Selector priority for trend-list pages. The two production targets use
/// different markup; the first selector that yields nodes wins per page.
const TREND_SELECTORS: &[&str] = &[
    "ol.trend-card__list li a",
    ".trend-card li a",
    "table.ranking td.main a",
    ".trend-name a",
    "ol li a",
];

/// Platform bonus tables, stacked on top of the base headline score. Terms
/// shared with the base viral-keyword list count twice on this platform.
const BREAKING_TERMS: &[&str] = &["breaking", "live", "just in", "announced"];
const SENSATIONAL_TERMS: &[&str] = &["shocking", "slams", "exposed", "viral", "outrage"];
const POLITICAL_FIGURES: &[&str] = &[
    "modi",
    "rahul gandhi",
    "amit shah",
    "kejriwal",
    "yogi",
    "mamata",
    "nitish",
];
const CRIME_TERMS: &[&str] = &["murder", "arrest", "scam", "raid", "fraud", "custody"];
const ENTERTAINMENT_TERMS: &[&str] = &[
    "bollywood",
    "box office",
    "trailer",
    "ipl",
    "cricket",
    "concert",
];

/// Fetch trending microblog topics. Two independent scrape targets are
/// tried in order; exhaustion falls back to the curated list.
pub async fn fetch_microblog_trends(ctx: &EngineContext) -> Vec<TrendItem> {
    match scrape_trend_pages(ctx).await {
        Ok(items) if !items.is_empty() => return items,
        Ok(_) => tracing::debug!(adapter = ADAPTER, "no items from any trend page"),
        Err(e) => log_strategy_failure(ADAPTER, "trend_pages", &e),
    }

    tracing::warn!(adapter = ADAPTER, "all strategies exhausted, using curated fallback");
    curated_items(SourceKind::Microblog, Utc::now(), &mut ctx.rng())
}

/// Scrape the configured trend-list pages in priority order and return the
/// first page's surviving candidates. Shared with the search-trend adapter,
/// which uses this as its social fallback.
pub(crate) async fn scrape_trend_pages(ctx: &EngineContext) -> Result<Vec<TrendItem>, EngineError> {
    let client = http_client(ctx.config.request_timeout_secs, &ctx.config.user_agent)?;

    for page in &ctx.endpoints.microblog_trend_pages {
        let body = match get_text(&client, page, "microblog_trend_page").await {
            Ok(body) => body,
            Err(e) => {
                log_strategy_failure(ADAPTER, "trend_page", &e);
                continue;
            }
        };

        let host = host_of(page);
        let mut seen = std::collections::HashSet::new();
        let items: Vec<TrendItem> = extract_candidates(&body, TREND_SELECTORS)
            .into_iter()
            .filter(|text| is_valid_trend_label(text))
            .filter(|text| seen.insert(normalize_title(text)))
            .filter_map(|title| {
                let score = trend_score(&title, &host);
                if score < SCORE_FLOOR && !matches_viral_lexicon(&title) {
                    return None;
                }
                let mut item = TrendItem::new(title, &host, SourceKind::Microblog);
                item.url = Some(page.clone());
                item.score = score;
                Some(item)
            })
            .take(MAX_ITEMS)
            .collect();

        if !items.is_empty() {
            tracing::debug!(adapter = ADAPTER, page = page.as_str(), count = items.len(), "collected trends");
            return Ok(items);
        }
    }

    Ok(Vec::new())
}

/// Platform scorer: the base headline score plus trend-specific bonuses.
fn trend_score(title: &str, source: &str) -> u32 {
    let lower = title.to_lowercase();
    let mut score = headline_score(title, source);

    if title.starts_with('#') || title.starts_with('@') {
        score += 10;
    }
    if BREAKING_TERMS.iter().any(|t| lower.contains(t)) {
        score += 15;
    }
    if SENSATIONAL_TERMS.iter().any(|t| lower.contains(t)) {
        score += 10;
    }
    if POLITICAL_FIGURES.iter().any(|t| lower.contains(t)) {
        score += 10;
    }
    if CRIME_TERMS.iter().any(|t| lower.contains(t)) {
        score += 10;
    }
    if ENTERTAINMENT_TERMS.iter().any(|t| lower.contains(t)) {
        score += 10;
    }
    // Two scripts in one trend reads as cross-lingual spread.
    if mixes_scripts(title) {
        score += 10;
    }

    score
}

fn matches_viral_lexicon(title: &str) -> bool {
    let lower = title.to_lowercase();
    VIRAL_KEYWORDS.iter().any(|k| lower.contains(k))
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
    fn hashtag_prefix_earns_a_bonus() {
        let plain = trend_score("INDvsAUS final", "trends24.in");
        let tagged = trend_score("#INDvsAUS final", "trends24.in");
        assert_eq!(tagged, plain + 10);
    }

    #[test]
    fn breaking_terms_stack_with_base_scorer() {
        // "breaking" is in both the base viral list (+10) and the platform
        // breaking list (+15) — counted twice on this platform.
        let score = trend_score("breaking update", "trends24.in");
        assert_eq!(score, 25);
    }

    #[test]
    fn mixed_script_trend_gets_cross_lingual_bonus() {
        let latin = trend_score("election results", "trends24.in");
        let mixed = trend_score("election results चुनाव", "trends24.in");
        assert_eq!(mixed, latin + 10);
    }

    #[test]
    fn political_and_crime_terms_add_up() {
        let score = trend_score("Modi orders arrest in scam case", "getdaytrends.com");
        // political (+10) + crime (+10, matched once per table) + base
        // "arrested" not matched ("arrest" is platform-table only)
        assert!(score >= 20, "got {score}");
    }
}
