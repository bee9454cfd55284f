//! Selector-driven headline extraction for the scrape strategies.

use scraper::{Html, Selector};

use crate::text::clean_headline;

/// Boilerplate strings that disqualify a scraped candidate.
const EXCLUSION_PATTERNS: &[&str] = &[
    "subscribe",
    "advertisement",
    "sign in",
    "sign up",
    "log in",
    "newsletter",
    "cookie",
    "privacy policy",
    "terms of service",
    "download app",
    "install now",
    "follow us",
];

/// At least one of these must appear for a scraped headline to count as
/// domain-relevant.
const RELEVANCE_KEYWORDS: &[&str] = &[
    "india",
    "delhi",
    "mumbai",
    "modi",
    "minister",
    "government",
    "court",
    "police",
    "election",
    "cricket",
    "bollywood",
    "market",
    "rupee",
    "monsoon",
    "railway",
    "state",
    "film",
    "team",
    "budget",
    "school",
];

/// Extract candidate headlines from `html`, trying `selectors` in priority
/// order. The first selector that yields candidate nodes is accepted; its
/// texts are cleaned and returned. Invalid selectors are skipped.
pub(crate) fn extract_candidates(html: &str, selectors: &[&str]) -> Vec<String> {
    let document = Html::parse_document(html);

    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        let candidates: Vec<String> = document
            .select(&selector)
            .map(|node| clean_headline(&node.text().collect::<String>()))
            .filter(|text| !text.is_empty())
            .collect();
        if !candidates.is_empty() {
            return candidates;
        }
    }

    Vec::new()
}

/// Content-validity filter for scraped news-like headlines: length bounds,
/// a domain-relevance keyword, and no boilerplate patterns.
pub(crate) fn is_valid_headline(text: &str) -> bool {
    let len = text.chars().count();
    if !(15..=140).contains(&len) {
        return false;
    }
    let lower = text.to_lowercase();
    if EXCLUSION_PATTERNS.iter().any(|p| lower.contains(p)) {
        return false;
    }
    RELEVANCE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Looser validity check for short trend labels (hashtags, names): length
/// bounds and no boilerplate, but no relevance-keyword requirement — a
/// bare `#tag` is a legitimate trend.
pub(crate) fn is_valid_trend_label(text: &str) -> bool {
    let len = text.chars().count();
    if !(2..=80).contains(&len) {
        return false;
    }
    let lower = text.to_lowercase();
    if EXCLUSION_PATTERNS.iter().any(|p| lower.contains(p)) {
        return false;
    }
    // A bare rank number is a scrape artifact, not a trend.
    !text.chars().all(|c| c.is_ascii_digit())
}
