//! Lexical headline scorer — the base layer every adapter scores with.
//!
//! Deterministic, no I/O. Platform adapters stack their own bonus tables on
//! top of this score; some terms deliberately appear both here and in a
//! platform table, so an adapter may count them twice.

/// Terms that historically correlate with viral spread. +10 per occurrence.
pub(crate) const VIRAL_KEYWORDS: &[&str] = &[
    "breaking",
    "viral",
    "exclusive",
    "shocking",
    "scandal",
    "exposed",
    "leaked",
    "arrested",
    "banned",
    "emergency",
    "alert",
    "crisis",
    "historic",
    "record",
    "massive",
    "controversy",
    "protest",
    "wins",
    "dies",
    "quits",
];

/// Hostname fragments of tier-1 outlets. +10 flat when the source matches.
pub(crate) const TIER1_OUTLETS: &[&str] = &[
    "ndtv",
    "timesofindia",
    "hindustantimes",
    "indianexpress",
    "thehindu",
    "indiatoday",
    "news18",
    "zeenews",
    "aajtak",
    "abplive",
];

/// Region-identity tokens. +5 flat. `india` also covers `indian` by
/// substring.
pub(crate) const REGION_TOKENS: &[&str] = &["india", "bharat", "desi"];

/// Score a headline for viral potential given the source it came from.
///
/// Starts at 0: +10 per occurrence of a viral keyword (case-insensitive
/// substring), +10 if `source` matches a tier-1 outlet fragment, +5 if the
/// text carries a region token. No upper bound at this layer; callers that
/// need a cap apply their own.
#[must_use]
pub fn headline_score(text: &str, source: &str) -> u32 {
    let text_lower = text.to_lowercase();
    let source_lower = source.to_lowercase();

    let mut score = 0u32;

    for keyword in VIRAL_KEYWORDS {
        let occurrences = text_lower.matches(keyword).count();
        score += 10 * u32::try_from(occurrences).unwrap_or(0);
    }

    if TIER1_OUTLETS
        .iter()
        .any(|outlet| source_lower.contains(outlet))
    {
        score += 10;
    }

    if REGION_TOKENS.iter().any(|token| text_lower.contains(token)) {
        score += 5;
    }

    score
}
