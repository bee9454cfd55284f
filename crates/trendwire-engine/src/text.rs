//! Text normalization and keyword helpers shared across the engine.

use std::collections::HashSet;
use std::sync::LazyLock;

static STOPWORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    stop_words::get(stop_words::LANGUAGE::English)
        .into_iter()
        .collect()
});

/// Lowercase a string and replace every non-alphanumeric run with a single
/// space. The canonical form used by dedup and similarity checks.
pub(crate) fn normalize_title(input: &str) -> String {
    input
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip HTML tags from a string and normalize whitespace.
pub(crate) fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean a scraped headline: strip markup artifacts, drop leading list
/// ordinals ("1.", "12)", "#3") and bullet glyphs, collapse whitespace.
pub(crate) fn clean_headline(raw: &str) -> String {
    let collapsed = strip_html(raw);
    let trimmed = collapsed.trim_start_matches(['•', '·', '–', '-', '—', ' ']);

    let without_ordinal = strip_leading_ordinal(trimmed);
    without_ordinal.trim().to_string()
}

fn strip_leading_ordinal(text: &str) -> &str {
    let (hashed, rest) = match text.strip_prefix('#') {
        Some(r) => (true, r),
        None => (false, text),
    };
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return text;
    }
    let after_digits = &rest[digits..];
    if let Some(stripped) = after_digits.strip_prefix(['.', ')', ':']) {
        return stripped.trim_start();
    }
    // "#3 topic" carries no punctuation after the digits
    if hashed {
        return after_digits.trim_start();
    }
    text
}

/// Stopword-filtered words of length > 3, lowercased; the first five
/// distinct ones in order of appearance.
#[must_use]
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();
    for word in text.split_whitespace() {
        let cleaned: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        if cleaned.chars().count() <= 3 || STOPWORDS.contains(&cleaned) {
            continue;
        }
        if seen.insert(cleaned.clone()) {
            keywords.push(cleaned);
        }
        if keywords.len() == 5 {
            break;
        }
    }
    keywords
}

/// True if any character falls in the Devanagari block.
pub(crate) fn has_devanagari(text: &str) -> bool {
    text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c))
}

/// True if the text mixes Latin and Devanagari script — a proxy for
/// cross-lingual spread.
pub(crate) fn mixes_scripts(text: &str) -> bool {
    has_devanagari(text) && text.chars().any(|c| c.is_ascii_alphabetic())
}
