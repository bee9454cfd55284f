//! Deduplication and cross-source topic clustering.
//!
//! The similarity test is deliberately coarse and lexical: a normalized
//! substring relation, or two shared long words. Per-call batches are small
//! (tens of items), so the O(n²) absorption pass is the hot path and stays
//! acceptable.

use std::collections::{BTreeSet, HashSet};

use serde::Deserialize;

use crate::error::EngineError;
use crate::fetch::{get_json_post, http_client};
use crate::text::{extract_keywords, normalize_title};
use crate::types::{EngineContext, SourceKind, TopicCluster, TrendItem};

/// Key-prefix length for within-source dedup.
const DEDUP_PREFIX_CHARS: usize = 40;
/// Two items must share at least this many long words to be similar.
const MIN_SHARED_WORDS: usize = 2;
/// Shared words shorter than this do not count.
const MIN_WORD_LEN: usize = 4;
/// LLM-proposed clusters below this confidence are discarded.
const LLM_MIN_CONFIDENCE: f32 = 0.7;

/// Collapse near-duplicates within one source: items whose normalized
/// titles match exactly, or on the first 40 characters, keep only the
/// first occurrence.
#[must_use]
pub fn dedup_items(items: &[TrendItem]) -> Vec<TrendItem> {
    let mut seen: HashSet<String> = HashSet::new();
    items
        .iter()
        .filter(|item| {
            let key: String = normalize_title(&item.title)
                .chars()
                .take(DEDUP_PREFIX_CHARS)
                .collect();
            seen.insert(key)
        })
        .cloned()
        .collect()
}

/// Coarse lexical similarity: one normalized title contains the other, or
/// they share at least two words longer than three characters.
#[must_use]
pub fn titles_similar(a: &str, b: &str) -> bool {
    let na = normalize_title(a);
    let nb = normalize_title(b);
    if na.is_empty() || nb.is_empty() {
        return false;
    }
    if na.contains(&nb) || nb.contains(&na) {
        return true;
    }

    let words_a: HashSet<&str> = na
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .collect();
    let shared = nb
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .filter(|w| words_a.contains(w))
        .collect::<HashSet<&str>>()
        .len();
    shared >= MIN_SHARED_WORDS
}

/// Lexical clustering: fixed-order absorption. Each unclustered item scans
/// all later unclustered items and absorbs the similar ones; a cluster is
/// emitted only when at least two distinct source kinds corroborate it.
#[must_use]
pub fn lexical_clusters(items: &[TrendItem]) -> Vec<TopicCluster> {
    let mut used = vec![false; items.len()];
    let mut clusters = Vec::new();

    for i in 0..items.len() {
        if used[i] {
            continue;
        }
        used[i] = true;

        let mut members = vec![items[i].clone()];
        let mut kinds: BTreeSet<SourceKind> = BTreeSet::new();
        kinds.insert(items[i].kind);

        for j in (i + 1)..items.len() {
            if used[j] {
                continue;
            }
            if titles_similar(&items[i].title, &items[j].title) {
                used[j] = true;
                kinds.insert(items[j].kind);
                members.push(items[j].clone());
            }
        }

        if kinds.len() < 2 {
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let confidence = (0.5 + 0.1 * kinds.len() as f32).min(0.9);
        clusters.push(TopicCluster {
            representative_title: items[i].title.clone(),
            keywords: extract_keywords(&items[i].title),
            source_kinds: kinds,
            items: members,
            confidence,
        });
    }

    clusters
}

/// Clustering strategy, selected at configuration time. The LLM path is an
/// optional quality upgrade; any failure falls back to the lexical pass.
pub enum Clusterer {
    Lexical,
    Llm(LlmClusterer),
}

impl Clusterer {
    /// Pick the LLM path only when both its endpoint and key are configured.
    #[must_use]
    pub fn from_context(ctx: &EngineContext) -> Self {
        match (&ctx.config.llm_api_url, &ctx.config.llm_api_key) {
            (Some(url), Some(key)) => Clusterer::Llm(LlmClusterer {
                api_url: url.clone(),
                api_key: key.clone(),
                timeout_secs: ctx.config.request_timeout_secs,
                user_agent: ctx.config.user_agent.clone(),
            }),
            _ => Clusterer::Lexical,
        }
    }

    /// Cluster a batch. Never fails: the lexical pass is the guaranteed
    /// floor for correctness.
    pub async fn cluster(&self, items: &[TrendItem]) -> Vec<TopicCluster> {
        match self {
            Clusterer::Lexical => lexical_clusters(items),
            Clusterer::Llm(llm) => match llm.cluster(items).await {
                Ok(clusters) if !clusters.is_empty() => clusters,
                Ok(_) => {
                    tracing::debug!("llm clustering returned nothing usable, using lexical pass");
                    lexical_clusters(items)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "llm clustering failed, using lexical pass");
                    lexical_clusters(items)
                }
            },
        }
    }
}

/// Chat-completions client for the optional clustering path.
pub struct LlmClusterer {
    api_url: String,
    api_key: String,
    timeout_secs: u64,
    user_agent: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ProposedCluster {
    topic: String,
    #[serde(default)]
    sources: Vec<String>,
    confidence: f32,
    #[serde(default)]
    related: Vec<usize>,
    #[serde(default)]
    keywords: Vec<String>,
}

impl LlmClusterer {
    /// Ask the model to group the batch. The request enumerates items as
    /// `id|kind|title` lines; the response must be a JSON array of cluster
    /// objects.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] on HTTP failure or an unparsable response;
    /// the caller falls back to the lexical pass in every such case.
    async fn cluster(&self, items: &[TrendItem]) -> Result<Vec<TopicCluster>, EngineError> {
        let listing: String = items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{i}|{}|{}\n", item.kind, item.title))
            .collect();
        let prompt = format!(
            "Group these trending items into topics covered by at least two \
             distinct sources. Respond with only a JSON array of objects \
             {{\"topic\", \"sources\", \"confidence\", \"related\", \"keywords\"}} \
             where related lists item ids and confidence is at least 0.7.\n{listing}"
        );

        let client = http_client(self.timeout_secs, &self.user_agent)?;
        let body = serde_json::json!({
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.2,
        });
        let response: ChatResponse =
            get_json_post(&client, &self.api_url, &self.api_key, &body, "llm_clusterer").await?;

        let content = response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| EngineError::Clustering("empty chat response".to_string()))?;

        let proposed: Vec<ProposedCluster> =
            serde_json::from_str(content.trim()).map_err(|e| EngineError::Deserialize {
                context: "llm_clusterer".to_string(),
                source: e,
            })?;

        Ok(proposed
            .into_iter()
            .filter(|p| p.confidence >= LLM_MIN_CONFIDENCE)
            .filter_map(|p| to_cluster(p, items))
            .collect())
    }
}

/// Convert one model proposal into a [`TopicCluster`], re-enforcing the
/// two-source invariant on whatever the model claimed.
fn to_cluster(proposed: ProposedCluster, items: &[TrendItem]) -> Option<TopicCluster> {
    let members: Vec<TrendItem> = proposed
        .related
        .iter()
        .filter_map(|&id| items.get(id).cloned())
        .collect();

    let mut kinds: BTreeSet<SourceKind> = members.iter().map(|m| m.kind).collect();
    // The model also names sources directly; trust them only as a union
    // with what the member items prove.
    for name in &proposed.sources {
        if let Some(kind) = parse_kind(name) {
            kinds.insert(kind);
        }
    }
    if kinds.len() < 2 || members.is_empty() {
        return None;
    }

    let keywords = if proposed.keywords.is_empty() {
        extract_keywords(&proposed.topic)
    } else {
        proposed.keywords
    };

    Some(TopicCluster {
        representative_title: proposed.topic,
        source_kinds: kinds,
        items: members,
        confidence: proposed.confidence.min(1.0),
        keywords,
    })
}

fn parse_kind(name: &str) -> Option<SourceKind> {
    match name.to_lowercase().as_str() {
        "news" => Some(SourceKind::News),
        "video" => Some(SourceKind::Video),
        "search_trend" | "search" => Some(SourceKind::SearchTrend),
        "microblog" => Some(SourceKind::Microblog),
        "forum" => Some(SourceKind::Forum),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, kind: SourceKind) -> TrendItem {
        TrendItem::new(title, "test", kind)
    }

    #[test]
    fn similar_matches_shared_long_words() {
        assert!(titles_similar(
            "Modi announces new scheme",
            "PM Modi unveils new scheme"
        ));
    }

    #[test]
    fn similar_rejects_unrelated_titles() {
        assert!(!titles_similar("Cricket match today", "Stock market crashes"));
    }

    #[test]
    fn similar_matches_substring_relation() {
        assert!(titles_similar("Election results", "Election results declared today"));
    }

    #[test]
    fn dedup_keeps_exactly_one_of_identical_normalized_titles() {
        let items = vec![
            item("Election Results Declared!", SourceKind::News),
            item("election results declared", SourceKind::Video),
        ];
        assert_eq!(dedup_items(&items).len(), 1);
    }

    #[test]
    fn dedup_matches_on_long_key_prefix() {
        let a = "Supreme court delivers landmark judgment on electoral process reform";
        let b = "Supreme court delivers landmark judgment on electoral process changes";
        let items = vec![item(a, SourceKind::News), item(b, SourceKind::News)];
        assert_eq!(dedup_items(&items).len(), 1);
    }

    #[test]
    fn clusters_require_two_distinct_source_kinds() {
        let items = vec![
            item("Election results declared", SourceKind::News),
            item("Election results live updates", SourceKind::News),
        ];
        assert!(lexical_clusters(&items).is_empty());
    }

    #[test]
    fn cross_source_corroboration_emits_a_cluster() {
        let items = vec![
            item("Election results declared in state polls", SourceKind::News),
            item("Watch election results coverage", SourceKind::Video),
            item("election results", SourceKind::SearchTrend),
            item("Unrelated cricket highlights", SourceKind::Video),
        ];
        let clusters = lexical_clusters(&items);
        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert!(cluster.source_kinds.len() >= 2);
        assert!(cluster.keywords.iter().any(|k| k == "election"));
        assert_eq!(cluster.items.len(), 3);
    }

    #[test]
    fn confidence_grows_with_kinds_and_caps() {
        let items = vec![
            item("budget session parliament debate", SourceKind::News),
            item("budget session parliament live", SourceKind::Video),
            item("budget session parliament updates", SourceKind::SearchTrend),
            item("budget session parliament thread", SourceKind::Forum),
            item("budget session parliament trend", SourceKind::Microblog),
        ];
        let clusters = lexical_clusters(&items);
        assert_eq!(clusters.len(), 1);
        assert!((clusters[0].confidence - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn llm_proposal_below_two_kinds_is_rejected() {
        let items = vec![
            item("Election results", SourceKind::News),
            item("Election coverage", SourceKind::News),
        ];
        let proposal = ProposedCluster {
            topic: "Elections".to_string(),
            sources: vec!["news".to_string()],
            confidence: 0.9,
            related: vec![0, 1],
            keywords: vec![],
        };
        assert!(to_cluster(proposal, &items).is_none());
    }

    #[test]
    fn llm_proposal_maps_related_ids_to_items() {
        let items = vec![
            item("Election results", SourceKind::News),
            item("Election results stream", SourceKind::Video),
        ];
        let proposal = ProposedCluster {
            topic: "Election results".to_string(),
            sources: vec![],
            confidence: 0.8,
            related: vec![0, 1],
            keywords: vec!["election".to_string()],
        };
        let cluster = to_cluster(proposal, &items).expect("two kinds present");
        assert_eq!(cluster.items.len(), 2);
        assert_eq!(cluster.source_kinds.len(), 2);
    }
}
