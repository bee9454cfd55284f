//! Integration tests for the viral validation pipeline using wiremock.

use chrono::{Duration, Utc};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trendwire_core::AppConfig;
use trendwire_engine::{detect_viral_news, EngineContext, SourceEndpoints};

fn test_ctx(server_uri: &str) -> EngineContext {
    let config = AppConfig {
        log_level: "info".to_string(),
        newsdata_api_key: Some("nd-key".to_string()),
        youtube_api_key: None,
        llm_api_url: None,
        llm_api_key: None,
        request_timeout_secs: 5,
        probe_timeout_secs: 2,
        user_agent: "trendwire-test/0.1".to_string(),
        forum_inter_request_delay_ms: 0,
        rng_seed: Some(11),
    };
    let endpoints = SourceEndpoints {
        newsdata_api: format!("{server_uri}/newsdata"),
        google_news_rss: format!("{server_uri}/gnews/rss"),
        news_trending_pages: vec![format!("{server_uri}/trending-a")],
        youtube_api: format!("{server_uri}/yt"),
        youtube_search_rss: format!("{server_uri}/yt-rss"),
        daily_trends_api: format!("{server_uri}/dailytrends"),
        trends_aggregator_page: format!("{server_uri}/aggregator"),
        regional_trending_pages: vec![format!("{server_uri}/regional-a")],
        microblog_trend_pages: vec![format!("{server_uri}/mb-a")],
        forum_base: format!("{server_uri}/forum"),
        forum_alt_base: format!("{server_uri}/forum-alt"),
    };
    EngineContext::with_endpoints(config, endpoints)
}

fn newsdata_body(titles: &[&str]) -> serde_json::Value {
    let stamp = (Utc::now() - Duration::hours(1))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let results: Vec<serde_json::Value> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            serde_json::json!({
                "title": title,
                "link": format!("https://example.com/{i}"),
                "source_id": "ndtv",
                "pubDate": stamp
            })
        })
        .collect();
    serde_json::json!({ "results": results })
}

#[tokio::test]
async fn corroborated_news_item_is_decided_viral_via_the_forum_branch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/newsdata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&newsdata_body(&[
            "Breaking scandal rocks parliament session in India",
        ])))
        .mount(&server)
        .await;

    // Forum search returns two well-engaged posts: post_count=2,
    // total_upvotes=90 clears the forum decision floor (>=1 post, >=30 ups).
    let search = serde_json::json!({
        "data": {"children": [
            {"data": {"ups": 50, "upvote_ratio": 0.9, "num_comments": 40}},
            {"data": {"ups": 40, "upvote_ratio": 0.8, "num_comments": 25}}
        ]}
    });
    Mock::given(method("GET"))
        .and(path_regex(r"^/forum/r/[^/]+/search\.json$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&search))
        .mount(&server)
        .await;

    let ctx = test_ctx(&server.uri());
    let report = detect_viral_news(&ctx).await.expect("pipeline should run");

    assert_eq!(report.total_news, 1);
    assert_eq!(report.viral_news, 1);
    let assessed = &report.items[0];
    assert!(assessed.assessment.is_viral);
    assert!(assessed.assessment.viral_score <= 100);
    assert!(assessed.assessment.forum.post_count >= 2);
    assert!(assessed.assessment.evidence_count > 0);
    assert!(!assessed.assessment.microblog.sample_posts.is_empty());
}

#[tokio::test]
async fn uncorroborated_news_item_is_not_viral_when_social_is_quiet() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/newsdata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&newsdata_body(&[
            "Quiet municipal water supply notice",
        ])))
        .mount(&server)
        .await;

    let empty = serde_json::json!({"data": {"children": []}});
    Mock::given(method("GET"))
        .and(path_regex(r"^/forum/r/[^/]+/search\.json$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&empty))
        .mount(&server)
        .await;

    let ctx = test_ctx(&server.uri());
    let report = detect_viral_news(&ctx).await.expect("pipeline should run");

    assert_eq!(report.viral_news, 0);
    let assessment = &report.items[0].assessment;
    assert!(!assessment.is_viral);
    assert_eq!(assessment.forum.post_count, 0);
    // The quiet title gets no lexicon lift, so its sample impressions stay
    // under the decision floor even though the base post count exceeds 10.
    assert!(assessment.microblog.post_count >= 20);
    assert!(assessment.microblog.avg_impressions < 150);
}

#[tokio::test]
async fn only_the_top_five_candidates_are_evaluated() {
    let server = MockServer::start().await;

    let titles: Vec<String> = (0..8)
        .map(|i| format!("Election update number {i} from Delhi today"))
        .collect();
    let title_refs: Vec<&str> = titles.iter().map(String::as_str).collect();

    Mock::given(method("GET"))
        .and(path("/newsdata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&newsdata_body(&title_refs)))
        .mount(&server)
        .await;

    let empty = serde_json::json!({"data": {"children": []}});
    Mock::given(method("GET"))
        .and(path_regex(r"^/forum/r/[^/]+/search\.json$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&empty))
        .mount(&server)
        .await;

    let ctx = test_ctx(&server.uri());
    let report = detect_viral_news(&ctx).await.expect("pipeline should run");

    assert_eq!(report.total_news, 8);
    assert_eq!(report.items.len(), 5, "social call volume is bounded to the top five");
}

#[tokio::test]
async fn forum_search_failures_are_absorbed_not_propagated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/newsdata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&newsdata_body(&[
            "Breaking viral story from Mumbai",
        ])))
        .mount(&server)
        .await;
    // No search mock: every community search 404s.

    let ctx = test_ctx(&server.uri());
    let report = detect_viral_news(&ctx).await.expect("must not error");

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].assessment.forum.post_count, 0);
}
