//! Shared HTTP plumbing for the source adapters.
//!
//! Every adapter strategy goes through these helpers so status handling is
//! uniform: 429 becomes [`EngineError::RateLimited`] (logged distinctly by
//! the caller), any other non-2xx becomes [`EngineError::UnexpectedStatus`].

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::EngineError;

/// Build a client with the adapter-standard timeout and user agent.
///
/// # Errors
///
/// Returns [`EngineError::Http`] if the underlying `reqwest::Client`
/// cannot be constructed.
pub(crate) fn http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, EngineError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(5))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// GET a URL and return the response body as text.
///
/// # Errors
///
/// - [`EngineError::RateLimited`] on HTTP 429.
/// - [`EngineError::UnexpectedStatus`] on any other non-2xx status.
/// - [`EngineError::Http`] on network failure.
pub(crate) async fn get_text(
    client: &Client,
    url: &str,
    source: &str,
) -> Result<String, EngineError> {
    let response = client.get(url).send().await?;
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(EngineError::RateLimited {
            source: source.to_string(),
        });
    }
    if !status.is_success() {
        return Err(EngineError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response.text().await?)
}

/// GET a URL and deserialize the JSON body.
///
/// # Errors
///
/// Same as [`get_text`], plus [`EngineError::Deserialize`] when the body
/// does not match the expected shape.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    source: &str,
) -> Result<T, EngineError> {
    let body = get_text(client, url, source).await?;
    serde_json::from_str(&body).map_err(|e| EngineError::Deserialize {
        context: source.to_string(),
        source: e,
    })
}

/// POST a JSON body with bearer auth and deserialize the JSON response.
///
/// # Errors
///
/// Same taxonomy as [`get_json`].
pub(crate) async fn get_json_post<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    api_key: &str,
    body: &serde_json::Value,
    source: &str,
) -> Result<T, EngineError> {
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await?;
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(EngineError::RateLimited {
            source: source.to_string(),
        });
    }
    if !status.is_success() {
        return Err(EngineError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| EngineError::Deserialize {
        context: source.to_string(),
        source: e,
    })
}

/// Cheap connectivity probe: true when the URL answers with any 2xx within
/// the probe timeout. Gates the least production-reliable strategies.
pub(crate) async fn probe(url: &str, timeout_secs: u64, user_agent: &str) -> bool {
    let Ok(client) = http_client(timeout_secs, user_agent) else {
        return false;
    };
    match client.get(url).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}

/// Log a strategy failure the uniform way: rate limits are called out
/// distinctly, everything else is a plain strategy failure.
pub(crate) fn log_strategy_failure(adapter: &str, strategy: &str, err: &EngineError) {
    if matches!(err, EngineError::RateLimited { .. }) {
        tracing::warn!(adapter, strategy, rate_limited = true, error = %err, "strategy rate limited");
    } else {
        tracing::warn!(adapter, strategy, error = %err, "strategy failed");
    }
}
