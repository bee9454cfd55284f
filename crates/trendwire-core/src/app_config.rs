/// Process-wide configuration, read-only after initialization.
#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// NewsData.io API key. Absent => the news adapter skips its primary strategy.
    pub newsdata_api_key: Option<String>,
    /// YouTube Data API key. Absent => the video adapter skips its primary strategy.
    pub youtube_api_key: Option<String>,
    /// Chat-completions endpoint for the optional LLM clustering path.
    pub llm_api_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub user_agent: String,
    /// Pacing delay between sequential forum community requests.
    pub forum_inter_request_delay_ms: u64,
    /// Fixed seed for synthetic-data generation. Absent => OS entropy.
    pub rng_seed: Option<u64>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field(
                "newsdata_api_key",
                &self.newsdata_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_api_url", &self.llm_api_url)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("probe_timeout_secs", &self.probe_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field(
                "forum_inter_request_delay_ms",
                &self.forum_inter_request_delay_ms,
            )
            .field("rng_seed", &self.rng_seed)
            .finish()
    }
}
