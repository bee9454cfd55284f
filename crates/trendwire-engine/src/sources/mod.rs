//! Source adapters.
//!
//! One adapter per upstream family, all sharing the same contract: try
//! strategies in fixed priority order, stop at the first that yields at
//! least one item, and degrade to the curated synthetic fallback instead of
//! erroring. Expected failures (missing credential, timeouts, 4xx/5xx,
//! malformed payloads) never escape an adapter.

pub(crate) mod curated;
mod feed;
mod news;
mod scrape;
mod social_a;
mod social_b;
mod trends;
mod video;

pub use news::fetch_news;
pub use social_a::fetch_microblog_trends;
pub use social_b::fetch_forum_trends;
pub use trends::fetch_search_trends;
pub use video::fetch_videos;
