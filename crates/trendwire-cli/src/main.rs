use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trendwire_engine::{
    cross_match, detect_viral_news, fetch_all, fetch_forum_trends, fetch_microblog_trends,
    fetch_news, fetch_search_trends, fetch_videos, rank_viral, EngineContext,
};

#[derive(Debug, Parser)]
#[command(name = "trendwire")]
#[command(about = "Multi-source trend aggregation and viral validation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch all sources, cross-match, and print topic clusters
    Trends,
    /// Fetch all sources and print items ranked by score
    Rank,
    /// Run the viral validation pipeline over fresh news
    Viral,
    /// Fetch a single source
    News,
    Videos,
    Searches,
    Microblog,
    Forum,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = trendwire_core::load_app_config_from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let ctx = EngineContext::new(config);
    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "starting");

    match cli.command {
        Commands::Trends => {
            let batch = fetch_all(&ctx).await;
            let clusters = cross_match(
                &ctx,
                &batch.news,
                &batch.videos,
                &batch.search_trends,
                &batch.microblog,
                &batch.forum,
            )
            .await;
            println!("{}", serde_json::to_string_pretty(&clusters)?);
        }
        Commands::Rank => {
            let batch = fetch_all(&ctx).await;
            let ranked = rank_viral(
                &batch.news,
                &batch.videos,
                &batch.search_trends,
                &batch.microblog,
                &batch.forum,
            );
            println!("{}", serde_json::to_string_pretty(&ranked)?);
        }
        Commands::Viral => {
            let report = detect_viral_news(&ctx).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::News => print_items(&fetch_news(&ctx).await)?,
        Commands::Videos => print_items(&fetch_videos(&ctx).await)?,
        Commands::Searches => print_items(&fetch_search_trends(&ctx).await)?,
        Commands::Microblog => print_items(&fetch_microblog_trends(&ctx).await)?,
        Commands::Forum => print_items(&fetch_forum_trends(&ctx).await)?,
    }

    Ok(())
}

fn print_items(items: &[trendwire_engine::TrendItem]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(items)?);
    Ok(())
}
