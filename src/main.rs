use anyhow::{Context, Result};
use clap::Parser;
use seattle_showtimes::config::Config;
use seattle_showtimes::date_manager::DateManager;
use seattle_showtimes::image_cache::ImageCache;
use seattle_showtimes::pipeline::aggregate;
use seattle_showtimes::registry::ScraperRegistry;
use seattle_showtimes::scrape_client::{Fetch, ScrapeClient};
use seattle_showtimes::showtime_utils::{
    filter_for_next_days, filter_from_today, group_by_date, group_by_movie,
    group_by_movie_and_theater, sort_chronologically,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Scrape Seattle theater showtimes into one JSON list.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Only run the scrapers for these theater ids, e.g. `beacon,siff`
    #[arg(long, value_delimiter = ',')]
    theaters: Option<Vec<String>>,

    /// Where to write the showtimes JSON (default: $OUT_DIR/showtimes.json)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seattle_showtimes=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::load().context("Failed to load configuration")?;
    info!("Running in {:?} mode", config.run_mode);

    let dates = DateManager::from_config(&config);
    let images = Arc::new(ImageCache::new(config.out_images_dir()));
    let client: Arc<dyn Fetch> = Arc::new(
        ScrapeClient::new(&config, images.clone()).context("Failed to build HTTP client")?,
    );
    let registry = ScraperRegistry::new(client, dates);

    let scrapers = match &args.theaters {
        Some(ids) => {
            info!("Running scrapers for theaters: {}", ids.join(", "));
            registry.scrapers_for_theaters(ids)
        }
        None => registry.all_scrapers(),
    };

    let result = aggregate(&scrapers).await;
    let showtimes = result.showtimes;

    let output = args
        .output
        .unwrap_or_else(|| config.out_dir.join("showtimes.json"));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&showtimes)?;
    tokio::fs::write(&output, json)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {} showtimes to {}", showtimes.len(), output.display());

    let removed = images.cleanup_unused_images().await;
    info!(
        "Kept {} images, removed {} unused",
        images.used_count(),
        removed
    );

    let sorted = sort_chronologically(&showtimes);
    let calendar_days = group_by_date(&filter_from_today(&sorted, &dates));
    let now_playing = group_by_movie(group_by_movie_and_theater(&filter_for_next_days(
        &sorted,
        config.now_playing_days,
        &dates,
    )));
    info!(
        "Calendar: {} days, now playing: {} movies",
        calendar_days.len(),
        now_playing.len()
    );

    Ok(())
}
