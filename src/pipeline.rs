//! Runs every selected scraper together and keeps whatever succeeded.

use crate::error::ScrapeError;
use crate::{Showtime, TheaterScraper};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info};

/// A theater that contributed nothing this run.
#[derive(Debug)]
pub struct TheaterFailure {
    pub scraper: String,
    pub error: ScrapeError,
}

#[derive(Debug, Default)]
pub struct Aggregate {
    /// Every successful theater's showtimes, flattened in scraper order. Not
    /// sorted and not deduplicated.
    pub showtimes: Vec<Showtime>,
    pub failures: Vec<TheaterFailure>,
}

/// Start all scrapers at once and wait for each to settle. A failing theater
/// is logged and recorded, never fatal.
pub async fn aggregate(scrapers: &[Arc<dyn TheaterScraper>]) -> Aggregate {
    let results = join_all(scrapers.iter().map(|s| s.get_showtimes())).await;

    let mut aggregate = Aggregate::default();
    for (scraper, result) in scrapers.iter().zip(results) {
        match result {
            Ok(mut showtimes) => {
                info!("[{}] {} showtimes", scraper.name(), showtimes.len());
                aggregate.showtimes.append(&mut showtimes);
            }
            Err(e) => {
                error!("[{}] Scrape failed: {}", scraper.name(), e);
                aggregate.failures.push(TheaterFailure {
                    scraper: scraper.name().to_string(),
                    error: e,
                });
            }
        }
    }

    info!(
        "Total showtimes: {} ({} of {} theaters failed)",
        aggregate.showtimes.len(),
        aggregate.failures.len(),
        scrapers.len()
    );
    aggregate
}
