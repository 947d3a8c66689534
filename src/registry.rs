//! Scrapers keyed by the theater ids they answer to, so a run can be narrowed
//! with `--theaters`.

use crate::TheaterScraper;
use crate::base_scraper::BaseScraper;
use crate::beacon::BeaconScraper;
use crate::central_cinema::CentralCinemaScraper;
use crate::date_manager::DateManager;
use crate::grand_illusion::GrandIllusionScraper;
use crate::nwff::NwffScraper;
use crate::scrape_client::Fetch;
use crate::siff::SiffScraper;
use std::sync::Arc;
use tracing::warn;

pub struct ScraperEntry {
    /// SIFF covers three venues with one scraper, so an entry can answer to
    /// several ids.
    pub theater_ids: &'static [&'static str],
    pub scraper: Arc<dyn TheaterScraper>,
}

pub struct ScraperRegistry {
    entries: Vec<ScraperEntry>,
}

impl ScraperRegistry {
    /// Every theater this crate knows how to scrape, sharing one client.
    pub fn new(client: Arc<dyn Fetch>, dates: DateManager) -> Self {
        Self::from_entries(vec![
            ScraperEntry {
                theater_ids: &["beacon"],
                scraper: Arc::new(BaseScraper::new(BeaconScraper::new(), client.clone())),
            },
            ScraperEntry {
                theater_ids: &["siff", "siff-uptown", "siff-downtown", "siff-center"],
                scraper: Arc::new(BaseScraper::new(SiffScraper::new(dates), client.clone())),
            },
            ScraperEntry {
                theater_ids: &["nwff"],
                scraper: Arc::new(BaseScraper::new(NwffScraper::new(dates), client.clone())),
            },
            ScraperEntry {
                theater_ids: &["grand-illusion"],
                scraper: Arc::new(BaseScraper::new(
                    GrandIllusionScraper::new(),
                    client.clone(),
                )),
            },
            ScraperEntry {
                theater_ids: &["central-cinema"],
                scraper: Arc::new(CentralCinemaScraper::new(client, dates)),
            },
        ])
    }

    pub fn from_entries(entries: Vec<ScraperEntry>) -> Self {
        Self { entries }
    }

    pub fn all_scrapers(&self) -> Vec<Arc<dyn TheaterScraper>> {
        self.entries.iter().map(|e| e.scraper.clone()).collect()
    }

    /// Scrapers answering to any of `theater_ids`, in registry order. Falls
    /// back to every scraper when none match.
    pub fn scrapers_for_theaters<S: AsRef<str>>(
        &self,
        theater_ids: &[S],
    ) -> Vec<Arc<dyn TheaterScraper>> {
        let requested: Vec<String> = theater_ids
            .iter()
            .map(|id| id.as_ref().trim().to_lowercase())
            .collect();

        let selected: Vec<Arc<dyn TheaterScraper>> = self
            .entries
            .iter()
            .filter(|e| e.theater_ids.iter().any(|id| requested.iter().any(|r| r == id)))
            .map(|e| e.scraper.clone())
            .collect();

        if selected.is_empty() {
            warn!(
                "No valid theater IDs found. Valid IDs are: {}",
                self.valid_theater_ids().join(", ")
            );
            return self.all_scrapers();
        }
        selected
    }

    pub fn valid_theater_ids(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .flat_map(|e| e.theater_ids.iter().copied())
            .collect()
    }
}
