//! Shared fetch → parse → filter → enrich flow for calendar-driven theaters.
//!
//! A theater only describes *what* to scrape through [`TheaterStrategy`]:
//! which calendar pages, which nodes are events and how an event becomes
//! showtimes. [`BaseScraper`] owns *how*: fetching through the shared client,
//! isolating page failures and fetching each movie page at most once for its
//! poster.

use crate::error::ScrapeError;
use crate::scrape_client::Fetch;
use crate::{Showtime, TheaterScraper, absolute_url};
use indexmap::IndexSet;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// One page to fetch, plus whatever the page itself does not say (for
/// example which date a daily listing covers).
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarPage<C> {
    pub url: String,
    pub context: C,
}

impl CalendarPage<()> {
    pub fn plain(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            context: (),
        }
    }
}

pub trait TheaterStrategy: Send + Sync {
    type Context: Send + Sync;

    fn name(&self) -> &'static str;

    fn calendar_pages(&self) -> Vec<CalendarPage<Self::Context>>;

    fn event_selector(&self) -> &'static str;

    /// Zero showtimes means the event was unusable and is dropped.
    fn parse_event(&self, event: ElementRef<'_>, context: &Self::Context) -> Vec<Showtime>;

    fn extract_image_url(&self, html: &str) -> Option<String> {
        og_image(html)
    }

    fn filter_showtimes(&self, showtimes: Vec<Showtime>) -> Vec<Showtime> {
        showtimes
    }
}

/// Where a scrape run is. Logged at each transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapePhase {
    Idle,
    FetchingCalendarPages,
    ParsingEvents,
    EnrichingImages,
    Done,
    Failed(String),
}

pub struct BaseScraper<S: TheaterStrategy> {
    strategy: S,
    client: Arc<dyn Fetch>,
}

impl<S: TheaterStrategy> BaseScraper<S> {
    pub fn new(strategy: S, client: Arc<dyn Fetch>) -> Self {
        Self { strategy, client }
    }

    fn enter(&self, phase: ScrapePhase) {
        debug!("[{}] {:?}", self.strategy.name(), phase);
    }

    /// Parse one fetched page. Kept synchronous: `Html` must not live across
    /// an await.
    fn parse_page(&self, html: &str, context: &S::Context) -> Result<Vec<Showtime>, ScrapeError> {
        let selector = parse_selector(self.strategy.event_selector())?;
        let document = Html::parse_document(html);
        Ok(document
            .select(&selector)
            .flat_map(|event| self.strategy.parse_event(event, context))
            .collect())
    }

    async fn scrape_page(&self, page: &CalendarPage<S::Context>) -> Result<Vec<Showtime>, ScrapeError> {
        info!("[{}] Fetching calendar page: {}", self.strategy.name(), page.url);
        let html = self.client.get(&page.url).await?;
        self.enter(ScrapePhase::ParsingEvents);
        self.parse_page(&html, &page.context)
    }

    /// Fetch a movie page. Returns the poster URL once its bytes are cached.
    async fn fetch_movie_page(&self, url: &str) -> Result<Option<String>, ScrapeError> {
        info!("[{}] Fetching movie page: {}", self.strategy.name(), url);
        let html = self.client.get(url).await?;
        let image_url = match self.strategy.extract_image_url(&html) {
            Some(src) => absolute_url(url, &src),
            None => return Ok(None),
        };

        self.client.get_image(&image_url).await?;
        Ok(Some(image_url))
    }

    /// One request at a time, one per distinct movie URL. The URL set is the
    /// only dedup point and lives for a single run.
    async fn enrich_images(&self, showtimes: Vec<Showtime>) -> Vec<Showtime> {
        let name = self.strategy.name();
        let unique_urls: IndexSet<String> = showtimes
            .iter()
            .filter_map(|s| s.movie.url.clone())
            .collect();
        info!(
            "[{}] Fetching {} unique movie pages from {} showtimes",
            name,
            unique_urls.len(),
            showtimes.len()
        );

        let mut image_urls = HashMap::new();
        for url in unique_urls {
            match self.fetch_movie_page(&url).await {
                Ok(Some(image_url)) => {
                    image_urls.insert(url, image_url);
                }
                Ok(None) => {}
                Err(e) => error!("[{}] Error fetching movie page {}: {}", name, url, e),
            }
        }

        apply_image_urls(showtimes, &image_urls)
    }

    pub async fn get_showtimes(&self) -> Result<Vec<Showtime>, ScrapeError> {
        let name = self.strategy.name();
        self.enter(ScrapePhase::Idle);
        let pages = self.strategy.calendar_pages();
        info!("[{}] Starting scrape with {} calendar pages", name, pages.len());

        self.enter(ScrapePhase::FetchingCalendarPages);
        let mut parsed = Vec::new();
        let mut failed_pages = 0;
        for page in &pages {
            match self.scrape_page(page).await {
                Ok(mut showtimes) => parsed.append(&mut showtimes),
                Err(e) => {
                    failed_pages += 1;
                    self.enter(ScrapePhase::Failed(page.url.clone()));
                    error!("[{}] Error fetching calendar page {}: {}", name, page.url, e);
                }
            }
        }
        if !pages.is_empty() && failed_pages == pages.len() {
            return Err(ScrapeError::AllPagesFailed {
                scraper: name.to_string(),
                pages: failed_pages,
            });
        }

        let showtimes = self.strategy.filter_showtimes(parsed);

        self.enter(ScrapePhase::EnrichingImages);
        let showtimes = self.enrich_images(showtimes).await;

        self.enter(ScrapePhase::Done);
        info!(
            "[{}] Completed scrape with {} final showtimes",
            name,
            showtimes.len()
        );
        Ok(showtimes)
    }
}

#[async_trait::async_trait]
impl<S: TheaterStrategy> TheaterScraper for BaseScraper<S> {
    fn name(&self) -> &str {
        self.strategy.name()
    }

    async fn get_showtimes(&self) -> Result<Vec<Showtime>, ScrapeError> {
        BaseScraper::get_showtimes(self).await
    }
}

pub fn apply_image_urls(
    showtimes: Vec<Showtime>,
    image_urls: &HashMap<String, String>,
) -> Vec<Showtime> {
    showtimes
        .into_iter()
        .map(|mut showtime| {
            if let Some(image_url) = showtime
                .movie
                .url
                .as_ref()
                .and_then(|url| image_urls.get(url))
            {
                showtime.movie.image_url = Some(image_url.clone());
            }
            showtime
        })
        .collect()
}

pub fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector(e.to_string()))
}

/// First non-empty `attr` of the first element matching `selector`.
pub fn first_attr(html: &str, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn og_image(html: &str) -> Option<String> {
    first_attr(html, "meta[property=\"og:image\"]", "content")
}

/// Text of an element with whitespace runs collapsed.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn og_image_reads_meta_content() {
        let html = r#"<html><head><meta property="og:image" content=" https://cdn.x/p.jpg "></head></html>"#;
        assert_eq!(og_image(html).as_deref(), Some("https://cdn.x/p.jpg"));
        assert_eq!(og_image("<html></html>"), None);
        assert_eq!(
            og_image(r#"<meta property="og:image" content="">"#),
            None
        );
    }

    #[test]
    fn bad_selector_is_typed_error() {
        assert!(matches!(parse_selector("div[["), Err(ScrapeError::Selector(_))));
    }

    #[test]
    fn element_text_collapses_whitespace() {
        let doc = Html::parse_fragment("<h3>  Real \n <b>Film</b>  </h3>");
        let sel = Selector::parse("h3").unwrap();
        let h3 = doc.select(&sel).next().unwrap();
        assert_eq!(element_text(h3), "Real Film");
    }
}
