use chrono::{DateTime, FixedOffset};
use serde::Serialize;

pub mod base_scraper;
pub mod beacon;
pub mod central_cinema;
pub mod config;
pub mod date_manager;
pub mod error;
pub mod grand_illusion;
pub mod image_cache;
pub mod mock_store;
pub mod nwff;
pub mod pipeline;
pub mod registry;
pub mod scrape_client;
pub mod showtime_utils;
pub mod siff;
pub mod theaters;

pub use error::{ConfigError, DateError, FetchError, ScrapeError};
pub use theaters::{Theater, TheaterId};

/// Common movie data structure that all scrapers should produce.
///
/// Calendar pages usually only give a title and a link; `image_url` is filled
/// in later by the enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Movie {
    pub title: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
    pub runtime: Option<u32>, // in minutes
    pub description: Option<String>,
    pub release_year: Option<i32>,
}

impl Movie {
    pub fn new(title: impl Into<String>, url: Option<String>) -> Self {
        Self {
            title: title.into(),
            url,
            ..Default::default()
        }
    }
}

/// One screening: a movie at a theater at an absolute instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Showtime {
    pub movie: Movie,
    pub theater: &'static Theater,
    pub datetime: DateTime<FixedOffset>,
}

impl Showtime {
    /// Same listing: equal title, theater and instant.
    pub fn same_listing(&self, other: &Showtime) -> bool {
        self.movie.title == other.movie.title
            && self.theater.id == other.theater.id
            && self.datetime == other.datetime
    }
}

/// Trait that all theater scrapers must implement
#[async_trait::async_trait]
pub trait TheaterScraper: Send + Sync {
    /// Name used to tag log lines and failures
    fn name(&self) -> &str;

    /// Fetch every showtime this scraper knows about
    async fn get_showtimes(&self) -> Result<Vec<Showtime>, ScrapeError>;
}

/// Resolve an `href` found on the page at `base` into an absolute URL.
pub fn absolute_url(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    // Protocol-relative: keep the page's scheme.
    if let Some(rest) = href.strip_prefix("//") {
        let scheme = base.split_once("://").map_or("https", |(scheme, _)| scheme);
        return format!("{scheme}://{rest}");
    }

    let root = origin(base);
    if href.starts_with('/') {
        return format!("{root}{href}");
    }
    let path = base[root.len()..].split(['?', '#']).next().unwrap_or("");
    let dir = path.rfind('/').map_or("/", |i| &path[..=i]);
    format!("{root}{dir}{href}")
}

/// `https://host` part of a URL.
pub fn origin(url: &str) -> &str {
    let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[after_scheme..].find('/') {
        Some(i) => &url[..after_scheme + i],
        None => url,
    }
}
