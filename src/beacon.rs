//! Scraper for The Beacon (Columbia City, single screen).
//! Calendar: https://thebeacon.film/calendar
//! Each showing is a `section.showtime` with schema.org microdata.

use crate::base_scraper::{CalendarPage, TheaterStrategy, element_text, first_attr};
use crate::date_manager::parse_iso_as_pacific;
use crate::theaters::THE_BEACON;
use crate::{Movie, Showtime, absolute_url};
use scraper::{ElementRef, Selector};
use tracing::debug;

const CALENDAR_URL: &str = "https://thebeacon.film/calendar";
const RENTAL_TITLE: &str = "RENT THE BEACON";

pub struct BeaconScraper;

impl BeaconScraper {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BeaconScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl TheaterStrategy for BeaconScraper {
    type Context = ();

    fn name(&self) -> &'static str {
        "BeaconScraper"
    }

    fn calendar_pages(&self) -> Vec<CalendarPage<()>> {
        vec![CalendarPage::plain(CALENDAR_URL)]
    }

    fn event_selector(&self) -> &'static str {
        "section.showtime[itemscope]"
    }

    fn parse_event(&self, event: ElementRef<'_>, _context: &()) -> Vec<Showtime> {
        let (Ok(link_sel), Ok(name_sel), Ok(start_sel)) = (
            Selector::parse("a"),
            Selector::parse("[itemprop=\"name\"]"),
            Selector::parse("[itemprop=\"startDate\"]"),
        ) else {
            return Vec::new();
        };

        let Some(link) = event.select(&link_sel).next() else {
            return Vec::new();
        };
        let url = link
            .value()
            .attr("href")
            .map(|href| absolute_url(THE_BEACON.url, href));
        let title = link
            .select(&name_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let start = link
            .select(&start_sel)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .unwrap_or("");

        if title.is_empty() || start.is_empty() {
            return Vec::new();
        }
        let datetime = match parse_iso_as_pacific(start) {
            Ok(dt) => dt,
            Err(e) => {
                debug!("[{}] Dropping \"{}\": {}", self.name(), title, e);
                return Vec::new();
            }
        };

        vec![Showtime {
            movie: Movie::new(title, url),
            theater: &THE_BEACON,
            datetime,
        }]
    }

    /// The film page's `img.main_image`, else `og:image`.
    fn extract_image_url(&self, html: &str) -> Option<String> {
        first_attr(html, "img.main_image", "src")
            .or_else(|| first_attr(html, "meta[property=\"og:image\"]", "content"))
    }

    /// Private rental slots are listed like films.
    fn filter_showtimes(&self, showtimes: Vec<Showtime>) -> Vec<Showtime> {
        showtimes
            .into_iter()
            .filter(|s| s.movie.title != RENTAL_TITLE)
            .collect()
    }
}
