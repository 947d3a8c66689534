//! Scraper for Northwest Film Forum.
//! Calendar is paged by week: https://nwfilmforum.org/calendar/?start=YYYY-MM-DD&type=film

use crate::base_scraper::{CalendarPage, TheaterStrategy};
use crate::date_manager::{DateManager, date_yyyymmdd, parse_iso_as_pacific};
use crate::theaters::NW_FILM_FORUM;
use crate::{Movie, Showtime, absolute_url};
use scraper::{ElementRef, Selector};
use tracing::debug;

const CALENDAR_URL: &str = "https://nwfilmforum.org/calendar/";
const WEEKS_AHEAD: usize = 4;

pub struct NwffScraper {
    dates: DateManager,
}

impl NwffScraper {
    pub fn new(dates: DateManager) -> Self {
        Self { dates }
    }
}

impl TheaterStrategy for NwffScraper {
    type Context = ();

    fn name(&self) -> &'static str {
        "NWFFScraper"
    }

    fn calendar_pages(&self) -> Vec<CalendarPage<()>> {
        self.dates
            .next_n_days(WEEKS_AHEAD, 7)
            .into_iter()
            .map(|date| {
                CalendarPage::plain(format!(
                    "{}?start={}&type=film",
                    CALENDAR_URL,
                    date_yyyymmdd(date)
                ))
            })
            .collect()
    }

    fn event_selector(&self) -> &'static str {
        r#"div[itemtype="http://schema.org/ScreeningEvent"]"#
    }

    fn parse_event(&self, event: ElementRef<'_>, _context: &()) -> Vec<Showtime> {
        let (Ok(link_sel), Ok(name_sel), Ok(start_sel)) = (
            Selector::parse("a"),
            Selector::parse("[itemprop=\"name\"]"),
            Selector::parse("[itemprop=\"startDate\"]"),
        ) else {
            return Vec::new();
        };

        let content = |sel: &Selector| {
            event
                .select(sel)
                .next()
                .and_then(|el| el.value().attr("content"))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let (Some(title), Some(start)) = (content(&name_sel), content(&start_sel)) else {
            return Vec::new();
        };
        let url = event
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| absolute_url(NW_FILM_FORUM.url, href));

        match parse_iso_as_pacific(&start) {
            Ok(datetime) => vec![Showtime {
                movie: Movie::new(title, url),
                theater: &NW_FILM_FORUM,
                datetime,
            }],
            Err(e) => {
                debug!("[{}] Dropping \"{}\": {}", self.name(), title, e);
                Vec::new()
            }
        }
    }
}
