//! Scraper for SIFF's three cinemas (Uptown, Downtown, Film Center).
//! One daily list page per date: https://www.siff.net/calendar?view=list&date=YYYY-MM-DD
//! Times on the page are bare "7:45 PM" strings, so the page's date travels
//! with it as context.

use crate::base_scraper::{CalendarPage, TheaterStrategy, element_text};
use crate::date_manager::{DateManager, date_yyyymmdd};
use crate::theaters::{SIFF_CENTER, SIFF_DOWNTOWN, SIFF_UPTOWN, Theater};
use crate::{Movie, Showtime, absolute_url};
use chrono::NaiveDate;
use scraper::{ElementRef, Selector};
use tracing::{debug, warn};

const BASE: &str = "https://siff.net";
const CALENDAR_URL: &str = "https://www.siff.net/calendar?view=list&date=";
const DAYS_AHEAD: usize = 9;

pub struct SiffScraper {
    dates: DateManager,
}

impl SiffScraper {
    pub fn new(dates: DateManager) -> Self {
        Self { dates }
    }

    fn venue(href: &str) -> Option<&'static Theater> {
        match href.trim().trim_end_matches('/') {
            "/cinema/cinema-venues/siff-cinema-uptown" => Some(&SIFF_UPTOWN),
            "/cinema/cinema-venues/siff-film-center" => Some(&SIFF_CENTER),
            "/cinema/cinema-venues/siff-cinema-downtown" => Some(&SIFF_DOWNTOWN),
            _ => None,
        }
    }
}

impl TheaterStrategy for SiffScraper {
    type Context = NaiveDate;

    fn name(&self) -> &'static str {
        "SiffScraper"
    }

    fn calendar_pages(&self) -> Vec<CalendarPage<NaiveDate>> {
        self.dates
            .next_n_days(DAYS_AHEAD, 1)
            .into_iter()
            .map(|date| CalendarPage {
                url: format!("{}{}", CALENDAR_URL, date_yyyymmdd(date)),
                context: date,
            })
            .collect()
    }

    fn event_selector(&self) -> &'static str {
        "div.item"
    }

    fn parse_event(&self, event: ElementRef<'_>, date: &NaiveDate) -> Vec<Showtime> {
        let (Ok(link_sel), Ok(times_sel), Ok(button_sel)) = (
            Selector::parse("h3 > a"),
            Selector::parse("div.times"),
            Selector::parse("div.button-group > a"),
        ) else {
            return Vec::new();
        };

        let Some(link) = event.select(&link_sel).next() else {
            return Vec::new();
        };
        let title = element_text(link);
        if title.is_empty() {
            return Vec::new();
        }
        let url = link.value().attr("href").map(|href| absolute_url(BASE, href));

        let Some(times) = event.select(&times_sel).next() else {
            return Vec::new();
        };
        let venue_href = times
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or("");
        let Some(theater) = Self::venue(venue_href) else {
            warn!("[{}] couldn't find theater: {:?}", self.name(), venue_href);
            return Vec::new();
        };

        times
            .select(&button_sel)
            .filter_map(|button| {
                let time = element_text(button);
                match self.dates.parse_date_time(*date, &time) {
                    Ok(datetime) => Some(Showtime {
                        movie: Movie::new(title.clone(), url.clone()),
                        theater,
                        datetime,
                    }),
                    Err(e) => {
                        debug!("[{}] Skipping time for \"{}\": {}", self.name(), title, e);
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theaters::TheaterId;
    use chrono::NaiveDateTime;
    use scraper::Html;

    fn scraper() -> SiffScraper {
        SiffScraper::new(DateManager::frozen(
            NaiveDateTime::parse_from_str("2026-01-19T12:00:00", "%Y-%m-%dT%H:%M:%S").unwrap(),
        ))
    }

    fn parse(html: &str, date: NaiveDate) -> Vec<Showtime> {
        let scraper = scraper();
        let doc = Html::parse_document(html);
        let sel = Selector::parse(scraper.event_selector()).unwrap();
        doc.select(&sel)
            .flat_map(|e| scraper.parse_event(e, &date))
            .collect()
    }

    #[test]
    fn one_page_per_day_with_date_context() {
        let pages = scraper().calendar_pages();
        assert_eq!(pages.len(), 9);
        assert_eq!(
            pages[0].url,
            "https://www.siff.net/calendar?view=list&date=2026-01-19"
        );
        assert_eq!(pages[8].context, NaiveDate::from_ymd_opt(2026, 1, 27).unwrap());
    }

    #[test]
    fn expands_every_time_button() {
        let html = r##"
          <div class="item">
            <h3><a href="/cinema/films/perfect-days">Perfect Days</a></h3>
            <div class="times">
              <h3><a href="/cinema/cinema-venues/siff-cinema-uptown">SIFF Cinema Uptown</a></h3>
              <div class="button-group">
                <a href="#">1:00 PM</a><a href="#">4:15 PM</a><a href="#">sold out</a>
              </div>
            </div>
          </div>"##;
        let date = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        let showtimes = parse(html, date);

        assert_eq!(showtimes.len(), 2);
        assert!(showtimes.iter().all(|s| s.theater.id == TheaterId::SiffUptown));
        assert_eq!(
            showtimes[0].movie.url.as_deref(),
            Some("https://siff.net/cinema/films/perfect-days")
        );
        assert_eq!(showtimes[0].datetime.to_rfc3339(), "2026-01-20T13:00:00-08:00");
        assert_eq!(showtimes[1].datetime.to_rfc3339(), "2026-01-20T16:15:00-08:00");
    }

    #[test]
    fn unknown_venue_drops_event() {
        let html = r#"
          <div class="item">
            <h3><a href="/cinema/films/x">X</a></h3>
            <div class="times">
              <h3><a href="/cinema/cinema-venues/egyptian">Egyptian</a></h3>
              <div class="button-group"><a>7:00 PM</a></div>
            </div>
          </div>"#;
        assert!(parse(html, NaiveDate::from_ymd_opt(2026, 1, 20).unwrap()).is_empty());
    }
}
