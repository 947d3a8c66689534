//! Scraper for the Grand Illusion Cinema (University District).
//! The home page lists one `.film-card` per film with every screening under
//! `.screenings-list`, written like "Friday, Jan 30, 2026, 7:00pm".

use crate::base_scraper::{CalendarPage, TheaterStrategy, element_text, first_attr};
use crate::date_manager::{pacific_datetime, to_24_hour};
use crate::theaters::GRAND_ILLUSION;
use crate::{Movie, Showtime, absolute_url};
use chrono::{DateTime, FixedOffset, NaiveDate};
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::OnceLock;
use tracing::debug;

const HOME_URL: &str = "https://grandillusioncinema.org";

static MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn screening_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\w+,\s+(\w+)\s+(\d+),\s+(\d{4}),\s+(\d+):(\d+)\s*(am|pm)").expect("valid regex")
    })
}

fn runtime_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*min").expect("valid regex"))
}

/// "Friday, Jan 30, 2026, 7:00pm" as a Pacific instant.
pub fn parse_screening_date(text: &str) -> Option<DateTime<FixedOffset>> {
    let caps = screening_regex().captures(text)?;
    let month_name = caps[1].to_lowercase();
    let month = MONTHS
        .iter()
        .position(|m| month_name.starts_with(m))
        .map(|i| i as u32 + 1)?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let hour: u32 = caps[4].parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let is_pm = caps[6].eq_ignore_ascii_case("pm");

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    pacific_datetime(date, to_24_hour(hour, is_pm), minute).ok()
}

/// Director/year and runtime lines from `.film-card--film-info`.
#[derive(Debug, Default, PartialEq)]
struct FilmInfo {
    directors: Vec<String>,
    release_year: Option<i32>,
    runtime: Option<u32>,
}

fn parse_film_info(lines: &[String]) -> FilmInfo {
    let mut info = FilmInfo::default();
    for line in lines {
        // "Director · Year"
        if line.contains('·') && !line.contains("min") {
            let mut parts = line.split('·').map(str::trim);
            if let Some(director) = parts.next().filter(|d| !d.is_empty()) {
                info.directors = vec![director.to_string()];
            }
            if let Some(year) = parts.next() {
                if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
                    info.release_year = year.parse().ok();
                }
            }
        }
        // "127min · DCP"
        if let Some(caps) = runtime_regex().captures(line) {
            info.runtime = caps[1].parse().ok();
        }
    }
    info
}

pub struct GrandIllusionScraper;

impl GrandIllusionScraper {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GrandIllusionScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl TheaterStrategy for GrandIllusionScraper {
    type Context = ();

    fn name(&self) -> &'static str {
        "GrandIllusionScraper"
    }

    fn calendar_pages(&self) -> Vec<CalendarPage<()>> {
        vec![CalendarPage::plain(HOME_URL)]
    }

    fn event_selector(&self) -> &'static str {
        ".film-card"
    }

    fn parse_event(&self, event: ElementRef<'_>, _context: &()) -> Vec<Showtime> {
        let (Ok(title_sel), Ok(info_sel), Ok(desc_sel), Ok(poster_sel), Ok(screening_sel)) = (
            Selector::parse(".film-card--title a.film-title"),
            Selector::parse(".film-card--film-info div"),
            Selector::parse(".film-card--description"),
            Selector::parse(".film-card--poster img"),
            Selector::parse(".screenings-list li.screening"),
        ) else {
            return Vec::new();
        };

        let Some(title_link) = event.select(&title_sel).next() else {
            debug!("[{}] Skipping event - no title found", self.name());
            return Vec::new();
        };
        let title = element_text(title_link);
        if title.is_empty() {
            debug!("[{}] Skipping event - no title found", self.name());
            return Vec::new();
        }
        let url = title_link
            .value()
            .attr("href")
            .map(|href| absolute_url(HOME_URL, href));

        let info_lines: Vec<String> = event.select(&info_sel).map(element_text).collect();
        let info = parse_film_info(&info_lines);
        let description = event
            .select(&desc_sel)
            .next()
            .map(element_text)
            .filter(|d| !d.is_empty());
        let image_url = event
            .select(&poster_sel)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| absolute_url(HOME_URL, src));

        let movie = Movie {
            title: title.clone(),
            url,
            image_url,
            directors: info.directors,
            actors: Vec::new(),
            runtime: info.runtime,
            description,
            release_year: info.release_year,
        };

        let showtimes: Vec<Showtime> = event
            .select(&screening_sel)
            .filter_map(|screening| {
                let text = element_text(screening);
                let datetime = parse_screening_date(&text);
                if datetime.is_none() {
                    debug!(
                        "[{}] Could not parse date from \"{}\" for \"{}\"",
                        self.name(),
                        text,
                        title
                    );
                }
                datetime.map(|datetime| Showtime {
                    movie: movie.clone(),
                    theater: &GRAND_ILLUSION,
                    datetime,
                })
            })
            .collect();

        if showtimes.is_empty() {
            debug!("[{}] No valid showtimes found for \"{}\"", self.name(), title);
        }
        showtimes
    }

    /// WordPress featured image, else `og:image`.
    fn extract_image_url(&self, html: &str) -> Option<String> {
        first_attr(html, "img.wp-post-image", "src")
            .or_else(|| first_attr(html, "meta[property=\"og:image\"]", "content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn parses_screening_dates() {
        let dt = parse_screening_date("Friday, Jan 30, 2026, 7:00pm").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-30T19:00:00-08:00");

        let noon = parse_screening_date("Sunday, Jul 12, 2026, 12:30 PM").unwrap();
        assert_eq!(noon.to_rfc3339(), "2026-07-12T12:30:00-07:00");

        assert!(parse_screening_date("Friday, Smarch 30, 2026, 7:00pm").is_none());
        assert!(parse_screening_date("Coming soon").is_none());
    }

    #[test]
    fn reads_director_year_and_runtime() {
        let info = parse_film_info(&[
            "Agnès Varda · 1962".to_string(),
            "90min · 35mm".to_string(),
        ]);
        assert_eq!(
            info,
            FilmInfo {
                directors: vec!["Agnès Varda".to_string()],
                release_year: Some(1962),
                runtime: Some(90),
            }
        );
    }

    #[test]
    fn film_card_expands_to_every_screening() {
        let html = r#"
          <div class="film-card">
            <div class="film-card--poster"><img src="/wp-content/uploads/cleo.jpg"></div>
            <div class="film-card--title"><a class="film-title" href="/film/cleo">Cléo from 5 to 7</a></div>
            <div class="film-card--film-info"><div>Agnès Varda · 1962</div><div>90min · DCP</div></div>
            <div class="film-card--description">A singer awaits test results.</div>
            <ul class="screenings-list">
              <li class="screening">Friday, Jan 30, 2026, 7:00pm</li>
              <li class="screening">Saturday, Jan 31, 2026, 9:30pm</li>
              <li class="screening">TBA</li>
            </ul>
          </div>"#;
        let scraper = GrandIllusionScraper::new();
        let doc = Html::parse_document(html);
        let sel = Selector::parse(scraper.event_selector()).unwrap();
        let showtimes: Vec<Showtime> = doc
            .select(&sel)
            .flat_map(|e| scraper.parse_event(e, &()))
            .collect();

        assert_eq!(showtimes.len(), 2);
        let movie = &showtimes[0].movie;
        assert_eq!(movie.title, "Cléo from 5 to 7");
        assert_eq!(movie.url.as_deref(), Some("https://grandillusioncinema.org/film/cleo"));
        assert_eq!(
            movie.image_url.as_deref(),
            Some("https://grandillusioncinema.org/wp-content/uploads/cleo.jpg")
        );
        assert_eq!(movie.runtime, Some(90));
        assert_eq!(movie.release_year, Some(1962));
        assert_eq!(showtimes[1].datetime.to_rfc3339(), "2026-01-31T21:30:00-08:00");
    }
}
