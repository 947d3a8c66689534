//! Scraper for Central Cinema (Central District).
//! Home: https://www.central-cinema.com/home
//! The home page only links movies; each movie page carries a JSON-LD `Movie`
//! block and one "January 30, 4:00 pm" checkout link per showing.

use crate::base_scraper::{element_text, og_image};
use crate::date_manager::{DateManager, pacific_datetime, to_24_hour};
use crate::error::ScrapeError;
use crate::scrape_client::Fetch;
use crate::theaters::CENTRAL_CINEMA;
use crate::{Movie, Showtime, TheaterScraper, absolute_url};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate};
use indexmap::IndexSet;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info};

const HOME_URL: &str = "https://www.central-cinema.com/home";
const PRIVATE_RENTAL: &str = "private-rental-event";

static MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn showing_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\w+)\s+(\d+),\s+(\d+):(\d+)\s*(am|pm)").expect("valid regex")
    })
}

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?").expect("valid regex"))
}

/// Fields read from a JSON-LD `Movie` block. Each one is taken on its own,
/// so an unexpected shape only loses that field.
#[derive(Debug, Default)]
struct JsonLdMovie {
    name: Option<String>,
    description: Option<String>,
    duration: Option<String>,
    directors: Vec<String>,
    actors: Vec<String>,
    image: Option<String>,
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `"A"`, `{"name": "A"}` or a list of either.
fn person_names(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(person_names).collect(),
        Value::Object(obj) => obj.get("name").and_then(non_empty_str).into_iter().collect(),
        other => non_empty_str(other).into_iter().collect(),
    }
}

/// `"url"`, an `ImageObject` (`url` or `contentUrl`), or a list: first usable.
fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().find_map(image_url),
        Value::Object(obj) => obj
            .get("url")
            .or_else(|| obj.get("contentUrl"))
            .and_then(image_url),
        other => non_empty_str(other),
    }
}

fn is_movie(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => kind == "Movie",
        Some(Value::Array(kinds)) => kinds.iter().any(|k| k.as_str() == Some("Movie")),
        _ => false,
    }
}

impl JsonLdMovie {
    fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(non_empty_str);
        Self {
            name: field("name"),
            description: field("description"),
            duration: field("duration"),
            directors: value.get("director").map(person_names).unwrap_or_default(),
            actors: value.get("actor").map(person_names).unwrap_or_default(),
            image: value.get("image").and_then(image_url),
        }
    }
}

fn json_ld_movies(document: &Html) -> Vec<JsonLdMovie> {
    let Ok(sel) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };
    document
        .select(&sel)
        .filter_map(|script| {
            let json: String = script.text().collect();
            serde_json::from_str::<Value>(&json).ok()
        })
        .flat_map(|value| match value {
            Value::Array(items) => items,
            other => vec![other],
        })
        .filter(is_movie)
        .map(|value| JsonLdMovie::from_value(&value))
        .collect()
}

/// ISO-8601 duration like "PT1H41M" to minutes.
pub fn parse_duration(duration: &str) -> Option<u32> {
    let caps = duration_regex().captures(duration)?;
    if caps.get(1).is_none() && caps.get(2).is_none() {
        return None;
    }
    let hours: u32 = caps.get(1).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let minutes: u32 = caps.get(2).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    Some(hours * 60 + minutes)
}

/// "January 30, 4:00 pm" with no year. Uses the reference year, rolling to
/// the next one when that lands more than a week in the past.
pub fn parse_showing_date(text: &str, dates: &DateManager) -> Option<DateTime<FixedOffset>> {
    let caps = showing_regex().captures(text)?;
    let month_name = caps[1].to_lowercase();
    let month = MONTHS.iter().position(|m| *m == month_name)? as u32 + 1;
    let day: u32 = caps[2].parse().ok()?;
    let hour: u32 = caps[3].parse().ok()?;
    let minute: u32 = caps[4].parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour = to_24_hour(hour, caps[5].eq_ignore_ascii_case("pm"));

    let now = dates.now();
    let week_ago = now - Duration::days(7);
    let year = now.year();
    let this_year = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| pacific_datetime(date, hour, minute).ok());
    match this_year {
        Some(dt) if dt >= week_ago => Some(dt),
        _ => NaiveDate::from_ymd_opt(year + 1, month, day)
            .and_then(|date| pacific_datetime(date, hour, minute).ok()),
    }
}

/// Home page → distinct movie URLs, without private rentals.
pub fn extract_movie_urls(html: &str) -> Vec<String> {
    let Ok(sel) = Selector::parse(r#"a[href*="/movie/"]"#) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let urls: IndexSet<String> = document
        .select(&sel)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| !href.contains(PRIVATE_RENTAL))
        .map(|href| absolute_url(HOME_URL, href))
        .collect();
    urls.into_iter().collect()
}

/// Movie page → showtimes plus poster URL (og:image, else JSON-LD image).
pub fn parse_movie_page(
    html: &str,
    url: &str,
    dates: &DateManager,
) -> (Vec<Showtime>, Option<String>) {
    let document = Html::parse_document(html);
    let mut movie = Movie::new("", Some(url.to_string()));
    let mut json_image = None;

    for data in json_ld_movies(&document) {
        if let Some(name) = data.name {
            movie.title = name;
        }
        if data.description.is_some() {
            movie.description = data.description;
        }
        if let Some(runtime) = data.duration.as_deref().and_then(parse_duration) {
            movie.runtime = Some(runtime);
        }
        if !data.directors.is_empty() {
            movie.directors = data.directors;
        }
        if !data.actors.is_empty() {
            movie.actors = data.actors;
        }
        if data.image.is_some() {
            json_image = data.image;
        }
    }

    if movie.title.is_empty() {
        if let Ok(sel) = Selector::parse(r#"[itemprop="name"]"#) {
            movie.title = document
                .select(&sel)
                .next()
                .map(element_text)
                .unwrap_or_default();
        }
    }
    if movie.title.is_empty() {
        info!("[CentralCinemaScraper] No title found for {}", url);
        return (Vec::new(), None);
    }

    let mut showtimes = Vec::new();
    if let Ok(sel) = Selector::parse(r#"h2 a[href*="/checkout/showing/"]"#) {
        for link in document.select(&sel) {
            let text = element_text(link);
            match parse_showing_date(&text, dates) {
                Some(datetime) => showtimes.push(Showtime {
                    movie: movie.clone(),
                    theater: &CENTRAL_CINEMA,
                    datetime,
                }),
                None => debug!("[CentralCinemaScraper] Could not parse date: \"{}\"", text),
            }
        }
    }

    let image_url = og_image(html)
        .or(json_image)
        .map(|src| absolute_url(url, &src));
    (showtimes, image_url)
}

pub struct CentralCinemaScraper {
    client: Arc<dyn Fetch>,
    dates: DateManager,
}

impl CentralCinemaScraper {
    pub fn new(client: Arc<dyn Fetch>, dates: DateManager) -> Self {
        Self { client, dates }
    }

    async fn fetch_movie_page(&self, url: &str) -> Result<Vec<Showtime>, ScrapeError> {
        info!("[{}] Fetching movie page: {}", self.name(), url);
        let html = self.client.get(url).await?;
        let (showtimes, image_url) = parse_movie_page(&html, url, &self.dates);

        let Some(image_url) = image_url.filter(|_| !showtimes.is_empty()) else {
            return Ok(showtimes);
        };
        // Keep the showtimes even when the poster can't be fetched.
        match self.client.get_image(&image_url).await {
            Ok(_) => Ok(showtimes
                .into_iter()
                .map(|mut s| {
                    s.movie.image_url = Some(image_url.clone());
                    s
                })
                .collect()),
            Err(e) => {
                debug!("[{}] No poster for {}: {}", self.name(), url, e);
                Ok(showtimes)
            }
        }
    }
}

#[async_trait::async_trait]
impl TheaterScraper for CentralCinemaScraper {
    fn name(&self) -> &str {
        "CentralCinemaScraper"
    }

    async fn get_showtimes(&self) -> Result<Vec<Showtime>, ScrapeError> {
        info!("[{}] Fetching home page: {}", self.name(), HOME_URL);
        let html = self.client.get(HOME_URL).await?;
        let urls = extract_movie_urls(&html);
        info!("[{}] Found {} movie URLs", self.name(), urls.len());

        let mut showtimes = Vec::new();
        for url in &urls {
            match self.fetch_movie_page(url).await {
                Ok(mut found) => showtimes.append(&mut found),
                Err(e) => error!("[{}] Error fetching movie page {}: {}", self.name(), url, e),
            }
        }

        info!(
            "[{}] Completed with {} total showtimes",
            self.name(),
            showtimes.len()
        );
        Ok(showtimes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn dates() -> DateManager {
        DateManager::frozen(
            NaiveDateTime::parse_from_str("2026-01-19T12:00:00", "%Y-%m-%dT%H:%M:%S").unwrap(),
        )
    }

    #[test]
    fn parses_iso_durations() {
        assert_eq!(parse_duration("PT1H41M"), Some(101));
        assert_eq!(parse_duration("PT90M"), Some(90));
        assert_eq!(parse_duration("PT2H"), Some(120));
        assert_eq!(parse_duration("PT"), None);
        assert_eq!(parse_duration("ninety minutes"), None);
    }

    #[test]
    fn infers_year_for_showings() {
        let d = dates();
        assert_eq!(
            parse_showing_date("January 30, 4:00 pm", &d).unwrap().to_rfc3339(),
            "2026-01-30T16:00:00-08:00"
        );
        // Within the last week stays in this year.
        assert_eq!(
            parse_showing_date("January 14, 7:00 pm", &d).unwrap().to_rfc3339(),
            "2026-01-14T19:00:00-08:00"
        );
        // Further back rolls into next year.
        assert_eq!(
            parse_showing_date("January 2, 12:00 am", &d).unwrap().to_rfc3339(),
            "2027-01-02T00:00:00-08:00"
        );
        assert!(parse_showing_date("Smarch 2, 1:00 pm", &d).is_none());
    }

    #[test]
    fn home_page_links_skip_private_rentals() {
        let html = r#"
          <a href="/movie/the-thing">The Thing</a>
          <a href="https://www.central-cinema.com/movie/the-thing">again</a>
          <a href="/movie/private-rental-event-jan">Private</a>
          <a href="/movie/muppets">Muppets</a>
          <a href="/about">About</a>"#;
        assert_eq!(
            extract_movie_urls(html),
            vec![
                "https://www.central-cinema.com/movie/the-thing",
                "https://www.central-cinema.com/movie/muppets",
            ]
        );
    }

    #[test]
    fn movie_page_reads_json_ld_and_showings() {
        let html = r#"<html><head>
          <script type="application/ld+json">
            {"@type":"Movie","name":"The Thing","description":"Antarctic dread.",
             "duration":"PT1H49M","director":{"name":"John Carpenter"},
             "actor":[{"name":"Kurt Russell"},{"name":"Keith David"}],
             "image":"/img/thing.jpg"}
          </script></head><body>
          <h2><a href="/checkout/showing/1">January 30, 9:30 pm</a></h2>
          <h2><a href="/checkout/showing/2">January 31, 4:00 pm</a></h2>
          <h2><a href="/checkout/showing/3">Sold out</a></h2>
        </body></html>"#;
        let url = "https://www.central-cinema.com/movie/the-thing";
        let (showtimes, image) = parse_movie_page(html, url, &dates());

        assert_eq!(showtimes.len(), 2);
        let movie = &showtimes[0].movie;
        assert_eq!(movie.title, "The Thing");
        assert_eq!(movie.runtime, Some(109));
        assert_eq!(movie.directors, vec!["John Carpenter"]);
        assert_eq!(movie.actors, vec!["Kurt Russell", "Keith David"]);
        assert_eq!(movie.url.as_deref(), Some(url));
        assert_eq!(image.as_deref(), Some("https://www.central-cinema.com/img/thing.jpg"));
    }

    #[test]
    fn movie_page_without_title_yields_nothing() {
        let html = r#"<h2><a href="/checkout/showing/1">January 30, 9:30 pm</a></h2>"#;
        let (showtimes, _) = parse_movie_page(html, "https://www.central-cinema.com/movie/x", &dates());
        assert!(showtimes.is_empty());
    }

    #[test]
    fn microdata_title_is_the_fallback() {
        let html = r#"<h1 itemprop="name">Labyrinth</h1>
          <h2><a href="/checkout/showing/9">February 1, 1:00 pm</a></h2>"#;
        let (showtimes, image) =
            parse_movie_page(html, "https://www.central-cinema.com/movie/labyrinth", &dates());
        assert_eq!(showtimes.len(), 1);
        assert_eq!(showtimes[0].movie.title, "Labyrinth");
        assert_eq!(image, None);
    }
    const SHOWING: &str =
        r#"<h2><a href="/checkout/showing/7">January 30, 9:30 pm</a></h2>"#;

    fn page_with_json_ld(json: &str) -> String {
        format!(
            r#"<html><head><script type="application/ld+json">{json}</script></head>
               <body>{SHOWING}</body></html>"#
        )
    }

    #[test]
    fn image_object_keeps_the_movie() {
        let html = page_with_json_ld(
            r#"{"@type":"Movie","name":"The Thing",
                "image":{"@type":"ImageObject","url":"https://cdn.central.test/thing.jpg"}}"#,
        );
        let (showtimes, image) =
            parse_movie_page(&html, "https://www.central-cinema.com/movie/the-thing", &dates());
        assert_eq!(showtimes.len(), 1);
        assert_eq!(showtimes[0].movie.title, "The Thing");
        assert_eq!(image.as_deref(), Some("https://cdn.central.test/thing.jpg"));

        let list = page_with_json_ld(
            r#"{"@type":"Movie","name":"The Thing","image":["/img/a.jpg","/img/b.jpg"]}"#,
        );
        let (_, image) =
            parse_movie_page(&list, "https://www.central-cinema.com/movie/the-thing", &dates());
        assert_eq!(image.as_deref(), Some("https://www.central-cinema.com/img/a.jpg"));
    }

    #[test]
    fn plain_string_people_are_read() {
        let html = page_with_json_ld(
            r#"{"@type":"Movie","name":"The Thing","director":"John Carpenter",
                "actor":["Kurt Russell",{"name":"Keith David"},{"@type":"Person"}]}"#,
        );
        let (showtimes, _) =
            parse_movie_page(&html, "https://www.central-cinema.com/movie/the-thing", &dates());
        assert_eq!(showtimes.len(), 1);
        let movie = &showtimes[0].movie;
        assert_eq!(movie.directors, vec!["John Carpenter"]);
        assert_eq!(movie.actors, vec!["Kurt Russell", "Keith David"]);
    }

    #[test]
    fn odd_field_types_only_lose_that_field() {
        let html = page_with_json_ld(
            r#"{"@type":["Movie","CreativeWork"],"name":"The Thing",
                "duration":109,"description":{"text":"?"},"director":42}"#,
        );
        let (showtimes, image) =
            parse_movie_page(&html, "https://www.central-cinema.com/movie/the-thing", &dates());
        assert_eq!(showtimes.len(), 1);
        let movie = &showtimes[0].movie;
        assert_eq!(movie.title, "The Thing");
        assert_eq!(movie.runtime, None);
        assert_eq!(movie.description, None);
        assert!(movie.directors.is_empty());
        assert_eq!(image, None);
    }

    #[test]
    fn non_movie_blocks_are_ignored() {
        let html = page_with_json_ld(r#"[{"@type":"Organization","name":"Central Cinema"}]"#);
        let (showtimes, _) =
            parse_movie_page(&html, "https://www.central-cinema.com/movie/x", &dates());
        assert!(showtimes.is_empty());
    }
}
