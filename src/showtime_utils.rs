//! Sorting, windowing and grouping of the aggregated showtimes for the
//! calendar and now-playing views. Everything here is pure and keeps the
//! order in which keys first appear.

use crate::date_manager::DateManager;
use crate::theaters::Theater;
use crate::{Movie, Showtime};
use chrono::Duration;
use chrono_tz::America::Los_Angeles;
use indexmap::IndexMap;
use serde::Serialize;

/// Day label ("Monday, January 19") to that day's showtimes.
pub type ShowtimesByDate = IndexMap<String, Vec<Showtime>>;

/// `"{title}~{theater id}"` to that movie's showtimes at that theater.
pub type ShowtimesByMovieTheater = IndexMap<String, Vec<Showtime>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieTheaterGroup {
    pub movie: Movie,
    pub theater: &'static Theater,
    /// "7:45 PM" labels in listing order.
    pub times: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TheaterShowtimes {
    pub theater: &'static Theater,
    pub showtimes: Vec<Showtime>,
}

/// One now-playing card: a film and every theater showing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieGroup {
    pub movie: Movie,
    pub theaters: IndexMap<String, TheaterShowtimes>,
}

pub fn sort_chronologically(showtimes: &[Showtime]) -> Vec<Showtime> {
    let mut sorted = showtimes.to_vec();
    // stable
    sorted.sort_by_key(|s| s.datetime);
    sorted
}

pub fn filter_from_today(showtimes: &[Showtime], dates: &DateManager) -> Vec<Showtime> {
    let start = dates.start_of_today();
    showtimes
        .iter()
        .filter(|s| s.datetime >= start)
        .cloned()
        .collect()
}

/// Showtimes in `[start of today, start of today + days)`.
pub fn filter_for_next_days(
    showtimes: &[Showtime],
    days: u32,
    dates: &DateManager,
) -> Vec<Showtime> {
    let start = dates.start_of_today();
    let end = start + Duration::days(i64::from(days));
    showtimes
        .iter()
        .filter(|s| s.datetime >= start && s.datetime < end)
        .cloned()
        .collect()
}

pub fn day_label(showtime: &Showtime) -> String {
    showtime
        .datetime
        .with_timezone(&Los_Angeles)
        .format("%A, %B %-d")
        .to_string()
}

pub fn time_label(showtime: &Showtime) -> String {
    showtime
        .datetime
        .with_timezone(&Los_Angeles)
        .format("%-I:%M %p")
        .to_string()
}

pub fn movie_theater_key(showtime: &Showtime) -> String {
    format!("{}~{}", showtime.movie.title, showtime.theater.id)
}

pub fn group_by_date(showtimes: &[Showtime]) -> ShowtimesByDate {
    let mut groups = ShowtimesByDate::new();
    for showtime in showtimes {
        groups
            .entry(day_label(showtime))
            .or_default()
            .push(showtime.clone());
    }
    groups
}

pub fn group_by_movie_and_theater(showtimes: &[Showtime]) -> ShowtimesByMovieTheater {
    let mut groups = ShowtimesByMovieTheater::new();
    for showtime in showtimes {
        groups
            .entry(movie_theater_key(showtime))
            .or_default()
            .push(showtime.clone());
    }
    groups
}

/// Within one day: `"{title}@{theater name}"` to its time labels.
pub fn group_day_showtimes_by_movie_theater(
    showtimes: &[Showtime],
) -> IndexMap<String, MovieTheaterGroup> {
    let mut groups: IndexMap<String, MovieTheaterGroup> = IndexMap::new();
    for showtime in showtimes {
        let key = format!("{}@{}", showtime.movie.title, showtime.theater.name);
        groups
            .entry(key)
            .or_insert_with(|| MovieTheaterGroup {
                movie: showtime.movie.clone(),
                theater: showtime.theater,
                times: Vec::new(),
            })
            .times
            .push(time_label(showtime));
    }
    groups
}

/// Fold movie+theater buckets under their title. Each theater's showtimes
/// come out sorted; the card's movie is the first one seen for that title.
pub fn group_by_movie(by_movie_theater: ShowtimesByMovieTheater) -> IndexMap<String, MovieGroup> {
    let mut groups: IndexMap<String, MovieGroup> = IndexMap::new();
    for (key, showtimes) in by_movie_theater {
        // Titles may contain '~'; theater ids never do.
        let Some((title, theater_id)) = key.rsplit_once('~') else {
            continue;
        };
        if title.is_empty() || theater_id.is_empty() {
            continue;
        }
        let Some(first) = showtimes.first() else {
            continue;
        };
        let theater = first.theater;
        let movie = first.movie.clone();

        groups
            .entry(title.to_string())
            .or_insert_with(|| MovieGroup {
                movie,
                theaters: IndexMap::new(),
            })
            .theaters
            .insert(
                theater_id.to_string(),
                TheaterShowtimes {
                    theater,
                    showtimes: sort_chronologically(&showtimes),
                },
            );
    }
    groups
}
