mod common;

use common::FakeFetch;
use seattle_showtimes::base_scraper::BaseScraper;
use seattle_showtimes::beacon::BeaconScraper;
use seattle_showtimes::config::{Config, RunMode};
use seattle_showtimes::image_cache::ImageCache;
use seattle_showtimes::mock_store::MockStore;
use seattle_showtimes::scrape_client::ScrapeClient;
use seattle_showtimes::theaters::TheaterId;
use std::path::PathBuf;
use std::sync::Arc;

const CALENDAR_URL: &str = "https://thebeacon.film/calendar";
const FILM_URL: &str = "https://thebeacon.film/calendar/movie/real-film";
const POSTER_URL: &str = "https://thebeacon.film/uploads/real-film.jpg";

const CALENDAR: &str = include_str!("fixtures/beacon_calendar.html");
const FILM_PAGE: &str = include_str!("fixtures/beacon_real_film.html");

fn temp_root() -> PathBuf {
    std::env::temp_dir().join(format!("beacon-{}", uuid::Uuid::new_v4()))
}

#[test_log::test(tokio::test)]
async fn rental_slot_is_filtered_and_real_film_is_pacific() {
    let fetch = Arc::new(
        FakeFetch::new()
            .with_page(CALENDAR_URL, CALENDAR)
            .with_page(FILM_URL, FILM_PAGE)
            .with_image(POSTER_URL),
    );
    let scraper = BaseScraper::new(BeaconScraper::new(), fetch.clone());

    let showtimes = scraper.get_showtimes().await.unwrap();

    assert_eq!(showtimes.len(), 1);
    let showtime = &showtimes[0];
    assert_eq!(showtime.movie.title, "Real Film");
    assert_eq!(showtime.theater.id, TheaterId::Beacon);
    assert_eq!(showtime.datetime.to_rfc3339(), "2026-01-20T19:45:00-08:00");
    assert_eq!(showtime.movie.url.as_deref(), Some(FILM_URL));
    assert_eq!(showtime.movie.image_url.as_deref(), Some(POSTER_URL));
    // The rental's page is never visited.
    assert_eq!(
        fetch.page_calls("https://thebeacon.film/calendar/movie/rent-the-beacon"),
        0
    );
}

#[test_log::test(tokio::test)]
async fn replays_fixtures_in_mock_mode() {
    let root = temp_root();
    let config = Config {
        run_mode: RunMode::Mock,
        delay_ms: 0,
        mock_html_dir: root.join("html"),
        mock_images_dir: root.join("images"),
        out_dir: root.join("out"),
        ..Config::default()
    };
    let mocks = MockStore::new(&config.mock_html_dir, &config.mock_images_dir);
    mocks.write_html(CALENDAR_URL, CALENDAR).await.unwrap();
    mocks.write_html(FILM_URL, FILM_PAGE).await.unwrap();
    mocks.write_image(POSTER_URL, b"jpeg").await.unwrap();

    let images = Arc::new(ImageCache::new(config.out_images_dir()));
    std::fs::create_dir_all(config.out_images_dir()).unwrap();
    std::fs::write(config.out_images_dir().join("stale.jpg"), b"old").unwrap();

    let client = Arc::new(ScrapeClient::new(&config, images.clone()).unwrap());
    let scraper = BaseScraper::new(BeaconScraper::new(), client);
    let showtimes = scraper.get_showtimes().await.unwrap();

    assert_eq!(showtimes.len(), 1);
    assert_eq!(showtimes[0].movie.image_url.as_deref(), Some(POSTER_URL));
    assert_eq!(images.used_count(), 1);
    assert_eq!(images.cleanup_unused_images().await, 1);
    assert!(images.path_for(POSTER_URL).exists());

    let _ = std::fs::remove_dir_all(root);
}

#[test_log::test(tokio::test)]
async fn missing_calendar_fixture_fails_the_theater() {
    let root = temp_root();
    let config = Config {
        run_mode: RunMode::Mock,
        mock_html_dir: root.join("html"),
        mock_images_dir: root.join("images"),
        out_dir: root.join("out"),
        ..Config::default()
    };
    let images = Arc::new(ImageCache::new(config.out_images_dir()));
    let client = Arc::new(ScrapeClient::new(&config, images).unwrap());

    let result = BaseScraper::new(BeaconScraper::new(), client)
        .get_showtimes()
        .await;

    assert!(result.is_err());
}
