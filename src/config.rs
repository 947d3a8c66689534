use crate::error::ConfigError;
use chrono::NaiveDateTime;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const DEFAULT_MOCK_DATE: &str = "2026-01-19T12:00:00";
pub const DEFAULT_NOW_PLAYING_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Serve fixtures from disk, no network, no delay, frozen "now"
    Mock,
    Prod,
    /// Live network, and every successful body is saved as a fixture
    UpdateMocks,
}

impl RunMode {
    pub fn uses_network(&self) -> bool {
        !matches!(self, RunMode::Mock)
    }
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mock" => Ok(RunMode::Mock),
            "prod" => Ok(RunMode::Prod),
            "update_mocks" => Ok(RunMode::UpdateMocks),
            other => Err(ConfigError::InvalidRunMode(other.to_string())),
        }
    }
}

/// Everything the pipeline needs, built once and threaded through by value.
#[derive(Debug, Clone)]
pub struct Config {
    pub run_mode: RunMode,
    /// Pacific local time used as "now" in mock mode
    pub mock_date: NaiveDateTime,
    pub delay_ms: u64,
    pub mock_html_dir: PathBuf,
    pub mock_images_dir: PathBuf,
    pub out_dir: PathBuf,
    pub now_playing_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Mock,
            mock_date: parse_mock_date(DEFAULT_MOCK_DATE).unwrap_or_default(),
            delay_ms: DEFAULT_DELAY_MS,
            mock_html_dir: PathBuf::from("scrapers/mocks/html"),
            mock_images_dir: PathBuf::from("scrapers/mocks/images"),
            out_dir: PathBuf::from("out"),
            now_playing_days: DEFAULT_NOW_PLAYING_DAYS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any key lookup; `load` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let run_mode = match lookup("RUN_MODE") {
            Some(value) => value.parse()?,
            None => defaults.run_mode,
        };
        let mock_date = match lookup("MOCK_DATE") {
            Some(value) => parse_mock_date(&value)?,
            None => defaults.mock_date,
        };

        Ok(Config {
            run_mode,
            mock_date,
            delay_ms: load_number(&lookup, "SCRAPE_DELAY_MS")?.unwrap_or(defaults.delay_ms),
            mock_html_dir: lookup("MOCK_HTML_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.mock_html_dir),
            mock_images_dir: lookup("MOCK_IMAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.mock_images_dir),
            out_dir: lookup("OUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.out_dir),
            now_playing_days: load_number(&lookup, "NOW_PLAYING_DAYS")?
                .unwrap_or(defaults.now_playing_days),
        })
    }

    pub fn out_images_dir(&self) -> PathBuf {
        self.out_dir.join("images")
    }
}

fn parse_mock_date(value: &str) -> Result<NaiveDateTime, ConfigError> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| ConfigError::InvalidMockDate(value.to_string()))
}

fn load_number<F, N>(lookup: &F, name: &str) -> Result<Option<N>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    N: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber {
                name: name.to_string(),
                value,
            }),
        None => Ok(None),
    }
}
