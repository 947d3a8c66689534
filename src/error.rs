use std::path::PathBuf;

/// Failure of a single fetch. Never fatal for the run, only for that URL.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request failed: {status} {reason} ({url})")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// A fixture is missing: a setup defect, not a live-site problem.
    #[error(
        "Mock file not found for URL: {url}. Expected at: {}. Run with RUN_MODE=update_mocks to generate mock files.",
        path.display()
    )]
    MockMissing { url: String, path: PathBuf },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn is_missing_mock(&self) -> bool {
        matches!(self, FetchError::MockMissing { .. })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DateError {
    #[error("Invalid time format: {0}")]
    InvalidTime(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Invalid selector: {0}")]
    Selector(String),
    #[error("[{scraper}] all {pages} calendar pages failed")]
    AllPagesFailed { scraper: String, pages: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid RUN_MODE '{0}'. Expected one of: mock, prod, update_mocks")]
    InvalidRunMode(String),
    #[error("Invalid MOCK_DATE '{0}'. Expected YYYY-MM-DDTHH:MM:SS")]
    InvalidMockDate(String),
    #[error("Invalid config '{name}'. Expected an integer number, got '{value}'")]
    InvalidNumber { name: String, value: String },
}
