use crate::config::{Config, RunMode};
use crate::error::FetchError;
use crate::image_cache::ImageCache;
use crate::mock_store::MockStore;
use reqwest::{Client, header};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// What every scraper fetches through. Implemented by [`ScrapeClient`] and by
/// in-memory fakes in tests.
#[async_trait::async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, FetchError>;

    async fn get_image(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Minimum spacing between requests, measured from the end of the previous
/// one. Callers that share a throttle queue up behind it.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last_finished: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_finished: Mutex::new(None),
        }
    }

    /// Wait out the delay, run `request`, then stamp its completion time.
    pub async fn run<F, T>(&self, request: F) -> T
    where
        F: Future<Output = T>,
    {
        let mut last_finished = self.last_finished.lock().await;
        if let Some(last) = *last_finished {
            let since = last.elapsed();
            if since < self.delay {
                tokio::time::sleep(self.delay - since).await;
            }
        }
        let out = request.await;
        *last_finished = Some(Instant::now());
        out
    }
}

/// HTTP client for scraping: mock replay, live, or live-and-record.
pub struct ScrapeClient {
    mode: RunMode,
    client: Client,
    throttle: Throttle,
    mocks: MockStore,
    images: Arc<ImageCache>,
}

impl ScrapeClient {
    pub fn new(config: &Config, images: Arc<ImageCache>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| FetchError::Network {
                url: String::new(),
                source,
            })?;

        Ok(Self {
            mode: config.run_mode,
            client,
            throttle: Throttle::new(Duration::from_millis(config.delay_ms)),
            mocks: MockStore::new(&config.mock_html_dir, &config.mock_images_dir),
            images,
        })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.throttle
            .run(async {
                let resp = self
                    .client
                    .get(url)
                    .header(header::USER_AGENT, USER_AGENT)
                    .send()
                    .await
                    .map_err(|source| FetchError::Network {
                        url: url.to_string(),
                        source,
                    })?;

                let status = resp.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                        reason: status.canonical_reason().unwrap_or("").to_string(),
                    });
                }

                let bytes = resp.bytes().await.map_err(|source| FetchError::Network {
                    url: url.to_string(),
                    source,
                })?;
                Ok(bytes.to_vec())
            })
            .await
    }
}

#[async_trait::async_trait]
impl Fetch for ScrapeClient {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        if self.mode == RunMode::Mock {
            return self.mocks.read_html(url).await;
        }

        let bytes = self.fetch_bytes(url).await?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        if self.mode == RunMode::UpdateMocks {
            match self.mocks.write_html(url, &body).await {
                Ok(path) => debug!("Saved mock {}", path.display()),
                Err(e) => warn!("Could not save mock for {}: {}", url, e),
            }
        }
        Ok(body)
    }

    async fn get_image(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let bytes = if self.mode == RunMode::Mock {
            self.mocks.read_image(url).await?
        } else {
            let bytes = self.fetch_bytes(url).await?;
            if self.mode == RunMode::UpdateMocks {
                if let Err(e) = self.mocks.write_image(url, &bytes).await {
                    warn!("Could not save mock image for {}: {}", url, e);
                }
            }
            bytes
        };

        self.images.store(url, &bytes).await?;
        Ok(bytes)
    }
}
