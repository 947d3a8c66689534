#![allow(dead_code)]

use seattle_showtimes::FetchError;
use seattle_showtimes::scrape_client::Fetch;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Serves canned HTML by URL and records every request.
#[derive(Default)]
pub struct FakeFetch {
    pages: HashMap<String, String>,
    images: HashSet<String>,
    page_calls: Mutex<Vec<String>>,
    image_calls: Mutex<Vec<String>>,
}

impl FakeFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_image(mut self, url: &str) -> Self {
        self.images.insert(url.to_string());
        self
    }

    pub fn page_calls(&self, url: &str) -> usize {
        self.page_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|u| *u == url)
            .count()
    }

    pub fn total_page_calls(&self) -> usize {
        self.page_calls.lock().unwrap().len()
    }

    pub fn image_calls(&self) -> Vec<String> {
        self.image_calls.lock().unwrap().clone()
    }

    fn not_found(url: &str) -> FetchError {
        FetchError::Status {
            url: url.to_string(),
            status: 404,
            reason: "Not Found".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Fetch for FakeFetch {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        self.page_calls.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }

    async fn get_image(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.image_calls.lock().unwrap().push(url.to_string());
        if self.images.contains(url) {
            Ok(b"\x89PNG".to_vec())
        } else {
            Err(Self::not_found(url))
        }
    }
}
