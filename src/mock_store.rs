//! File-backed stand-in for the network, keyed by URL.
//!
//! Fixtures live at `<mock_html_dir>/<filename>` and
//! `<mock_images_dir>/<filename>`, where the filename is derived from the URL
//! alone so the same URL always replays the same file.

use crate::error::FetchError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const UNSAFE_CHARS: [char; 10] = ['/', '\\', '%', '*', ':', '|', '"', '<', '>', '?'];

fn url_to_filename(url: &str, keep_query: bool) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    let trimmed = if keep_query {
        without_scheme
    } else {
        without_scheme
            .split_once('?')
            .map(|(path, _)| path)
            .unwrap_or(without_scheme)
    };

    let mut filename: String = trimmed
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();

    if !has_extension(&filename) {
        filename.push_str(".html");
    }
    filename
}

/// True when the name ends in `.` followed by one or more ASCII alphanumerics.
fn has_extension(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}

/// Filename for a page. Query strings are kept: they usually select the date.
pub fn html_url_to_filename(url: &str) -> String {
    url_to_filename(url, true)
}

/// Filename for an image. CDN cache-busting query strings are dropped.
pub fn image_url_to_filename(url: &str) -> String {
    url_to_filename(url, false)
}

#[derive(Debug, Clone)]
pub struct MockStore {
    html_dir: PathBuf,
    images_dir: PathBuf,
}

impl MockStore {
    pub fn new(html_dir: impl Into<PathBuf>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            html_dir: html_dir.into(),
            images_dir: images_dir.into(),
        }
    }

    pub fn html_path(&self, url: &str) -> PathBuf {
        self.html_dir.join(html_url_to_filename(url))
    }

    pub fn image_path(&self, url: &str) -> PathBuf {
        self.images_dir.join(image_url_to_filename(url))
    }

    pub async fn read_html(&self, url: &str) -> Result<String, FetchError> {
        let path = self.html_path(url);
        let bytes = read_fixture(url, &path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn read_image(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        read_fixture(url, &self.image_path(url)).await
    }

    pub async fn write_html(&self, url: &str, body: &str) -> Result<PathBuf, FetchError> {
        let path = self.html_path(url);
        write_file(&path, body.as_bytes()).await?;
        Ok(path)
    }

    pub async fn write_image(&self, url: &str, bytes: &[u8]) -> Result<PathBuf, FetchError> {
        let path = self.image_path(url);
        write_file(&path, bytes).await?;
        Ok(path)
    }
}

async fn read_fixture(url: &str, path: &Path) -> Result<Vec<u8>, FetchError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(FetchError::MockMissing {
            url: url.to_string(),
            path: path.to_path_buf(),
        }),
        Err(source) => Err(FetchError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(crate) async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), FetchError> {
    let io_err = |source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, bytes).await.map_err(io_err)
}
