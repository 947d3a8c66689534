use crate::error::FetchError;
use crate::mock_store::{image_url_to_filename, write_file};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, info};

/// Poster files served alongside the rendered site, plus the set of files
/// touched during this run so stale ones can be removed afterwards.
#[derive(Debug)]
pub struct ImageCache {
    dir: PathBuf,
    used: Mutex<HashSet<PathBuf>>,
}

impl ImageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            used: Mutex::new(HashSet::new()),
        }
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(image_url_to_filename(url))
    }

    pub fn track_used(&self, path: PathBuf) {
        if let Ok(mut used) = self.used.lock() {
            used.insert(path);
        }
    }

    pub fn used_count(&self) -> usize {
        self.used.lock().map(|used| used.len()).unwrap_or(0)
    }

    pub async fn store(&self, url: &str, bytes: &[u8]) -> Result<PathBuf, FetchError> {
        let path = self.path_for(url);
        write_file(&path, bytes).await?;
        self.track_used(path.clone());
        Ok(path)
    }

    /// Delete every file in the cache directory not stored during this run.
    /// Returns how many files were removed.
    pub async fn cleanup_unused_images(&self) -> usize {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // Nothing cached yet
            Err(e) if e.kind() == ErrorKind::NotFound => return 0,
            Err(e) => {
                error!("Error cleaning up unused images in {}: {}", self.dir.display(), e);
                return 0;
            }
        };

        let used = match self.used.lock() {
            Ok(used) => used.clone(),
            Err(_) => return 0,
        };

        let mut deleted = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    error!("Error reading {}: {}", self.dir.display(), e);
                    break;
                }
            };
            let path = entry.path();
            if used.contains(&path) {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    deleted += 1;
                    info!("Deleted unused image: {}", path.display());
                }
                Err(e) => error!("Could not delete {}: {}", path.display(), e),
            }
        }

        if deleted > 0 {
            info!("Cleaned up {} unused image(s)", deleted);
        } else {
            info!("No unused images to clean up");
        }
        deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cleanup_keeps_only_images_used_this_run() {
        let dir = std::env::temp_dir().join(format!("images-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("stale.jpg"), b"old").unwrap();

        let cache = ImageCache::new(&dir);
        let kept = cache
            .store("https://cdn.example.com/fresh.jpg?v=2", b"new")
            .await
            .unwrap();

        assert_eq!(cache.cleanup_unused_images().await, 1);
        assert!(kept.exists());
        assert!(!dir.join("stale.jpg").exists());
        assert_eq!(cache.used_count(), 1);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn cleanup_tolerates_missing_directory() {
        let dir = std::env::temp_dir().join(format!("images-{}", uuid::Uuid::new_v4()));
        let cache = ImageCache::new(dir);
        assert_eq!(cache.cleanup_unused_images().await, 0);
    }
}
