//! Local image cache

use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tracing::{debug, trace};
use url::Url;

use crate::sync::error::AssetError;

/// A local cache of remote assets
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait AssetCache: Send + Sync {
    /// Fetch one URL into the cache
    async fn fetch(&self, url: &str) -> Result<(), AssetError>;

    /// Discard every cached entry, returning how many were removed
    fn clear(&self) -> Result<usize, AssetError>;
}

/// Asset cache that stores response bodies as files in a directory
pub struct DiskAssetCache {
    client: reqwest::Client,
    dir: PathBuf,
}

impl DiskAssetCache {
    pub fn new(dir: &Path, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("ddragon-sync")
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            dir: dir.to_path_buf(),
        }
    }

    /// Path a URL is cached under
    ///
    /// `http://host/cdn/img/champion/splash/Aatrox_0.jpg` -> `cdn_img_champion_splash_Aatrox_0.jpg`
    pub fn path_for(&self, url: &str) -> Result<PathBuf, AssetError> {
        let parsed = Url::parse(url).map_err(|_| AssetError::InvalidUrl(url.to_string()))?;
        let name = parsed
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty() && *s != "." && *s != "..")
                    .collect::<Vec<_>>()
                    .join("_")
            })
            .unwrap_or_default();

        if name.is_empty() {
            return Err(AssetError::InvalidUrl(url.to_string()));
        }
        Ok(self.dir.join(name))
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    PathBuf::from(partial)
}

#[async_trait::async_trait]
impl AssetCache for DiskAssetCache {
    async fn fetch(&self, url: &str) -> Result<(), AssetError> {
        let path = self.path_for(url)?;

        if tokio::fs::try_exists(&path).await? {
            trace!("Cache hit for {}", url);
            return Ok(());
        }

        trace!("Caching image {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        trace!("Got response code {} for {}", status, url);

        if !status.is_success() {
            return Err(AssetError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Only a complete body may appear under the cached name
        let partial = partial_path(&path);
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, &path).await?;
        Ok(())
    }

    fn clear(&self) -> Result<usize, AssetError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if path.is_file() {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }

        debug!("Removed {} cached asset(s) from {:?}", removed, self.dir);
        Ok(removed)
    }
}
