//! Cloud image fetcher
//!
//! Ensures a distro cloud image exists in the local cache directory,
//! downloading it once if absent. Presence is keyed purely on the filename;
//! the image is never re-validated afterwards (no checksum), so an
//! interrupted download can leave a corrupt file behind that later runs
//! will reuse.

use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::TemplateError;

/// Ensure `{dir}/{filename}` exists, downloading from `url` if absent.
///
/// Returns the path to the cached image. Idempotent: a second call with the
/// same target performs no network I/O.
pub async fn ensure_image(dir: &Path, url: &str, filename: &str) -> Result<PathBuf, TemplateError> {
    let target = dir.join(filename);

    if fs::metadata(&target).await.is_ok() {
        info!("Image already cached: {}", target.display());
        return Ok(target);
    }

    fs::create_dir_all(dir).await?;

    info!("Downloading {} to {}", url, target.display());
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| TemplateError::Download {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(TemplateError::Download {
            url: url.to_string(),
            message: format!("HTTP status {}", response.status()),
        });
    }

    let mut file = fs::File::create(&target).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = response.chunk().await.map_err(|e| TemplateError::Download {
        url: url.to_string(),
        message: e.to_string(),
    })? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    debug!("Wrote {} bytes to {}", written, target.display());
    info!("Download complete: {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_cached_image_skips_network() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("img.qcow2"), b"cached").unwrap();

        // The URL is unreachable; success proves no request was made
        let path = ensure_image(temp.path(), "http://127.0.0.1:1/img.qcow2", "img.qcow2")
            .await
            .unwrap();

        assert_eq!(path, temp.path().join("img.qcow2"));
        assert_eq!(std::fs::read(&path).unwrap(), b"cached");
    }

    #[tokio::test]
    async fn test_unreachable_mirror_is_download_error() {
        let temp = TempDir::new().unwrap();

        let err = ensure_image(temp.path(), "http://127.0.0.1:1/img.qcow2", "img.qcow2")
            .await
            .unwrap_err();

        assert!(matches!(err, TemplateError::Download { .. }));
    }
}
