use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, info};
use tokio::io::AsyncWriteExt;
use workon_backend::{ArchiveStore, BackendError, InstallProgress, ProgressSender};

/// Public bucket holding every Go release archive.
pub const RELEASES_URL: &str = "https://storage.googleapis.com/golang/";

/// [`ArchiveStore`] backed by the release bucket, or a mirror of it.
#[derive(Debug, Clone)]
pub struct ReleaseStore {
    client: reqwest::Client,
    base_url: String,
}

impl ReleaseStore {
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(mirror: Option<&str>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("workon/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| BackendError::network_request_from("build http client", error))?;
        Ok(Self::with_client(client, mirror.unwrap_or(RELEASES_URL)))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(
        &self,
        operation: &'static str,
        url: &str,
    ) -> Result<reqwest::Response, BackendError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| BackendError::network_request_from(operation, error))?;

        if !response.status().is_success() {
            return Err(BackendError::network_request(
                operation,
                format!("HTTP {} from {url}", response.status()),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl ArchiveStore for ReleaseStore {
    fn name(&self) -> &'static str {
        "release bucket"
    }

    fn url_for(&self, locator: &str) -> String {
        format!("{}{locator}", self.base_url)
    }

    async fn fetch_listing(&self, marker: Option<&str>) -> Result<String, BackendError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|error| BackendError::network_request_from("fetch listing", error))?;
        if let Some(marker) = marker {
            url.query_pairs_mut().append_pair("marker", marker);
        }

        debug!("Fetching release listing from {url}");
        self.get("fetch listing", url.as_str())
            .await?
            .text()
            .await
            .map_err(|error| BackendError::network_parse_from("fetch listing", error))
    }

    async fn fetch_text(&self, locator: &str) -> Result<String, BackendError> {
        let url = self.url_for(locator);
        self.get("fetch text", &url)
            .await?
            .text()
            .await
            .map_err(|error| BackendError::network_parse_from("fetch text", error))
    }

    async fn download(
        &self,
        locator: &str,
        dest: &Path,
        progress: Option<&ProgressSender>,
    ) -> Result<u64, BackendError> {
        let url = self.url_for(locator);
        info!("Downloading {url}");
        let response = self.get("download archive", &url).await?;

        let total = response.content_length().unwrap_or(0);
        let mut downloaded: u64 = 0;
        let write_context = || format!("write {}", dest.display());

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|error| BackendError::io(format!("create {}", dest.display()), error))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|error| BackendError::network_parse_from("download archive", error))?;
            file.write_all(&chunk)
                .await
                .map_err(|error| BackendError::io(write_context(), error))?;
            downloaded += chunk.len() as u64;
            if let Some(progress) = progress {
                let _ = progress
                    .send(InstallProgress::Downloading { downloaded, total })
                    .await;
            }
        }

        file.flush()
            .await
            .map_err(|error| BackendError::io(write_context(), error))?;

        info!("Download complete: {downloaded} bytes");
        Ok(downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let store = ReleaseStore::with_client(reqwest::Client::new(), "https://mirror.example/go");
        assert_eq!(store.base_url(), "https://mirror.example/go/");
        assert_eq!(
            store.url_for("go1.7.3.src.tar.gz"),
            "https://mirror.example/go/go1.7.3.src.tar.gz"
        );
    }

    #[test]
    fn default_store_uses_release_bucket() {
        let store = ReleaseStore::new(None).unwrap();
        assert_eq!(store.base_url(), RELEASES_URL);
    }
}
