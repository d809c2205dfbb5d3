use async_trait::async_trait;
use std::path::Path;

use crate::error::BackendError;
use crate::types::ProgressSender;

/// Remote storage holding the release listing and the release archives.
///
/// Locators are the object keys found in the listing; they are resolved
/// against the store's base location.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fully qualified location of `locator`, used for logging.
    fn url_for(&self, locator: &str) -> String;

    /// Fetch one page of the listing document, starting after `marker` when
    /// given.
    async fn fetch_listing(&self, marker: Option<&str>) -> Result<String, BackendError>;

    async fn fetch_text(&self, locator: &str) -> Result<String, BackendError>;

    /// Stream the object at `locator` into `dest`, returning the number of
    /// bytes written.
    async fn download(
        &self,
        locator: &str,
        dest: &Path,
        progress: Option<&ProgressSender>,
    ) -> Result<u64, BackendError>;

    /// Fetch a `sha256sum`-style companion file and return its lowercase
    /// digest.
    async fn fetch_checksum(&self, locator: &str) -> Result<String, BackendError> {
        let text = self.fetch_text(locator).await?;
        let digest = text.split_whitespace().next().unwrap_or_default();
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BackendError::network_parse(
                "fetch checksum",
                format!("{locator} does not contain a sha256 digest"),
            ));
        }
        Ok(digest.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    struct MockStore {
        objects: HashMap<&'static str, &'static str>,
    }

    #[async_trait]
    impl ArchiveStore for MockStore {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn url_for(&self, locator: &str) -> String {
            format!("mock://{locator}")
        }

        async fn fetch_listing(&self, _marker: Option<&str>) -> Result<String, BackendError> {
            Ok(String::new())
        }

        async fn fetch_text(&self, locator: &str) -> Result<String, BackendError> {
            self.objects
                .get(locator)
                .map(|s| (*s).to_string())
                .ok_or_else(|| BackendError::network_request("fetch text", "404"))
        }

        async fn download(
            &self,
            _locator: &str,
            _dest: &Path,
            _progress: Option<&ProgressSender>,
        ) -> Result<u64, BackendError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn fetch_checksum_reads_first_token() {
        let store = MockStore {
            objects: HashMap::from([(
                "go1.7.3.src.tar.gz.sha256",
                "79430A0027A09B0B3AD57E214C4C1ACFDD7AF290961DD08D322818895AF1EF44  go1.7.3.src.tar.gz\n",
            )]),
        };

        let digest = store
            .fetch_checksum("go1.7.3.src.tar.gz.sha256")
            .await
            .expect("checksum should parse");

        assert_eq!(
            digest,
            "79430a0027a09b0b3ad57e214c4c1acfdd7af290961dd08d322818895af1ef44"
        );
    }

    #[tokio::test]
    async fn fetch_checksum_rejects_garbage() {
        let store = MockStore {
            objects: HashMap::from([("bad.sha256", "<html>not found</html>")]),
        };

        let result = store.fetch_checksum("bad.sha256").await;

        assert!(matches!(result, Err(BackendError::NetworkError { .. })));
    }
}
