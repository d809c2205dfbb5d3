use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use serde::Deserialize;
use workon_backend::{ArchiveStore, BackendError, Version};

/// Every release object key starts with this prefix.
pub const ARCHIVE_PREFIX: &str = "go";
/// Suffix of source-distribution archives in the release listing.
pub const ARCHIVE_SUFFIX: &str = ".src.tar.gz";
const CHECKSUM_SUFFIX: &str = ".sha256";

#[derive(Debug, Default, Deserialize)]
struct ListingPage {
    #[serde(rename = "IsTruncated", default)]
    is_truncated: bool,
    #[serde(rename = "NextMarker", default)]
    next_marker: Option<String>,
    #[serde(rename = "Contents", default)]
    contents: Vec<ListedObject>,
}

#[derive(Debug, Deserialize)]
struct ListedObject {
    #[serde(rename = "Key")]
    key: String,
}

fn parse_page(xml: &str) -> Result<ListingPage, BackendError> {
    quick_xml::de::from_str(xml).map_err(|error| BackendError::ListingParse {
        details: error.to_string(),
    })
}

/// Recover the version from a source archive key such as `go1.7.3.src.tar.gz`.
fn version_from_key(key: &str) -> Option<Version> {
    let text = key
        .strip_suffix(ARCHIVE_SUFFIX)?
        .strip_prefix(ARCHIVE_PREFIX)?;
    text.parse().ok()
}

/// Releases available remotely, one entry per `major.minor` line holding
/// that line's greatest patch.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    lines: HashMap<String, (Version, String)>,
    checksums: HashSet<String>,
}

impl Catalog {
    /// Parse a single listing document.
    ///
    /// # Errors
    /// Returns [`BackendError::ListingParse`] when the document is not a
    /// valid listing.
    pub fn from_listing(xml: &str) -> Result<Self, BackendError> {
        let mut catalog = Self::default();
        catalog.merge(parse_page(xml)?);
        Ok(catalog)
    }

    /// Fetch every listing page from `store` and build the catalog.
    ///
    /// # Errors
    /// Returns a network error when a page cannot be fetched, or
    /// [`BackendError::ListingParse`] when a page is malformed.
    pub async fn list_available(store: &dyn ArchiveStore) -> Result<Self, BackendError> {
        let mut catalog = Self::default();
        let mut marker: Option<String> = None;

        loop {
            let xml = store.fetch_listing(marker.as_deref()).await?;
            let page = parse_page(&xml)?;
            let truncated = page.is_truncated;
            let next = page
                .next_marker
                .clone()
                .or_else(|| page.contents.last().map(|object| object.key.clone()));
            let objects = page.contents.len();
            catalog.merge(page);
            debug!(
                "Read {objects} objects from {} listing (truncated: {truncated})",
                store.name()
            );

            if !truncated {
                break;
            }
            match next {
                Some(next) if marker.as_deref() != Some(next.as_str()) => marker = Some(next),
                _ => {
                    warn!("Listing reported more pages without a usable marker; stopping");
                    break;
                }
            }
        }

        debug!("Catalog holds {} release lines", catalog.lines.len());
        Ok(catalog)
    }

    fn merge(&mut self, page: ListingPage) {
        for object in page.contents {
            if object.key.ends_with(CHECKSUM_SUFFIX) {
                self.checksums.insert(object.key);
                continue;
            }
            // Betas and release candidates fail to parse and are skipped.
            let Some(version) = version_from_key(&object.key) else {
                continue;
            };
            self.insert(version, object.key);
        }
    }

    fn insert(&mut self, version: Version, locator: String) {
        match self.lines.get(&version.line_key()) {
            Some((kept, _)) if !version.is_newer_than(kept) => {}
            _ => {
                self.lines.insert(version.line_key(), (version, locator));
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Listed versions with their archive locators, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<(Version, &str)> {
        let mut entries: Vec<(Version, &str)> = self
            .lines
            .values()
            .map(|(version, locator)| (*version, locator.as_str()))
            .collect();
        entries.sort_by_key(|(version, _)| *version);
        entries
    }

    #[must_use]
    pub fn locator(&self, version: Version) -> Option<&str> {
        self.lines
            .get(&version.line_key())
            .filter(|(listed, _)| *listed == version)
            .map(|(_, locator)| locator.as_str())
    }

    /// Locator of the published SHA-256 digest for `version`, when listed.
    #[must_use]
    pub fn checksum_locator(&self, version: Version) -> Option<String> {
        let candidate = format!("{}{CHECKSUM_SUFFIX}", self.locator(version)?);
        self.checksums.contains(&candidate).then_some(candidate)
    }

    #[must_use]
    pub fn newest(&self) -> Option<Version> {
        self.lines.values().map(|(version, _)| *version).max()
    }

    /// Resolve a requested `X.Y` or `X.Y.Z` to a listed version.
    ///
    /// A request without a patch selects the newest patch of its line; a
    /// request with a patch must be listed exactly.
    ///
    /// # Errors
    /// Returns a parse error for malformed text, or
    /// [`BackendError::VersionNotFound`] when nothing listed matches.
    pub fn resolve(&self, requested: &str) -> Result<Version, BackendError> {
        let wanted: Version = requested.parse()?;
        let (listed, _) = self
            .lines
            .get(&wanted.line_key())
            .ok_or_else(|| BackendError::not_found(wanted))?;

        if wanted.has_patch() && *listed != wanted {
            return Err(BackendError::not_found(wanted));
        }
        Ok(*listed)
    }
}
