use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error(transparent)]
    Parse(#[from] crate::types::VersionParseError),

    #[error("Malformed release listing: {details}")]
    ListingParse { details: String },

    #[error("Version not found: {version}")]
    VersionNotFound { version: String },

    #[error("Network error during {operation} ({stage}): {details}")]
    NetworkError {
        operation: &'static str,
        stage: NetworkStage,
        details: String,
    },

    #[error("Extraction failed at {}: {source}", path.display())]
    ExtractError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Build of {version} failed: {details}")]
    BuildError { version: String, details: String },

    #[error("Checksum mismatch for {locator}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        locator: String,
        expected: String,
        actual: String,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStage {
    #[error("request")]
    Request,
    #[error("response parse")]
    ResponseParse,
}

impl BackendError {
    pub fn network_request(operation: &'static str, details: impl Into<String>) -> Self {
        Self::NetworkError {
            operation,
            stage: NetworkStage::Request,
            details: details.into(),
        }
    }

    pub fn network_request_from<E>(operation: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::network_request(operation, error.to_string())
    }

    pub fn network_parse(operation: &'static str, details: impl Into<String>) -> Self {
        Self::NetworkError {
            operation,
            stage: NetworkStage::ResponseParse,
            details: details.into(),
        }
    }

    pub fn network_parse_from<E>(operation: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::network_parse(operation, error.to_string())
    }

    pub fn extract(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ExtractError {
            path: path.into(),
            source,
        }
    }

    pub fn build_failed(version: impl ToString, details: impl Into<String>) -> Self {
        Self::BuildError {
            version: version.to_string(),
            details: details.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn not_found(version: impl ToString) -> Self {
        Self::VersionNotFound {
            version: version.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::{BackendError, NetworkStage};

    #[test]
    fn network_helpers_set_expected_stage() {
        let request = BackendError::network_request("fetch listing", "timed out");
        assert!(matches!(
            request,
            BackendError::NetworkError {
                operation: "fetch listing",
                stage: NetworkStage::Request,
                ..
            }
        ));

        let parse = BackendError::network_parse("fetch listing", "truncated body");
        assert!(matches!(
            parse,
            BackendError::NetworkError {
                operation: "fetch listing",
                stage: NetworkStage::ResponseParse,
                ..
            }
        ));
    }

    #[test]
    fn network_error_display_names_operation_and_stage() {
        let error = BackendError::network_request("download archive", "connection reset");
        assert_eq!(
            error.to_string(),
            "Network error during download archive (request): connection reset"
        );
    }

    #[test]
    fn extract_error_keeps_io_source() {
        let error = BackendError::extract(
            "/tmp/installs/1.7/go/bin/go",
            std::io::Error::other("disk full"),
        );
        assert!(error.to_string().contains("/tmp/installs/1.7/go/bin/go"));
        let source = error.source().expect("extract error should carry a source");
        assert_eq!(source.to_string(), "disk full");
    }

    #[test]
    fn parse_error_is_transparent() {
        let parse_error = "1.x".parse::<crate::Version>().unwrap_err();
        let error = BackendError::from(parse_error.clone());
        assert_eq!(error.to_string(), parse_error.to_string());
    }

    #[test]
    fn not_found_display_includes_version() {
        assert_eq!(
            BackendError::not_found("1.9").to_string(),
            "Version not found: 1.9"
        );
    }
}
