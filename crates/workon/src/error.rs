use thiserror::Error;
use workon_backend::BackendError;
use workon_platform::AppPathsError;

use crate::storage::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Paths(#[from] AppPathsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Environment {0:?} already exists")]
    EnvironmentExists(String),

    #[error(
        "Go {version} for environment {name:?} is not installed; \
         run `workon update {name} --go-version {version}`"
    )]
    NotInstalled { name: String, version: String },

    #[error("{0}")]
    Usage(String),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// The error and each of its causes, outermost first.
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let message = cause.to_string();
            if messages.last() != Some(&message) {
                messages.push(message);
            }
            source = cause.source();
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use workon_backend::BackendError;

    use super::AppError;
    use crate::storage::ConfigError;

    #[test]
    fn chain_lists_causes_in_order() {
        let error = AppError::from(ConfigError::Write {
            path: "/data/settings.json".into(),
            source: std::io::Error::other("disk full"),
        });

        assert_eq!(
            error.chain(),
            vec![
                "Failed to write /data/settings.json".to_string(),
                "disk full".to_string()
            ]
        );
    }

    #[test]
    fn backend_errors_display_unchanged() {
        let error = AppError::from(BackendError::not_found("1.9"));
        assert_eq!(error.to_string(), "Version not found: 1.9");
        assert_eq!(error.chain().len(), 1);
    }

    #[test]
    fn not_installed_suggests_update() {
        let error = AppError::NotInstalled {
            name: "juju".to_string(),
            version: "1.7.3".to_string(),
        };
        assert!(
            error
                .to_string()
                .contains("workon update juju --go-version 1.7.3")
        );
    }
}
