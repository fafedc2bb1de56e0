use std::io;

use thiserror::Error;

/// Library-wide error type for repokit operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Declaration file missing at the given path.
    #[error("Configuration file not found: {0}")]
    ConfigFileNotFound(String),

    /// YAML parsing error in the declaration file or an embedded catalog.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Language identifier is invalid.
    #[error("Invalid language '{0}': must be one of go, rust, python, shell")]
    InvalidLanguage(String),

    /// Repository name does not appear in the declaration list.
    #[error("Repository '{0}' is not declared in the configuration")]
    RepositoryNotDeclared(String),

    /// Embedded asset missing from the compiled-in catalog.
    #[error("Missing embedded asset: {0}")]
    MissingAsset(String),

    /// Template rendering failed.
    #[error("Failed to render template '{template}': {reason}")]
    TemplateRender { template: String, reason: String },

    /// GitHub API returned a non-success status.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// GITHUB_TOKEN is not set in the process environment.
    #[error("GITHUB_TOKEN environment variable not set")]
    TokenMissing,
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn render_error<S: Into<String>>(template: S, err: impl std::fmt::Display) -> Self {
        AppError::TemplateRender { template: template.into(), reason: err.to_string() }
    }
}
