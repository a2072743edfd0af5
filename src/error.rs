//! Error types for the catalog data-orchestration layer.

use thiserror::Error;

/// Errors raised by remote collaborators and by configuration loading.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote call rejected ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Authentication required")]
    AuthRequired,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// True when the failure came from the remote side (transport or non-success reply).
    pub fn is_network(&self) -> bool {
        matches!(self, CatalogError::Network(_) | CatalogError::Remote { .. })
    }
}

impl From<config::ConfigError> for CatalogError {
    fn from(err: config::ConfigError) -> Self {
        CatalogError::Config(err.to_string())
    }
}
