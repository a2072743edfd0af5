//! Configuration System
//!
//! Debounce and logging settings for the catalog views. Layered with the `config` crate:
//! merge-policy defaults, then the global config file, then an explicit file, then
//! `MARQUEE__*` environment variables.

use crate::debounce::TriggerConfig;
use crate::error::CatalogError;
use crate::logging::LoggingConfig;
use crate::query::ExecuteMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Search-as-you-type view
    #[serde(default = "TriggerSettings::search_defaults")]
    pub search: TriggerSettings,

    /// Multi-filter browse view
    #[serde(default = "TriggerSettings::browse_defaults")]
    pub browse: TriggerSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            search: TriggerSettings::search_defaults(),
            browse: TriggerSettings::browse_defaults(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Debounce settings for one filter-driven view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSettings {
    /// Quiet interval in milliseconds
    pub debounce_ms: u64,

    /// Filter whose blank value means "no query"
    #[serde(default)]
    pub subject_key: Option<String>,
}

impl TriggerSettings {
    pub fn search_defaults() -> Self {
        Self {
            debounce_ms: 500,
            subject_key: Some("query".to_string()),
        }
    }

    pub fn browse_defaults() -> Self {
        Self {
            debounce_ms: 400,
            subject_key: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.debounce_ms == 0 {
            return Err("debounce_ms must be greater than zero".to_string());
        }
        if let Some(key) = &self.subject_key {
            if key.trim().is_empty() {
                return Err("subject_key cannot be empty".to_string());
            }
        }
        Ok(())
    }

    /// Trigger configuration using quiet re-execution
    pub fn trigger_config(&self) -> TriggerConfig {
        let config = TriggerConfig::new(Duration::from_millis(self.debounce_ms))
            .with_mode(ExecuteMode::Refetch);
        match &self.subject_key {
            Some(key) => config.with_subject(key.clone()),
            None => config,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Trigger(String, String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Trigger(view, msg) => write!(f, "View '{}': {}", view, msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl CatalogConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (view, settings) in [("search", &self.search), ("browse", &self.browse)] {
            if let Err(e) = settings.validate() {
                errors.push(ValidationError::Trigger(view.to_string(), e));
            }
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every problem into one error
    pub fn ensure_valid(&self) -> Result<(), CatalogError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            CatalogError::Config(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
