//! Config loading facade: assembles sources in precedence order and deserializes.

use super::merge::merge_policy;
use super::sources::{environment, explicit_file, global_file};
use super::CatalogConfig;
use crate::error::CatalogError;
use std::path::Path;
use tracing::debug;

/// Loads [`CatalogConfig`] from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, optional explicit file, then environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<CatalogConfig, CatalogError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            builder = explicit_file::add_to_builder(builder, path)?;
        }
        builder = environment::add_to_builder(builder);

        let config: CatalogConfig = builder.build()?.try_deserialize()?;
        config.ensure_valid()?;
        debug!(
            search_debounce_ms = config.search.debounce_ms,
            browse_debounce_ms = config.browse.debounce_ms,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Defaults overlaid with a single file; ignores global file and environment.
    pub fn load_from_file(path: &Path) -> Result<CatalogConfig, CatalogError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = explicit_file::add_to_builder(builder, path)?;
        let config: CatalogConfig = builder.build()?.try_deserialize()?;
        config.ensure_valid()?;
        Ok(config)
    }

    /// Built-in defaults only
    pub fn default() -> CatalogConfig {
        CatalogConfig::default()
    }
}
