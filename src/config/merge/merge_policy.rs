//! Merge rules: defaults first, every later source overrides.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("search.debounce_ms", 500)?
        .set_default("search.subject_key", "query")?
        .set_default("browse.debounce_ms", 400)?
        .set_default("logging.level", "info")
}
