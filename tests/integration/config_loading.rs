//! Integration tests for configuration loading and logging setup

use crate::integration::test_utils::{Catalog, SavedStore, Session};
use marquee::logging::{init_logging, LogFormat, LoggingConfig};
use marquee::{CatalogConfig, CatalogError, CatalogRuntime, ConfigLoader};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_file_config_drives_runtime_views() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("marquee.toml");
    std::fs::write(
        &config_file,
        r#"
[search]
debounce_ms = 300

[browse]
debounce_ms = 150

[logging]
level = "warn"
format = "json"

[logging.modules]
"marquee::saved" = "debug"
"#,
    )
    .unwrap();

    let config: CatalogConfig = ConfigLoader::load_from_file(&config_file).unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(
        config.logging.modules.get("marquee::saved").map(String::as_str),
        Some("debug")
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    rt.block_on(async {
        let runtime = CatalogRuntime::new(
            config,
            Session::new(false),
            SavedStore::new(Duration::ZERO),
            Catalog::new(),
        );
        let search = runtime.search_view();
        let browse = runtime.browse_view();
        assert_eq!(search.config().delay, Duration::from_millis(300));
        assert_eq!(search.config().subject_key.as_deref(), Some("query"));
        assert_eq!(browse.config().delay, Duration::from_millis(150));
        assert_eq!(browse.config().subject_key, None);
    });
}

#[test]
fn test_malformed_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("marquee.toml");
    std::fs::write(&config_file, "[search]\ndebounce_ms = \"soon\"\n").unwrap();

    let result = ConfigLoader::load_from_file(&config_file);
    assert!(matches!(result, Err(CatalogError::Config(_))));
}

#[test]
fn test_invalid_logging_section_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("marquee.toml");
    std::fs::write(&config_file, "[logging]\nlevel = \"chatty\"\n").unwrap();

    let err = ConfigLoader::load_from_file(&config_file).unwrap_err();
    assert!(err.to_string().contains("chatty"));
}

#[test]
fn test_logging_installs_once() {
    let config = LoggingConfig {
        level: "off".to_string(),
        ..LoggingConfig::default()
    };
    assert!(init_logging(Some(&config)).is_ok());
    assert!(matches!(
        init_logging(Some(&config)),
        Err(CatalogError::Config(_))
    ));
}
