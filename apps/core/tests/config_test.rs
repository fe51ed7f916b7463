use std::fs;

use edge_deflector_core::config::{
    Config, ConfigError, ConfigProvider, FileProvider, RegistryProvider, REGISTRY_SUBKEY,
    SEARCH_ENGINE_KEY,
};
use edge_deflector_core::search_engine::SearchEngine;

#[test]
fn file_provider_reads_search_engine() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("config.toml");
    fs::write(&path, "SearchEngine = \"DuckDuckGo\"\n").expect("config should be written");

    let provider = FileProvider::new(&path);
    assert_eq!(
        provider.get_string(SEARCH_ENGINE_KEY).as_deref(),
        Some("DuckDuckGo")
    );
    assert_eq!(
        Config::load(&provider).search_engine,
        Some(SearchEngine::DuckDuckGo)
    );
}

#[test]
fn missing_file_is_absent_not_an_error() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let provider = FileProvider::new(dir.path().join("missing.toml"));

    assert!(matches!(provider.read_table(), Ok(None)));
    assert_eq!(provider.get_string(SEARCH_ENGINE_KEY), None);
    assert_eq!(Config::load(&provider), Config::default());
}

#[test]
fn invalid_file_degrades_to_absent() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("config.toml");
    fs::write(&path, "SearchEngine = ").expect("config should be written");

    let provider = FileProvider::new(&path);
    assert!(matches!(provider.read_table(), Err(ConfigError::Toml { .. })));
    assert_eq!(provider.get_string(SEARCH_ENGINE_KEY), None);
}

#[test]
fn non_string_values_are_ignored() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("config.toml");
    fs::write(&path, "SearchEngine = 3\n").expect("config should be written");

    assert_eq!(FileProvider::new(&path).get_string(SEARCH_ENGINE_KEY), None);
}

#[test]
fn registry_provider_targets_deflector_client_key() {
    assert_eq!(RegistryProvider::default().subkey(), REGISTRY_SUBKEY);
}

#[cfg(not(target_os = "windows"))]
#[test]
fn registry_provider_is_empty_off_windows() {
    assert_eq!(RegistryProvider::default().get_string(SEARCH_ENGINE_KEY), None);
}
