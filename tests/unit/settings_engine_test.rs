//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests exercise the SettingsEngine through its public trait interface,
//! validating default loading, value persistence, validation and reset.

use ottmarks::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use ottmarks::types::errors::SettingsError;
use ottmarks::types::settings::{AppSettings, LinkMode, ThumbnailSource};
use ottmarks::types::view::ViewTab;
use serde_json::json;
use tempfile::TempDir;

/// Helper: create a SettingsEngine backed by a temp directory that lives for the
/// duration of the test (the caller holds the `TempDir` handle).
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("settings.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

/// With no config file on disk, `load()` returns the built-in defaults.
#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.thumbnails.source, ThumbnailSource::PromptSynthesis);
    assert_eq!(settings.links.mode, LinkMode::Search);
    assert_eq!(settings.voice.language, "en-US");
    assert_eq!(settings.voice.quick_search_delay_ms, 500);
    assert_eq!(settings.thumbnails.lookup_timeout_ms, None);
}

/// A change made through `set_value` is visible to a fresh engine.
#[test]
fn test_set_value_persists_changes() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine.set_value("links.mode", json!("first_result")).unwrap();
        engine.set_value("general.default_tab", json!("favorites")).unwrap();
    }

    let mut engine = engine_in_temp(&dir);
    let settings = engine.load().unwrap();
    assert_eq!(settings.links.mode, LinkMode::FirstResult);
    assert_eq!(settings.general.default_tab, ViewTab::Favorites);
}

#[test]
fn test_set_value_unknown_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    let err = engine.set_value("voice.pitch", json!(3)).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidKey(_)));

    let err = engine.set_value("", json!(3)).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidKey(_)));
}

#[test]
fn test_set_value_wrong_type_is_rejected_and_not_applied() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    let err = engine
        .set_value("voice.quick_search_delay_ms", json!("soon"))
        .unwrap_err();
    assert!(matches!(err, SettingsError::InvalidValue(_)));
    assert_eq!(engine.get_settings().voice.quick_search_delay_ms, 500);
}

#[test]
fn test_reset_restores_defaults_on_disk() {
    let dir = TempDir::new().unwrap();
    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("thumbnails.source", json!("search_lookup"))
            .unwrap();
        engine.reset().unwrap();
    }

    let mut engine = engine_in_temp(&dir);
    assert_eq!(engine.load().unwrap(), AppSettings::default());
}

#[test]
fn test_malformed_config_file_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("settings.json"), "{ not json").unwrap();

    let mut engine = engine_in_temp(&dir);
    let err = engine.load().unwrap_err();
    assert!(matches!(err, SettingsError::SerializationError(_)));
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("settings.json");
    let mut engine = SettingsEngine::new(Some(path.to_string_lossy().to_string()));
    engine.load().unwrap();
    engine.save().unwrap();
    assert!(path.exists());
}
