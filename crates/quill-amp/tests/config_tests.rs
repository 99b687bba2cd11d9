//! Integration tests for loading sanitizer configuration.

use std::fs;
use std::path::PathBuf;

use quill_amp::{ConfigError, FallbackSize, Sanitizer, SanitizerConfig};

#[test]
fn test_empty_object_is_default() {
    let config = SanitizerConfig::from_json_str("{}").expect("parse");
    assert_eq!(config, SanitizerConfig::default());
    assert_eq!(
        config.iframe_sandbox,
        "allow-scripts allow-same-origin allow-popups allow-forms"
    );
    assert_eq!(config.image_fallback, FallbackSize::new(800, 600));
}

#[test]
fn test_partial_config_overrides_defaults() {
    let config = SanitizerConfig::from_json_str(
        r#"{
            "site_url": "https://quill.example",
            "asset_root": "/var/www/html",
            "iframe_fallback": { "width": 640, "height": 360 }
        }"#,
    )
    .expect("parse");

    assert_eq!(config.site_url.as_deref(), Some("https://quill.example"));
    assert_eq!(config.asset_root, Some(PathBuf::from("/var/www/html")));
    assert_eq!(config.iframe_fallback, FallbackSize::new(640, 360));
    assert_eq!(config.video_fallback, FallbackSize::new(800, 600));
}

#[test]
fn test_unknown_keys_are_rejected() {
    let result = SanitizerConfig::from_json_str(r#"{ "site_uri": "https://typo.example" }"#);
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("quill.json");
    fs::write(&path, r#"{ "canonical_url": "https://quill.example/" }"#).expect("write config");

    let config = SanitizerConfig::load(&path).expect("load");
    assert_eq!(config.canonical_url.as_deref(), Some("https://quill.example/"));

    let sanitizer = Sanitizer::new(config);
    assert_eq!(
        sanitizer.config().canonical_url.as_deref(),
        Some("https://quill.example/")
    );
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.json");

    let err = SanitizerConfig::load(&path).expect_err("missing file");
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");

    for json in [
        r#"{ "image_fallback": { "width": 0, "height": 600 } }"#,
        r#"{ "iframe_sandbox": "  " }"#,
        r#"{ "site_url": "quill.example" }"#,
    ] {
        let path = dir.path().join("bad.json");
        fs::write(&path, json).expect("write config");
        let err = SanitizerConfig::load(&path).expect_err("invalid config");
        assert!(matches!(err, ConfigError::Invalid(_)), "{json}: {err}");
    }
}

#[test]
fn test_json_config_is_validated() {
    let result = SanitizerConfig::from_json_str(r#"{ "image_fallback": { "width": 0, "height": 0 } }"#);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_zero_fallback_built_in_code_uses_default() {
    let sanitizer = Sanitizer::new(SanitizerConfig {
        image_fallback: FallbackSize::new(0, 0),
        iframe_fallback: FallbackSize::new(640, 0),
        ..SanitizerConfig::default()
    });

    assert_eq!(sanitizer.config().image_fallback, FallbackSize::new(800, 600));
    assert_eq!(sanitizer.config().iframe_fallback, FallbackSize::new(800, 600));
    assert_eq!(
        sanitizer.sanitize_fragment("<img src=\"remote.png\">"),
        "<amp-img src=\"remote.png\" layout=\"responsive\" width=\"800\" height=\"600\"></amp-img>"
    );
}
