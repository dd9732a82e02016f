//! Config file loading tests
//!
//! Each loading phase (read, parse, validate) reports its own error variant
//! carrying the offending path.

use chatrelay::cli::generate_config_template;
use chatrelay::config::Config;
use chatrelay::error::AppError;
use chatrelay::router::ModelKey;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("should create temp file");
    file.write_all(content.as_bytes())
        .expect("should write config");
    file
}

#[test]
fn test_from_file_loads_valid_config() {
    let file = write_config(
        r#"
[server]
port = 4100

[models]
reason = "thinker"
search = "searcher"

[prompts]
dir = "custom-prompts"
"#,
    );

    let config = Config::from_file(file.path()).expect("should load config");
    assert_eq!(config.server.port, 4100);
    assert_eq!(config.models.upstream_name(ModelKey::Reason), "thinker");
    assert_eq!(config.models.upstream_name(ModelKey::Search), "searcher");
    assert_eq!(config.prompts.dir, std::path::PathBuf::from("custom-prompts"));
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    match Config::from_file(&path) {
        Err(AppError::ConfigFileRead { path: reported, source }) => {
            assert!(reported.ends_with("absent.toml"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected ConfigFileRead, got {:?}", other),
    }
}

#[test]
fn test_explicit_missing_path_is_not_replaced_by_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    assert!(matches!(
        Config::load(Some(path.as_path())),
        Err(AppError::ConfigFileRead { .. })
    ));
}

#[test]
fn test_explicit_path_is_loaded() {
    let file = write_config("[server]\nport = 4200\n");
    let config = Config::load(Some(file.path())).expect("should load explicit config");
    assert_eq!(config.server.port, 4200);
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let file = write_config("[server\nport = ");

    let err = Config::from_file(file.path()).unwrap_err();
    assert!(matches!(err, AppError::ConfigParseFailed { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn test_wrong_type_is_parse_error() {
    let file = write_config("[server]\nport = \"eighty\"\n");
    assert!(matches!(
        Config::from_file(file.path()),
        Err(AppError::ConfigParseFailed { .. })
    ));
}

#[test]
fn test_invalid_values_are_validation_errors() {
    let file = write_config("[upstream]\nbase_url = \"ftp://example.com\"\n");

    match Config::from_file(file.path()) {
        Err(AppError::ConfigValidationFailed { reason, .. }) => {
            assert!(reason.contains("base_url"), "reason: {}", reason);
        }
        other => panic!("expected ConfigValidationFailed, got {:?}", other),
    }
}

#[test]
fn test_generated_template_is_loadable() {
    let file = write_config(generate_config_template());
    let config = Config::from_file(file.path()).expect("template should be a valid config");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3000);
}
