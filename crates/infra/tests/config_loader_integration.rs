//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use careslot_domain::CareslotError;
use careslot_infra::config;
use tempfile::NamedTempFile;

fn write_config(contents: &str, extension: &str) -> NamedTempFile {
    let mut temp_file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    temp_file
}

#[test]
fn test_load_config_from_json_file() {
    let file = write_config(
        r#"{
            "database": { "path": "/tmp/integration_test.db", "pool_size": 10 },
            "calendar": {
                "api_base_url": "https://calendar.example.test",
                "calendar_id": "front-desk",
                "access_token": "token"
            },
            "payments": { "secret_key": "sk_test_1", "timeout_secs": 5 },
            "clinic": { "time_zone": "Europe/Berlin", "appointment_duration_minutes": 30 },
            "logging": { "level": "debug", "json": true }
        }"#,
        "json",
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.database.path, "/tmp/integration_test.db");
    assert_eq!(config.database.pool_size, 10);

    let calendar = config.calendar.as_ref().expect("calendar section");
    assert_eq!(calendar.calendar_id, "front-desk");
    assert_eq!(calendar.api_base_url, "https://calendar.example.test");

    let payments = config.payments.as_ref().expect("payments section");
    assert_eq!(payments.timeout_secs, 5);

    assert_eq!(config.clinic.appointment_duration_minutes, 30);
    assert!(config.logging.json);
    config.validate().expect("config should validate");
}

#[test]
fn test_load_config_from_toml_file() {
    let file = write_config(
        r#"
[database]
path = "/tmp/integration_test.db"

[clinic]
time_zone = "America/New_York"
"#,
        "toml",
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from TOML file");

    assert_eq!(config.database.path, "/tmp/integration_test.db");
    assert!(config.calendar.is_none());
    assert!(config.payments.is_none());
    assert_eq!(config.clinic.tz().unwrap(), chrono_tz::America::New_York);
}

#[test]
fn test_invalid_time_zone_fails_validation() {
    let file = write_config(
        r#"{ "database": { "path": "x.db" }, "clinic": { "time_zone": "Mars/Olympus" } }"#,
        "json",
    );

    let config = config::load_from_file(Some(file.path().to_path_buf())).expect("file parses");
    assert!(matches!(config.validate(), Err(CareslotError::Config(_))));
}

#[test]
fn test_malformed_json_is_config_error() {
    let file = write_config(r#"{ "database": "#, "json");

    let result = config::load_from_file(Some(file.path().to_path_buf()));
    assert!(matches!(result, Err(CareslotError::Config(msg)) if msg.contains("JSON")));
}
