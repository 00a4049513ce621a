//! Loading configuration files end to end, the way the binary does.

use std::io::Write;

use cadence_core::SettingsProvider;
use cadence_domain::CadenceError;
use cadence_infra::{config, ConfigSettings};
use chrono::NaiveTime;
use tempfile::{NamedTempFile, TempDir};

fn copy_with_extension(contents: &str, extension: &str) -> std::path::PathBuf {
    let mut temp_file = NamedTempFile::new().expect("temp file created");
    temp_file.write_all(contents.as_bytes()).expect("temp file written");
    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("temp file copied");
    path
}

#[test]
fn toml_file_drives_business_settings() {
    let path = copy_with_extension(
        r#"
[database]
path = "/var/lib/cadence/bookings.db"
pool_size = 6
busy_timeout_ms = 2500

[business]
timezone = "Australia/Sydney"
open = "08:00"
close = "19:30"

[logging]
level = "cadence_core=debug,info"
json = true
"#,
        "toml",
    );

    let loaded = config::load_from_file(Some(path.clone())).expect("config loaded");
    std::fs::remove_file(path).ok();

    loaded.validate().expect("config is valid");
    assert_eq!(loaded.database.busy_timeout_ms, 2_500);
    assert!(loaded.logging.json);

    let settings = ConfigSettings::from_config(&loaded.business)
        .expect("settings parsed")
        .business_settings()
        .expect("settings available");
    assert_eq!(settings.timezone, chrono_tz::Australia::Sydney);
    assert_eq!(settings.close, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
}

#[test]
fn json_file_with_scheduling_overrides() {
    let path = copy_with_extension(
        r#"{
            "database": { "path": "bookings.db" },
            "scheduling": {
                "default_horizon_months": 6,
                "alternative_offsets_minutes": [15, -15, 30, -30],
                "max_alternatives": 2
            }
        }"#,
        "json",
    );

    let loaded = config::load_from_file(Some(path.clone())).expect("config loaded");
    std::fs::remove_file(path).ok();

    assert_eq!(loaded.scheduling.default_horizon_months, 6);
    assert_eq!(loaded.scheduling.alternative_offsets_minutes, vec![15, -15, 30, -30]);
    assert_eq!(loaded.scheduling.max_alternatives, 2);
    loaded.validate().expect("config is valid");
}

#[test]
fn inverted_business_hours_fail_validation_not_parsing() {
    let path = copy_with_extension("[business]\nopen = \"18:00\"\nclose = \"09:00\"\n", "toml");

    let loaded = config::load_from_file(Some(path.clone())).expect("file parses");
    std::fs::remove_file(path).ok();

    assert!(matches!(loaded.validate(), Err(CadenceError::Validation(_))));
}

#[test]
fn probe_finds_nothing_in_an_empty_directory_tree() {
    let dir = TempDir::new().expect("temp dir created");
    let nested = dir.path().join("a/b/c");
    std::fs::create_dir_all(&nested).expect("nested dirs created");

    let candidates = ["cadence.toml", "cadence.json", "config.toml", "config.json"];
    assert!(candidates.iter().all(|name| !nested.join(name).exists()));

    let explicit = nested.join("cadence.toml");
    assert!(matches!(config::load_from_file(Some(explicit)), Err(CadenceError::Config(_))));
}
