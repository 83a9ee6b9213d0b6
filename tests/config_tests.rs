//! Configuration loading from files

use dramaflow::DramaflowConfig;
use std::time::Duration;

#[test]
fn test_rc_file_overrides_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("dramaflow.toml"),
        "[queue]\nmax_concurrency = 3\ntick_interval_ms = 250\n",
    )
    .unwrap();
    std::fs::write(dir.path().join(".dramaflow-rc"), "[queue]\nmax_concurrency = 2\n").unwrap();

    let config = DramaflowConfig::load_from(dir.path()).unwrap();
    assert_eq!(config.queue.max_concurrency, 2);
    let settings = config.queue_settings();
    assert_eq!(settings.tick_interval, Duration::from_millis(250));
    assert_eq!(settings.completion_delay, Duration::from_secs(1));
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("dramaflow.toml"),
        "[queue]\nmin_increment = 40\nmax_increment = 20\n",
    )
    .unwrap();
    assert!(DramaflowConfig::load_from(dir.path()).is_err());
}

#[test]
fn test_missing_files_give_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = DramaflowConfig::load_from(dir.path()).unwrap();
    assert_eq!(config, DramaflowConfig::default());
}

fn load_queue_section(section: &str) -> anyhow::Result<DramaflowConfig> {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("dramaflow.toml"), format!("[queue]\n{section}\n")).unwrap();
    DramaflowConfig::load_from(dir.path())
}

#[test]
fn test_zero_tick_interval_is_rejected() {
    let err = load_queue_section("tick_interval_ms = 0").unwrap_err();
    assert!(err.to_string().contains("tick_interval_ms"));
}

#[test]
fn test_zero_increments_are_rejected() {
    let err = load_queue_section("min_increment = 0\nmax_increment = 0").unwrap_err();
    assert!(err.to_string().contains("min_increment"));
}

#[test]
fn test_failure_rate_outside_unit_range_is_rejected() {
    assert!(load_queue_section("failure_rate = 1.01").is_err());
    assert!(load_queue_section("failure_rate = -0.5").is_err());
    assert_eq!(load_queue_section("failure_rate = 1.0").unwrap().queue.failure_rate, 1.0);
}

#[test]
fn test_zero_concurrency_is_rejected() {
    assert!(load_queue_section("max_concurrency = 0").is_err());
}
