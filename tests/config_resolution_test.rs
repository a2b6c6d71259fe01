//! Integration tests for document loading and option resolution.

use eventlog::config::{
    CommandLine, ConfigDocument, ConfigLoader, ConfigResolver, MapHostConfig, CONFIG_VERSION,
};
use eventlog::logging::{EventKind, EventLogger, EventMask, LogLevel, ManualClock};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_first_run_creates_document_and_log() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("eventlog").join("config.json");

    let document = ConfigLoader::new().load_or_create(&config_path).unwrap();
    assert!(config_path.exists());

    let host = MapHostConfig::new()
        .with_value("instanceId", 5)
        .with_value("worldName", "Enoch");
    let cli = CommandLine::parse(["-eventlog-buffer-size=0"]);
    let settings = ConfigResolver::new(&document, &host, &cli)
        .with_log_dir(dir.path().join("eventlog").join("logs"))
        .resolve();

    let mut logger = EventLogger::open(&settings, Arc::new(ManualClock::new(0)));
    logger.info(EventKind::SystemMission, "mission started");
    logger.close();

    let log_path = dir.path().join("eventlog/logs/eventlog_5.ndjson");
    let line: serde_json::Value =
        serde_json::from_str(fs::read_to_string(log_path).unwrap().trim_end()).unwrap();
    assert_eq!(line["instance"], 5);
    assert_eq!(line["world"], "enoch");
    assert_eq!(line["event_type"], "system.mission");
}

#[test]
fn test_edited_document_is_respected() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(
        &config_path,
        format!(
            r#"{{
                "version": "{CONFIG_VERSION}",
                "settings": {{ "level": "Warning", "events_mask": "hiz", "instance_id": "77" }},
                "file": {{ "file_name": "server", "append": true, "buffer_size": 4, "flush_interval": 30 }},
                "filters": {{ "only_player_suicide": false }},
                "throttling": {{ "weapon_fire_ms": 9000 }}
            }}"#
        ),
    )
    .unwrap();

    let document = ConfigLoader::new().load_or_create(&config_path).unwrap();
    let host = MapHostConfig::new();
    let cli = CommandLine::new();
    let settings = ConfigResolver::new(&document, &host, &cli).resolve();

    assert_eq!(settings.level, LogLevel::Warn);
    assert_eq!(
        settings.events,
        EventMask::of(&[EventKind::PlayerHit, EventKind::PlayerKill, EventKind::Explosive])
    );
    assert_eq!(settings.instance_id, 77);
    assert_eq!(settings.file.file_name, "server");
    assert!(settings.file.append);
    assert_eq!(settings.file.buffer_size, 4);
    assert_eq!(settings.file.flush_interval, Duration::from_secs(30));
    assert!(!settings.filters.only_player_suicide);
    assert_eq!(settings.throttling.weapon_fire_ms, 5_000);
}

#[test]
fn test_cli_overrides_document_and_host() {
    let mut document = ConfigDocument::default();
    document.settings.level = "error".to_string();
    document.file.rotation_keep = 2;

    let host = MapHostConfig::new()
        .with_value("EventLog_Level", 1)
        .with_value("EventLog_FilesKeep", 7)
        .with_value("instanceId", 3);
    let cli = CommandLine::parse([
        "-eventlog-level=trace",
        "--eventlog-files-keep=9",
        "-eventlog-only-player-inventory-input=0",
    ]);

    let settings = ConfigResolver::new(&document, &host, &cli).resolve();
    assert_eq!(settings.level, LogLevel::Trace);
    assert_eq!(settings.file.rotation_keep, 9);
    assert!(!settings.filters.only_player_inventory_input);

    let settings = ConfigResolver::new(&document, &host, &CommandLine::new()).resolve();
    assert_eq!(settings.level, LogLevel::Debug);
    assert_eq!(settings.file.rotation_keep, 7);
}

#[test]
fn test_malformed_document_is_not_applied() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, r#"{"settings": {"level": "debug"}, "file": "#).unwrap();

    assert!(ConfigLoader::new().load_or_create(&config_path).is_err());
}

#[test]
fn test_bad_overrides_still_produce_a_log() {
    let dir = tempdir().unwrap();
    let mut document = ConfigDocument::default();
    document.settings.instance_id = "server-a".to_string();
    document.file.file_name = "../outside".to_string();

    let host = MapHostConfig::new();
    let cli = CommandLine::parse(["-port=2302", "-eventlog-buffer-size=0"]);
    let settings = ConfigResolver::new(&document, &host, &cli)
        .with_log_dir(dir.path().join("logs"))
        .resolve();
    assert_eq!(settings.instance_id, 2302);

    let mut logger = EventLogger::open(&settings, Arc::new(ManualClock::new(0)));
    logger.info(EventKind::SystemGame, "still logging");
    logger.close();

    let content = fs::read_to_string(dir.path().join("logs/eventlog_2302.ndjson")).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(!dir.path().join("outside.ndjson").exists());
}
