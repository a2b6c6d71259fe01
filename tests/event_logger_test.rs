//! Integration tests for the event logger writing real files.

use eventlog::config::{FileSettings, Settings};
use eventlog::logging::{
    create_test_logger, EventKind, EventLogger, EventMask, FlushTrigger, LogLevel, LogRecord,
    ManualClock, SinkState, SCHEMA_VERSION,
};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn file_settings(dir: &Path, buffer_size: usize, rotation_keep: u32) -> Settings {
    Settings::default()
        .with_instance_id(2302)
        .with_world_name("chernarusplus")
        .with_file(FileSettings {
            directory: dir.join("logs"),
            file_name: "eventlog_2302".to_string(),
            buffer_size,
            rotation_keep,
            flush_interval: Duration::from_secs(5),
            ..Default::default()
        })
}

fn read_lines(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_lines_written_to_file() {
    let dir = tempdir().unwrap();
    let settings = file_settings(dir.path(), 0, 0);
    let clock = Arc::new(ManualClock::new(1_700_000_000));

    let mut logger = EventLogger::open(&settings, clock.clone());
    assert_eq!(logger.state(), SinkState::Direct);

    logger.log(
        &LogRecord::info(EventKind::PlayerHit, "player hit")
            .with_field("damage", "12.5")
            .with_field("pos", "<1200.5, 14.2, 9800.1>")
            .with_field("player", r#"{"name":"Survivor","steam_id":"7656"}"#)
            .with_field("weapon", "M4A1"),
    );
    clock.advance(Duration::from_millis(1_250));
    logger.warn(EventKind::SystemWorld, "world saved");
    logger.close();

    let lines = read_lines(&settings.file.active_path());
    assert_eq!(lines.len(), 2);

    let hit = &lines[0];
    assert_eq!(hit["ts"], 1_700_000_000);
    assert_eq!(hit["uptime_ms"], 0);
    assert_eq!(hit["instance"], 2302);
    assert_eq!(hit["level"], "info");
    assert_eq!(hit["schema"], SCHEMA_VERSION);
    assert_eq!(hit["world"], "chernarusplus");
    assert_eq!(hit["event_type"], "player.hit");
    assert_eq!(hit["damage"], 12.5);
    assert_eq!(hit["pos"], serde_json::json!([1200.5, 14.2, 9800.1]));
    assert_eq!(hit["player"]["name"], "Survivor");
    assert_eq!(hit["weapon"], "M4A1");

    let saved = &lines[1];
    assert_eq!(saved["uptime_ms"], 1_250);
    assert_eq!(saved["ts"], 1_700_000_001);
    assert_eq!(saved["level"], "warn");
}

#[test]
fn test_buffered_file_flushes_on_size_and_close() {
    let dir = tempdir().unwrap();
    let settings = file_settings(dir.path(), 3, 0);
    let clock = Arc::new(ManualClock::new(0));
    let path = settings.file.active_path();

    let mut logger = EventLogger::open(&settings, clock);
    logger.info(EventKind::SystemGame, "1");
    logger.info(EventKind::SystemGame, "2");
    assert_eq!(fs::read_to_string(&path).unwrap(), "");

    logger.info(EventKind::SystemGame, "3");
    assert_eq!(read_lines(&path).len(), 3);

    logger.info(EventKind::SystemGame, "4");
    logger.close();

    let messages: Vec<_> = read_lines(&path)
        .iter()
        .map(|line| line["msg"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(messages, vec!["1", "2", "3", "4"]);
}

#[test]
fn test_timer_flush_through_tick() {
    let dir = tempdir().unwrap();
    let settings = file_settings(dir.path(), 100, 0);
    let clock = Arc::new(ManualClock::new(0));
    let path = settings.file.active_path();

    let mut logger = EventLogger::open(&settings, clock.clone());
    logger.info(EventKind::SystemGame, "a");
    logger.info(EventKind::SystemGame, "b");

    clock.advance(Duration::from_secs(6));
    logger.tick();
    assert_eq!(read_lines(&path).len(), 2);
    assert_eq!(logger.metrics().flushes(FlushTrigger::Timer), 1);
}

#[test]
fn test_rotation_between_runs() {
    let dir = tempdir().unwrap();
    let settings = file_settings(dir.path(), 8, 3);
    let rotation = settings.file.rotation();

    for run in 0..4 {
        let mut logger = EventLogger::open(&settings, Arc::new(ManualClock::new(0)));
        logger.info(EventKind::SystemGame, &format!("run {run}"));
        logger.close();
    }

    let msg = |path: &Path| read_lines(path)[0]["msg"].as_str().unwrap().to_string();
    assert_eq!(msg(&rotation.active_path()), "run 3");
    assert_eq!(msg(&rotation.indexed_path(0)), "run 2");
    assert_eq!(msg(&rotation.indexed_path(1)), "run 1");
    assert!(!rotation.indexed_path(2).exists());
}

#[test]
fn test_gate_writes_zero_bytes() {
    let dir = tempdir().unwrap();
    let settings = file_settings(dir.path(), 0, 0)
        .with_level(LogLevel::Info)
        .with_events(EventMask::PLAYER);

    let mut logger = EventLogger::open(&settings, Arc::new(ManualClock::new(0)));
    logger.debug(EventKind::PlayerChat, "below threshold");
    logger.error(EventKind::Explosive, "outside mask");
    logger.close();

    assert_eq!(fs::metadata(settings.file.active_path()).unwrap().len(), 0);
}

#[test]
fn test_shutdown_switches_to_direct() {
    let (mut logger, memory, _) = create_test_logger();
    logger.info(EventKind::SystemGame, "before");
    logger.shutdown();
    logger.shutdown();
    logger.info(EventKind::SystemGame, "after");

    assert_eq!(logger.state(), SinkState::ShuttingDown);
    assert_eq!(memory.lines().len(), 2);
}

#[test]
fn test_every_line_is_one_object() {
    let (mut logger, memory, _) = create_test_logger();
    let values = [
        "",
        "  ",
        "{",
        "}",
        "[1,2",
        "<1,2>",
        "<1, 2, x>",
        "\"quoted\"",
        "line\nbreak",
        "tab\there",
        "back\\slash",
        "+5",
        "1e",
        "ünïcödé ☃",
    ];

    for (i, value) in values.iter().enumerate() {
        logger.log(
            &LogRecord::info(EventKind::SystemGame, *value)
                .with_field(format!("k{i}"), *value)
                .with_field(*value, "v"),
        );
    }

    let lines = memory.lines();
    assert_eq!(lines.len(), values.len());
    for line in lines {
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert!(parsed.is_object());
    }
}
