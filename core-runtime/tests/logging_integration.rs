//! Integration tests for the logging system

use bridge_traits::log::LogLevel;
use core_runtime::logging::{init_logging, strip_path, LogFormat, LoggingConfig};

#[test]
fn test_logging_initialization_once() {
    // A global subscriber can only be installed once per process.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    assert!(init_logging(config.clone()).is_ok());
    assert!(init_logging(config).is_err());
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/assets/audio/explosion.wav"), "explosion.wav");
    assert_eq!(
        strip_path("https://cdn.example.com/sfx/laser.ogg"),
        "laser.ogg"
    );
    assert_eq!(strip_path("C:\\Games\\sfx\\laser.ogg"), "laser.ogg");
    assert_eq!(strip_path("laser.ogg"), "laser.ogg");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_filter("core_playback=debug")
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert_eq!(config.filter.as_deref(), Some("core_playback=debug"));
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}
