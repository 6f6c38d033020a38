use super::{Config, SpyConfig};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_empty_file_gives_defaults() {
    let cfg = Config::parse("", Path::new("empty.toml")).unwrap();
    assert_eq!(cfg, Config::default());
    assert_eq!(cfg.spy(), SpyConfig::default());
}

#[test]
fn test_partial_file_overrides_only_given_keys() {
    let cfg = Config::parse(
        "anchor_offset = 120.0\npoll_max_frames = 4\n",
        Path::new("partial.toml"),
    )
    .unwrap();
    assert!((cfg.anchor_offset - 120.0).abs() < f64::EPSILON);
    assert_eq!(cfg.poll_max_frames, 4);
    assert_eq!(cfg.settle_stable_frames, 3);
    assert_eq!(cfg.file_extensions, vec!["md".to_string()]);
}

#[test]
fn test_spy_converts_milliseconds() {
    let cfg = Config {
        programmatic_scroll_timeout_ms: 800,
        min_loading_ms: 1000,
        ..Config::default()
    };
    let spy = cfg.spy();
    assert_eq!(spy.programmatic_scroll_timeout, Duration::from_millis(800));
    assert_eq!(spy.min_loading, Duration::from_secs(1));
}

#[test]
fn test_explicit_file_is_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "fine_offset = 0.0").unwrap();

    let cfg = Config::load(Some(file.path())).unwrap();
    assert!(cfg.fine_offset.abs() < f64::EPSILON);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let err = Config::load(Some(Path::new("/nonexistent/sectionspy.toml"))).unwrap_err();
    assert!(err.to_string().contains("sectionspy.toml"));
}

#[test]
fn test_default_timings_round_trip_through_spy() {
    let cfg = Config::default();
    assert_eq!(cfg.programmatic_scroll_timeout_ms, 1200);
    assert_eq!(cfg.initial_sync_delay_ms, 50);
    assert_eq!(cfg.min_loading_ms, 0);
    assert_eq!(cfg.spy(), SpyConfig::default());
}
