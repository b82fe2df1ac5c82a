//! Integration tests for loading widget definitions from disk.

use std::io::Write;

use chrono::{TimeZone, Utc};
use countkit_core::time::FixedClock;
use countkit_core::{ConfigError, CoreError, CounterAnimator, TimeCalibrator, WidgetsConfig};
use indoc::indoc;

#[test]
fn test_load_widgets_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        indoc! {r#"
            timezone = "America/New_York"

            [[countdown]]
            end = "2040-12-31 00:00:00"
            template = "{DAYS} Days {HOURS}:{MINUTES}:{SECONDS}"
            end_message = "Happy new year"
            utc_offset = 5

            [[counter]]
            endpoint = "https://example.com/stats.json"
            speed = "4s"
            update = 30000
            seed = 9
        "#}
        .as_bytes(),
    )
    .unwrap();

    let cfg = WidgetsConfig::load(file.path()).unwrap();
    let zone = cfg.client_zone().unwrap().unwrap();
    let now = Utc.with_ymd_and_hms(2040, 6, 1, 0, 0, 0).unwrap();
    let calibrator = TimeCalibrator::with_clock(zone, FixedClock(now));

    let countdowns = cfg.countdowns(&calibrator).unwrap();
    assert_eq!(countdowns.len(), 1);
    // Midnight in New York in winter is 05:00 UTC.
    assert_eq!(countdowns[0].end, Utc.with_ymd_and_hms(2040, 12, 31, 5, 0, 0).unwrap());
    assert_eq!(countdowns[0].utc_offset, 5);
    assert_eq!(countdowns[0].end_message, "Happy new year");

    let counter = &cfg.counter[0];
    assert_eq!(counter.property, "total");
    assert_eq!(counter.animation_budget_ms, 4_000);
    assert_eq!(counter.poll_interval_ms, 30_000);
    assert_eq!(
        CounterAnimator::from_config(counter).animation_period(),
        None
    );
}

#[test]
fn test_missing_offset_uses_dst_aware_default() {
    let cfg = WidgetsConfig::from_toml_str(indoc! {r#"
        [[countdown]]
        end = "2040-12-31T00:00:00Z"
        template = "{DAYS}"
    "#})
    .unwrap();

    let zone: chrono_tz::Tz = "America/Los_Angeles".parse().unwrap();
    let summer = TimeCalibrator::with_clock(zone, FixedClock(Utc.with_ymd_and_hms(2040, 7, 1, 0, 0, 0).unwrap()));
    let winter = TimeCalibrator::with_clock(zone, FixedClock(Utc.with_ymd_and_hms(2040, 1, 15, 0, 0, 0).unwrap()));

    assert_eq!(cfg.countdowns(&summer).unwrap()[0].utc_offset, 7);
    assert_eq!(cfg.countdowns(&winter).unwrap()[0].utc_offset, 8);
}

#[test]
fn test_load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = WidgetsConfig::load(&dir.path().join("widgets.toml")).unwrap_err();
    assert!(matches!(err, CoreError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
}

#[test]
fn test_load_reports_invalid_document() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[[counter]]\nendpoint = \"/count\"\nspeed = \"quickly\"\n").unwrap();
    let err = WidgetsConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, CoreError::Config(ConfigError::ParseFailed(_))));
}

#[test]
fn test_unknown_timezone_is_rejected() {
    let err = WidgetsConfig::from_toml_str(r#"timezone = "Mars/Olympus_Mons""#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "timezone"));
}

#[test]
fn test_counter_without_endpoint_is_rejected() {
    let err = WidgetsConfig::from_toml_str(indoc! {r#"
        [[counter]]
        endpoint = ""
    "#})
    .unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey(_)));
}
