use std::env;
use std::fs;
use std::time::Duration;

use serde_json::{Map, Value, json};
use serial_test::serial;
use tempfile::TempDir;

use super::*;
use crate::utils::Error;

fn options(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.publisher.project_id, "");
    assert_eq!(settings.publisher.credentials, None);
    assert_eq!(settings.publisher.publish_timeout, Duration::from_secs(5));
    assert!(!settings.publisher.do_not_create_topic_if_missing);
    assert_eq!(settings.run.topic, "load-test");
    assert_eq!(settings.run.vus, 1);
    assert_eq!(settings.run.iterations, 10);
}

#[test]
fn empty_map_resolves_to_defaults() {
    let settings = PublisherSettings::from_map(&Map::new()).unwrap();
    assert_eq!(settings, PublisherSettings::default());
}

#[test]
fn non_positive_timeout_falls_back_to_default() {
    for timeout in [json!(0), json!(-1), json!(-300), Value::Null] {
        let settings =
            PublisherSettings::from_map(&options(json!({ "publish_timeout": timeout }))).unwrap();
        assert_eq!(
            settings.publish_timeout,
            Duration::from_secs(DEFAULT_PUBLISH_TIMEOUT_SECS)
        );
    }
}

#[test]
fn positive_timeout_is_kept() {
    for secs in [1_u64, 7, 120] {
        let settings =
            PublisherSettings::from_map(&options(json!({ "publish_timeout": secs }))).unwrap();
        assert_eq!(settings.publish_timeout, Duration::from_secs(secs));
    }
}

#[test]
fn full_map_is_decoded() {
    let settings = PublisherSettings::from_map(&options(json!({
        "project_id": "load-project",
        "credentials": "{\"type\":\"service_account\"}",
        "publish_timeout": 10,
        "debug": true,
        "trace": false,
        "do_not_create_topic_if_missing": true,
    })))
    .unwrap();

    assert_eq!(settings.project_id, "load-project");
    assert_eq!(
        settings.credentials.as_deref(),
        Some("{\"type\":\"service_account\"}")
    );
    assert_eq!(settings.publish_timeout, Duration::from_secs(10));
    assert!(settings.debug);
    assert!(!settings.trace);
    assert!(settings.do_not_create_topic_if_missing);
    assert_eq!(settings.log_level(), "debug");
}

#[test]
fn camel_case_aliases_are_accepted() {
    let settings = PublisherSettings::from_map(&options(json!({
        "projectID": "p1",
        "publishTimeout": 3,
        "doNotCreateTopicIfMissing": true,
    })))
    .unwrap();

    assert_eq!(settings.project_id, "p1");
    assert_eq!(settings.publish_timeout, Duration::from_secs(3));
    assert!(settings.do_not_create_topic_if_missing);
}

#[test]
fn fractional_timeout_is_truncated() {
    for (timeout, secs) in [(json!(10.0), 10), (json!(2.7), 2), (json!(1.99), 1)] {
        let settings =
            PublisherSettings::from_map(&options(json!({ "publishTimeout": timeout }))).unwrap();
        assert_eq!(settings.publish_timeout, Duration::from_secs(secs));
    }
}

#[test]
fn fractional_timeout_below_one_second_falls_back_to_default() {
    for timeout in [json!(0.5), json!(-2.5)] {
        let settings =
            PublisherSettings::from_map(&options(json!({ "publish_timeout": timeout }))).unwrap();
        assert_eq!(
            settings.publish_timeout,
            Duration::from_secs(DEFAULT_PUBLISH_TIMEOUT_SECS)
        );
    }
}

#[test]
fn non_numeric_timeout_is_still_rejected() {
    for timeout in [json!("10"), json!(true)] {
        let err = PublisherSettings::from_map(&options(json!({ "publish_timeout": timeout })))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

#[test]
fn keys_match_regardless_of_case() {
    let settings = PublisherSettings::from_map(&options(json!({
        "ProjectID": "pascal",
        "Credentials": "key",
        "PublishTimeout": 8,
        "Debug": true,
        "Trace": true,
        "DoNotCreateTopicIfMissing": true,
    })))
    .unwrap();

    assert_eq!(settings.project_id, "pascal");
    assert_eq!(settings.credentials.as_deref(), Some("key"));
    assert_eq!(settings.publish_timeout, Duration::from_secs(8));
    assert!(settings.debug);
    assert!(settings.trace);
    assert!(settings.do_not_create_topic_if_missing);

    let settings = PublisherSettings::from_map(&options(json!({
        "projectid": "lower",
        "publishtimeout": 4,
        "donotcreatetopicifmissing": true,
    })))
    .unwrap();
    assert_eq!(settings.project_id, "lower");
    assert_eq!(settings.publish_timeout, Duration::from_secs(4));
    assert!(settings.do_not_create_topic_if_missing);
}

#[test]
fn every_spelling_of_each_option_decodes() {
    for key in [
        "ProjectID",
        "projectid",
        "Credentials",
        "Debug",
        "PublishTimeout",
        "DoNotCreateTopicIfMissing",
    ] {
        let mut map = Map::new();
        map.insert(key.to_string(), Value::Null);
        assert!(PublisherSettings::from_map(&map).is_ok(), "{key} was rejected");
    }
}

#[test]
fn same_option_twice_is_a_config_error() {
    let err = PublisherSettings::from_map(&options(json!({
        "project_id": "a",
        "ProjectID": "b",
    })))
    .unwrap_err();
    assert!(matches!(err, Error::Config(msg) if msg.contains("project_id")));
}

#[test]
fn empty_credentials_are_dropped() {
    let settings =
        PublisherSettings::from_map(&options(json!({ "credentials": "" }))).unwrap();
    assert_eq!(settings.credentials, None);
}

#[test]
fn wrong_type_is_a_config_error() {
    let err = PublisherSettings::from_map(&options(json!({ "publish_timeout": "soon" })))
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("publish_timeout") || err.to_string().contains("invalid type"));
}

#[test]
fn unknown_key_is_a_config_error() {
    let err = PublisherSettings::from_map(&options(json!({ "project": "typo" }))).unwrap_err();
    assert!(matches!(err, Error::Config(msg) if msg.contains("project")));
}

#[test]
fn non_object_value_is_rejected() {
    let err = PublisherSettings::from_value(json!(["project_id"])).unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let settings = PublisherSettings::from_value(Value::Null).unwrap();
    assert_eq!(settings, PublisherSettings::default());
}

#[test]
fn trace_wins_over_debug() {
    let settings =
        PublisherSettings::from_map(&options(json!({ "debug": true, "trace": true }))).unwrap();
    assert_eq!(settings.log_level(), "trace");
}

#[test]
fn debug_output_redacts_credentials() {
    let settings =
        PublisherSettings::from_map(&options(json!({ "credentials": "secret-key" }))).unwrap();
    let printed = format!("{settings:?}");
    assert!(!printed.contains("secret-key"));
    assert!(printed.contains("<redacted>"));
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    // Create a temporary directory and set it as current dir so load_config
    // will pick up config/default.toml from there.
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    let toml = r#"
        [publisher]
        project_id = "file-project"
        publish_timeout = 9

        [run]
        topic = "orders"
        vus = 4
        iterations = 25
    "#;
    fs::write("config/default.toml", toml).expect("write config file");

    let cfg = load_config();
    env::set_current_dir(orig).expect("restore cwd");

    let cfg = cfg.expect("load_config failed");
    assert_eq!(cfg.publisher.project_id, "file-project");
    assert_eq!(cfg.publisher.publish_timeout, Duration::from_secs(9));
    assert_eq!(cfg.run.topic, "orders");
    assert_eq!(cfg.run.vus, 4);
    assert_eq!(cfg.run.iterations, 25);
    assert_eq!(cfg.run.message, "hello");
}

#[test]
#[serial]
fn load_config_reads_environment() {
    temp_env::with_vars(
        [
            ("PUBSUB_PUBLISHER__PROJECT_ID", Some("env-project")),
            ("PUBSUB_PUBLISHER__PUBLISH_TIMEOUT", Some("0")),
            ("PUBSUB_RUN__DRY_RUN", Some("true")),
        ],
        || {
            let cfg = load_config().expect("load_config failed");
            assert_eq!(cfg.publisher.project_id, "env-project");
            assert_eq!(cfg.publisher.publish_timeout, Duration::from_secs(5));
            assert!(cfg.run.dry_run);
        },
    );
}
