mod common;

use common::s3_event;
use lesson_unzipper_core::notification::{
    decode_object_key, destination_bucket_for, Environment, TransferNotification,
};
use lesson_unzipper_core::Stage;

#[test]
fn test_environment_from_bucket_name() {
    assert_eq!(Environment::from_bucket_name("myapp-stageapp-zipped"), Environment::Staging);
    assert_eq!(Environment::from_bucket_name("lessons-staging-zipped"), Environment::Staging);
    assert_eq!(Environment::from_bucket_name("lessons-zipped"), Environment::Production);
    assert_eq!(Environment::Staging.to_string(), "staging");
    assert_eq!(Environment::Production.to_string(), "production");
}

#[test]
fn test_destination_bucket_removes_first_zipped_token() {
    assert_eq!(destination_bucket_for("lessons-zipped"), "lessons");
    assert_eq!(destination_bucket_for("bucket-zipped"), "bucket");
    assert_eq!(destination_bucket_for("plain-bucket"), "plain-bucket");
    assert_eq!(destination_bucket_for("a-zipped-b-zipped"), "a-b-zipped");
}

#[test]
fn test_decode_object_key_handles_plus_and_percent_encoding() {
    assert_eq!(decode_object_key("my+lesson.zip").unwrap(), "my lesson.zip");
    assert_eq!(decode_object_key("caf%C3%A9%2Fintro.zip").unwrap(), "café/intro.zip");
    // An encoded plus is a literal plus
    assert_eq!(decode_object_key("a%2Bb.zip").unwrap(), "a+b.zip");
}

#[test]
fn test_decode_object_key_rejects_invalid_utf8() {
    let err = decode_object_key("bad%FF.zip").expect_err("invalid UTF-8 should fail");
    assert_eq!(err.stage(), Stage::Notification);
}

#[test]
fn test_decode_object_key_rejects_malformed_escapes() {
    for raw in ["lesson%zz.zip", "lesson.zip%", "lesson%4.zip", "%g1intro.zip"] {
        let err = decode_object_key(raw).expect_err("malformed escape should fail");
        assert_eq!(err.stage(), Stage::Notification, "key {raw:?}");
        assert!(err.to_string().contains("malformed percent escape"), "key {raw:?}");
    }
    // A fully escaped percent sign is still fine
    assert_eq!(decode_object_key("100%25.zip").unwrap(), "100%.zip");
}

#[test]
fn test_from_event_reads_first_record() {
    let notification =
        TransferNotification::from_event(s3_event("myapp-stageapp-zipped", "lessons/My+Intro.zip"))
            .expect("event should parse");

    assert_eq!(notification.source_bucket, "myapp-stageapp-zipped");
    assert_eq!(notification.source_key, "lessons/My Intro.zip");
    assert_eq!(notification.destination_bucket, "myapp-stageapp");
    assert_eq!(notification.environment, Environment::Staging);
}

#[test]
fn test_from_event_ignores_additional_records() {
    let mut event = s3_event("lessons-zipped", "first.zip");
    let second = s3_event("other-zipped", "second.zip")["Records"][0].clone();
    event["Records"].as_array_mut().unwrap().push(second);

    let notification = TransferNotification::from_event(event).unwrap();
    assert_eq!(notification.source_bucket, "lessons-zipped");
    assert_eq!(notification.source_key, "first.zip");
}

#[test]
fn test_from_event_rejects_malformed_events() {
    let no_records = serde_json::json!({ "Records": [] });
    let missing_key = serde_json::json!({
        "Records": [{ "s3": { "bucket": { "name": "lessons-zipped" }, "object": {} } }]
    });
    let not_s3 = serde_json::json!({ "detail-type": "Scheduled Event" });

    for event in [no_records, missing_key, not_s3] {
        let err = TransferNotification::from_event(event).expect_err("should be rejected");
        assert_eq!(err.stage(), Stage::Notification);
        assert!(err.to_string().starts_with("Invalid transfer notification: "));
    }
}

#[test]
fn test_from_parts_rejects_empty_bucket_or_key() {
    assert!(TransferNotification::from_parts("", "a.zip").is_err());
    assert!(TransferNotification::from_parts("lessons-zipped", "").is_err());
}
