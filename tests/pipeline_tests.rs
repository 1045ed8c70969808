mod common;

use calroute::pipeline::CalendarAssistant;
use calroute::store::EventStore;
use chrono_tz::Tz;
use common::{LetterFrequencyEmbedder, MockCalendar, ScriptedChat};
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn toronto() -> Tz {
    "America/Toronto".parse().unwrap()
}

async fn open_store(dir: &Path) -> EventStore {
    EventStore::open(dir, Arc::new(LetterFrequencyEmbedder))
        .await
        .unwrap()
}

fn routed(request_type: &str, confidence: f32, description: &str) -> String {
    format!(
        r#"{{"request_type":"{}","confidence_score":{},"description":"{}"}}"#,
        request_type, confidence, description
    )
}

/// Below the confidence gate nothing runs, whatever the intent
#[tokio::test]
async fn test_low_confidence_yields_no_result() {
    for intent in ["new_event", "modify_event", "other"] {
        let chat = Arc::new(ScriptedChat::new(&[&routed(
            intent,
            0.4,
            "Schedule a team meeting",
        )]));
        let calendar = Arc::new(MockCalendar::new("abc123"));
        let mut assistant =
            CalendarAssistant::new(chat, calendar.clone(), None, toronto());

        let result = assistant.process("some request").await.unwrap();
        assert!(result.is_none());
        assert!(calendar.calls.lock().unwrap().is_empty());
    }
}

/// `other` is unsupported even with high confidence
#[tokio::test]
async fn test_other_intent_yields_no_result() {
    let chat = Arc::new(ScriptedChat::new(&[&routed(
        "other",
        0.98,
        "What's the weather like today?",
    )]));
    let calendar = Arc::new(MockCalendar::new("abc123"));
    let mut assistant = CalendarAssistant::new(chat, calendar.clone(), None, toronto());

    let result = assistant.process("What's the weather like today?").await.unwrap();
    assert!(result.is_none());
    assert!(calendar.calls.lock().unwrap().is_empty());
}

/// Full create flow: extraction on a known Monday resolves to the next
/// Tuesday 14:00, the response names the participants and the record store
/// picks up the Calendar_ID token
#[tokio::test]
async fn test_new_event_creates_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path()).await;

    // Router, then extraction with "next Tuesday at 2pm" already resolved
    // against a today of Monday 2025-06-02
    let chat = Arc::new(ScriptedChat::new(&[
        &routed(
            "new_event",
            0.95,
            "Schedule a team meeting next Tuesday at 2pm with Alice and Bob",
        ),
        r#"{"name":"Team Meeting","date":"2025-06-03","start_time":"2pm","duration_minutes":60,"participants":["Alice","Bob"]}"#,
    ]));
    let calendar = Arc::new(MockCalendar::new("p9hb6pri1f0vh8gs93517qrsfs"));
    let mut assistant =
        CalendarAssistant::new(chat, calendar.clone(), Some(store), toronto());

    let response = assistant
        .process("Let's schedule a team meeting next Tuesday at 2pm with Alice and Bob")
        .await
        .unwrap()
        .unwrap();

    assert!(response.success);
    assert!(response.message.contains("Alice"));
    assert!(response.message.contains("Bob"));
    assert!(response.message.contains("Calendar_ID=p9hb6pri1f0vh8gs93517qrsfs"));
    assert!(response.message.contains("2025-06-03 14:00"));
    assert!(response.calendar_link.is_some());

    let calls = calendar.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].summary, "Team Meeting");
    assert!(calls[0].start.starts_with("2025-06-03T14:00:00"));
    assert!(calls[0].end.starts_with("2025-06-03T15:00:00"));

    // The record landed in the store with the token embedded
    let index = fs::read_to_string(dir.path().join("records.json")).unwrap();
    assert!(index.contains("Calendar_ID=p9hb6pri1f0vh8gs93517qrsfs"));
}

/// Full modify flow: the stored record resolves the calendar id and is
/// replaced in place with the updated text
#[tokio::test]
async fn test_modify_event_resolves_and_updates() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open_store(dir.path()).await;
    store
        .append("Created new event 'Team Meeting' with Calendar_ID=abc123 starting at 2025-06-03 14:00 with participant(s) Alice, Bob")
        .await
        .unwrap();

    let chat = Arc::new(ScriptedChat::new(&[
        &routed(
            "modify_event",
            0.9,
            "Move the team meeting with Alice and Bob to Wednesday at 3pm",
        ),
        r#"{"event_identifier":"Team meeting with Alice and Bob","date":"2025-06-04","start_time":"15:00","duration_minutes":60}"#,
    ]));
    let calendar = Arc::new(MockCalendar::new("abc123"));
    let mut assistant =
        CalendarAssistant::new(chat, calendar.clone(), Some(store), toronto());

    let response = assistant
        .process("Can you move the team meeting with Alice and Bob to next Wednesday at 3pm instead?")
        .await
        .unwrap()
        .unwrap();

    assert!(response.success);
    assert!(response.message.contains("Modified event"));

    let calls = calendar.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].event_id.as_deref(), Some("abc123"));
    assert!(calls[0].start.starts_with("2025-06-04T15:00:00"));

    // The matched record was replaced in place, same id, new text
    let index = fs::read_to_string(dir.path().join("records.json")).unwrap();
    let records: serde_json::Value = serde_json::from_str(&index).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "id1");
    assert!(records[0]["description"]
        .as_str()
        .unwrap()
        .starts_with("Updated event"));
}

/// A modify request with nothing in the store fails closed
#[tokio::test]
async fn test_modify_event_with_empty_store_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path()).await;

    let chat = Arc::new(ScriptedChat::new(&[
        &routed("modify_event", 0.9, "Move the team meeting to 3pm"),
        r#"{"event_identifier":"Team meeting","date":"2025-06-04","start_time":"15:00","duration_minutes":60}"#,
    ]));
    let calendar = Arc::new(MockCalendar::new("abc123"));
    let mut assistant =
        CalendarAssistant::new(chat, calendar.clone(), Some(store), toronto());

    let response = assistant
        .process("Move the team meeting to 3pm")
        .await
        .unwrap()
        .unwrap();

    assert!(!response.success);
    assert!(response.message.contains("Failed to modify event"));
    // The update call never happened
    assert!(calendar.calls.lock().unwrap().is_empty());
}

/// A modify request without a record store fails closed too
#[tokio::test]
async fn test_modify_event_without_persistence_fails_closed() {
    let chat = Arc::new(ScriptedChat::new(&[
        &routed("modify_event", 0.9, "Move the team meeting to 3pm"),
        r#"{"event_identifier":"Team meeting","date":"2025-06-04","start_time":"15:00","duration_minutes":60}"#,
    ]));
    let calendar = Arc::new(MockCalendar::new("abc123"));
    let mut assistant = CalendarAssistant::new(chat, calendar.clone(), None, toronto());

    let response = assistant
        .process("Move the team meeting to 3pm")
        .await
        .unwrap()
        .unwrap();

    assert!(!response.success);
    assert!(calendar.calls.lock().unwrap().is_empty());
}

/// Calendar failures on the create path become a failure response
#[tokio::test]
async fn test_create_failure_becomes_failure_response() {
    let chat = Arc::new(ScriptedChat::new(&[
        &routed("new_event", 0.95, "Schedule a team meeting"),
        r#"{"name":"Team Meeting","date":"2025-06-03","start_time":"14:00","duration_minutes":60,"participants":[]}"#,
    ]));
    let calendar = Arc::new(MockCalendar::failing());
    let mut assistant = CalendarAssistant::new(chat, calendar, None, toronto());

    let response = assistant
        .process("Schedule a team meeting")
        .await
        .unwrap()
        .unwrap();

    assert!(!response.success);
    assert!(response.message.contains("Failed to create event"));
    assert!(response.calendar_link.is_none());
}

/// Unparseable extraction output fails closed as well
#[tokio::test]
async fn test_invalid_extraction_date_fails_closed() {
    let chat = Arc::new(ScriptedChat::new(&[
        &routed("new_event", 0.95, "Schedule a team meeting"),
        r#"{"name":"Team Meeting","date":"sometime soon","start_time":"late","duration_minutes":60,"participants":[]}"#,
    ]));
    let calendar = Arc::new(MockCalendar::new("abc123"));
    let mut assistant = CalendarAssistant::new(chat, calendar.clone(), None, toronto());

    let response = assistant
        .process("Schedule a team meeting")
        .await
        .unwrap()
        .unwrap();

    assert!(!response.success);
    assert!(calendar.calls.lock().unwrap().is_empty());
}
