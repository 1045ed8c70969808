#![allow(dead_code)]

use async_trait::async_trait;
use calroute::calendar::{CalendarApi, EventHandle};
use calroute::error::{google_calendar_error, llm_error, AppResult};
use calroute::llm::ChatModel;
use calroute::store::Embedder;
use chrono::DateTime;
use chrono_tz::Tz;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Chat model that replays a fixed sequence of responses
pub struct ScriptedChat {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedChat {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, _preamble: &str, _prompt: &str) -> AppResult<String> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| llm_error("Scripted responses exhausted"))
    }
}

/// One create or update call recorded by the mock calendar
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The event id, for update calls
    pub event_id: Option<String>,
    pub summary: String,
    pub start: String,
    pub end: String,
}

/// Mock calendar backend recording its calls
pub struct MockCalendar {
    event_id: String,
    fail: bool,
    pub calls: Mutex<Vec<RecordedCall>>,
}

impl MockCalendar {
    /// Calendar that assigns the given id to every event
    pub fn new(event_id: &str) -> Self {
        Self {
            event_id: event_id.to_string(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calendar whose every call fails
    pub fn failing() -> Self {
        Self {
            event_id: String::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn handle(&self) -> EventHandle {
        EventHandle {
            id: self.event_id.clone(),
            html_link: Some(format!(
                "https://calendar.google.com/event?eid={}",
                self.event_id
            )),
        }
    }
}

#[async_trait]
impl CalendarApi for MockCalendar {
    async fn create_event(
        &self,
        summary: &str,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> AppResult<EventHandle> {
        if self.fail {
            return Err(google_calendar_error("Simulated create failure"));
        }
        self.calls.lock().unwrap().push(RecordedCall {
            event_id: None,
            summary: summary.to_string(),
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });
        Ok(self.handle())
    }

    async fn update_event(
        &self,
        event_id: &str,
        summary: &str,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> AppResult<EventHandle> {
        if self.fail {
            return Err(google_calendar_error("Simulated update failure"));
        }
        self.calls.lock().unwrap().push(RecordedCall {
            event_id: Some(event_id.to_string()),
            summary: summary.to_string(),
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });
        Ok(self.handle())
    }
}

/// Deterministic embedder: a 26-dimensional lowercase letter histogram
///
/// Digits are ignored, so two texts differing only in embedded identifiers
/// embed identically, which is exactly what the ambiguity tests need.
pub struct LetterFrequencyEmbedder;

#[async_trait]
impl Embedder for LetterFrequencyEmbedder {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut histogram = vec![0.0f32; 26];
        for c in text.chars() {
            let lower = c.to_ascii_lowercase();
            if lower.is_ascii_lowercase() {
                histogram[(lower as u8 - b'a') as usize] += 1.0;
            }
        }
        Ok(histogram)
    }
}
