mod client;
mod token;

pub use client::GoogleCalendarClient;
pub use token::TokenManager;

use crate::error::AppResult;
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Reference to a calendar event returned by the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventHandle {
    /// Opaque identifier assigned by the calendar service
    pub id: String,
    /// Browser link to the event, if the service returned one
    pub html_link: Option<String>,
}

/// The calendar backend events are created on and updated against
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Create a single event and return its handle
    async fn create_event(
        &self,
        summary: &str,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> AppResult<EventHandle>;

    /// Update an existing event's summary and times
    async fn update_event(
        &self,
        event_id: &str,
        summary: &str,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> AppResult<EventHandle>;
}
