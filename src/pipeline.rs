use crate::calendar::CalendarApi;
use crate::error::{store_error, AppResult};
use crate::llm::{self, ChatModel};
use crate::models::{CalendarResponse, RequestKind};
use crate::resolver::resolve_event_id;
use crate::store::EventStore;
use crate::utils::time;
use chrono::Utc;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Minimum classifier confidence required to proceed past routing
pub const CONFIDENCE_THRESHOLD: f32 = 0.70;

/// The request-processing pipeline: route, extract, apply, record
///
/// `store: None` is the non-persisted configuration; with it, created events
/// leave no record and modification requests cannot be resolved.
pub struct CalendarAssistant {
    chat: Arc<dyn ChatModel>,
    calendar: Arc<dyn CalendarApi>,
    store: Option<EventStore>,
    timezone: Tz,
}

impl CalendarAssistant {
    pub fn new(
        chat: Arc<dyn ChatModel>,
        calendar: Arc<dyn CalendarApi>,
        store: Option<EventStore>,
        timezone: Tz,
    ) -> Self {
        Self {
            chat,
            calendar,
            store,
            timezone,
        }
    }

    /// Process one raw request
    ///
    /// `Ok(None)` means the request was not recognized as a calendar
    /// operation: the classifier either returned `other` or scored below the
    /// confidence threshold. Handler failures come back as `success: false`
    /// responses rather than errors.
    pub async fn process(&mut self, user_input: &str) -> AppResult<Option<CalendarResponse>> {
        info!("Processing calendar request");

        let routed = llm::route_request(self.chat.as_ref(), user_input).await?;

        if routed.confidence_score < CONFIDENCE_THRESHOLD {
            warn!("Low confidence score: {}", routed.confidence_score);
            return Ok(None);
        }

        match routed.request_type {
            RequestKind::NewEvent => Ok(Some(self.handle_new_event(&routed.description).await)),
            RequestKind::ModifyEvent => {
                Ok(Some(self.handle_modify_event(&routed.description).await))
            }
            RequestKind::Other => {
                warn!("Request type not supported");
                Ok(None)
            }
        }
    }

    /// Process a new event request and create it in the calendar
    async fn handle_new_event(&mut self, description: &str) -> CalendarResponse {
        match self.create_event(description).await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to process new event: {}", e);
                CalendarResponse {
                    success: false,
                    message: format!("Failed to create event: {}", e),
                    calendar_link: None,
                }
            }
        }
    }

    /// Process an event modification request
    ///
    /// Fails closed like the create path: resolution and update errors become
    /// a failure response instead of propagating.
    async fn handle_modify_event(&mut self, description: &str) -> CalendarResponse {
        match self.modify_event(description).await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to modify event: {}", e);
                CalendarResponse {
                    success: false,
                    message: format!("Failed to modify event: {}", e),
                    calendar_link: None,
                }
            }
        }
    }

    async fn create_event(&mut self, description: &str) -> AppResult<CalendarResponse> {
        // Step 1: Extract event details
        let details = llm::extract_new_event(self.chat.as_ref(), description, Utc::now()).await?;

        // Step 2: Normalize the date and time
        let start = time::parse_event_datetime(&details.date, &details.start_time, self.timezone)?;
        let end = time::event_end(start, details.duration_minutes)?;

        // Step 3: Create the event in the calendar
        let handle = self.calendar.create_event(&details.name, start, end).await?;

        // Step 4: Record the event, with the calendar id embedded in the text
        let message = format!(
            "Created new event '{}' with Calendar_ID={} starting at {} with participant(s) {}",
            details.name,
            handle.id,
            start.format("%Y-%m-%d %H:%M"),
            details.participants.join(", ")
        );
        if let Some(store) = self.store.as_mut() {
            store.append(&message).await?;
        }

        Ok(CalendarResponse {
            success: true,
            message,
            calendar_link: handle.html_link,
        })
    }

    async fn modify_event(&mut self, description: &str) -> AppResult<CalendarResponse> {
        let details =
            llm::extract_modify_event(self.chat.as_ref(), description, Utc::now()).await?;

        let start = time::parse_event_datetime(&details.date, &details.start_time, self.timezone)?;
        let end = time::event_end(start, details.duration_minutes)?;

        // Resolve the calendar event id from the record store
        let store = self.store.as_ref().ok_or_else(|| {
            store_error("Record persistence is disabled, cannot resolve an existing event")
        })?;
        let event_id = resolve_event_id(store, &details.event_identifier).await?;

        let handle = self
            .calendar
            .update_event(&event_id, &details.event_identifier, start, end)
            .await?;

        // Overwrite the matched record so later modifications find the new state
        let new_text = format!(
            "Updated event '{}' with Calendar_ID={} now starting at {}",
            details.event_identifier,
            handle.id,
            start.format("%Y-%m-%d %H:%M")
        );
        if let Some(store) = self.store.as_mut() {
            store.replace(&details.event_identifier, &new_text).await?;
        }

        Ok(CalendarResponse {
            success: true,
            message: format!(
                "Modified event '{}' with the requested changes",
                details.event_identifier
            ),
            calendar_link: handle.html_link,
        })
    }
}
