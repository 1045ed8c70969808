use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The classified purpose of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Create a new calendar event
    NewEvent,
    /// Modify an existing calendar event
    ModifyEvent,
    /// Anything that is not a supported calendar operation
    Other,
}

/// Router output: what kind of calendar request this is
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RoutedRequest {
    /// Type of calendar request being made
    pub request_type: RequestKind,
    /// Confidence score between 0 and 1
    pub confidence_score: f32,
    /// Cleaned description of the request
    pub description: String,
}

/// Details for creating a new event
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewEventDetails {
    /// Name of the event
    pub name: String,
    /// Date of the event (ISO 8601)
    pub date: String,
    /// The start time of the event
    pub start_time: String,
    /// Duration in minutes
    pub duration_minutes: i64,
    /// List of participants
    pub participants: Vec<String>,
}

/// A single field change on an existing event
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EventChange {
    /// Field to change
    pub field: String,
    /// New value for the field
    pub new_value: String,
}

/// Details for modifying an existing event
///
/// `changes` and the participant deltas are extracted for schema completeness
/// but are not consumed downstream; the new date, start time and duration
/// drive the update.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModifyEventDetails {
    /// Description used to identify the existing event
    pub event_identifier: String,
    /// List of changes to make
    #[serde(default)]
    pub changes: Vec<EventChange>,
    /// The new date of the event (ISO 8601)
    pub date: String,
    /// The new start time of the event
    pub start_time: String,
    /// Duration in minutes
    pub duration_minutes: i64,
    /// New participants to add
    #[serde(default)]
    pub participants_to_add: Vec<String>,
    /// Participants to remove
    #[serde(default)]
    pub participants_to_remove: Vec<String>,
}

/// Final response returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CalendarResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// User-friendly response message
    pub message: String,
    /// Calendar link if applicable
    pub calendar_link: Option<String>,
}
