use super::{extract_json_object, ChatModel};
use crate::error::AppResult;
use crate::models::{ModifyEventDetails, NewEventDetails};
use chrono::{DateTime, Utc};
use tracing::info;

const NEW_EVENT_PREAMBLE: &str =
    "Extract details for creating a new calendar event. Respond with only a JSON object.";

const MODIFY_EVENT_PREAMBLE: &str = "Extract details for modifying an existing calendar event. \
Note that terms like \"next\" indicate the modification should be scheduled after the event's original date. \
Respond with only a JSON object.";

const EXTRACT_PROMPT_TEMPLATE: &str = "{date_context} Extract the event details from the request below into a JSON object matching this schema:

{schema}

Use ISO 8601 (YYYY-MM-DD) for the date field and HH:MM for the start time.

Request:
{input}";

/// Date context supplied so the model can resolve relative phrases like "next Tuesday"
fn date_context(now: DateTime<Utc>) -> String {
    format!("Today is {}.", now.format("%A, %B %d, %Y"))
}

/// Extraction LLM call for a new-event request
pub async fn extract_new_event(
    chat: &dyn ChatModel,
    description: &str,
    now: DateTime<Utc>,
) -> AppResult<NewEventDetails> {
    info!("Processing new event request");

    let schema = serde_json::to_string_pretty(&schemars::schema_for!(NewEventDetails))?;
    let prompt = EXTRACT_PROMPT_TEMPLATE
        .replace("{date_context}", &date_context(now))
        .replace("{schema}", &schema)
        .replace("{input}", description);

    let response = chat.complete(NEW_EVENT_PREAMBLE, &prompt).await?;
    let details: NewEventDetails = extract_json_object(&response)?;

    info!("New event extracted: {}", serde_json::to_string(&details)?);
    Ok(details)
}

/// Extraction LLM call for a modify-event request
pub async fn extract_modify_event(
    chat: &dyn ChatModel,
    description: &str,
    now: DateTime<Utc>,
) -> AppResult<ModifyEventDetails> {
    info!("Processing event modification request");

    let schema = serde_json::to_string_pretty(&schemars::schema_for!(ModifyEventDetails))?;
    let prompt = EXTRACT_PROMPT_TEMPLATE
        .replace("{date_context}", &date_context(now))
        .replace("{schema}", &schema)
        .replace("{input}", description);

    let response = chat.complete(MODIFY_EVENT_PREAMBLE, &prompt).await?;
    let details: ModifyEventDetails = extract_json_object(&response)?;

    info!(
        "Modification extracted: {}",
        serde_json::to_string(&details)?
    );
    Ok(details)
}
