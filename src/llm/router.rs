use super::{extract_json_object, ChatModel};
use crate::error::AppResult;
use crate::models::RoutedRequest;
use tracing::info;

const ROUTER_PREAMBLE: &str = "Determine if this is a request to create a new calendar event or modify an existing one. Respond with only a JSON object.";

const ROUTER_PROMPT_TEMPLATE: &str = "Classify the following request and respond with a JSON object matching this schema:

{schema}

`request_type` must be one of \"new_event\", \"modify_event\" or \"other\".
`confidence_score` is your confidence in the classification, between 0 and 1.
`description` is a cleaned-up restatement of the request.

Request:
{input}";

/// Router LLM call to determine the type of calendar request
pub async fn route_request(chat: &dyn ChatModel, user_input: &str) -> AppResult<RoutedRequest> {
    info!("Routing calendar request");

    let schema = serde_json::to_string_pretty(&schemars::schema_for!(RoutedRequest))?;
    let prompt = ROUTER_PROMPT_TEMPLATE
        .replace("{schema}", &schema)
        .replace("{input}", user_input);

    let response = chat.complete(ROUTER_PREAMBLE, &prompt).await?;
    let routed: RoutedRequest = extract_json_object(&response)?;

    info!(
        "Request routed as: {:?} with confidence: {}",
        routed.request_type, routed.confidence_score
    );
    Ok(routed)
}
