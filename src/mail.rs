use crate::calendar::TokenManager;
use crate::error::{gmail_error, AppResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

/// Gmail reader for the mailbox input source
pub struct GmailReader {
    token_manager: TokenManager,
    client: Client,
}

impl GmailReader {
    pub fn new(token_manager: TokenManager) -> Self {
        Self {
            token_manager,
            client: Client::new(),
        }
    }

    /// Fetch the body of the most recent unread message
    ///
    /// Transport and HTTP failures are errors; a missing or undecodable
    /// payload is logged and yields `None`, in which case the pipeline simply
    /// does not run.
    pub async fn fetch_latest_unread(&self) -> AppResult<Option<String>> {
        let token = self.token_manager.get_token().await?;
        let access_token = token
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| gmail_error("No access token available"))?;

        // Request the single most recent unread message id
        let mut url = Url::parse("https://gmail.googleapis.com/gmail/v1/users/me/messages")
            .map_err(|e| gmail_error(&format!("Failed to parse URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("maxResults", "1")
            .append_pair("q", "is:unread");

        let list: Value = self.fetch_json(url.as_str(), access_token).await?;

        let message_id = match list
            .get("messages")
            .and_then(|m| m.as_array())
            .and_then(|m| m.first())
            .and_then(|m| m.get("id"))
            .and_then(|id| id.as_str())
        {
            Some(id) => id.to_string(),
            None => {
                info!("No unread messages");
                return Ok(None);
            }
        };

        // Fetch the full message
        let message_url = format!(
            "https://gmail.googleapis.com/gmail/v1/users/me/messages/{}",
            message_id
        );
        let message: Value = self.fetch_json(&message_url, access_token).await?;

        match decode_body(&message) {
            Some(body) => {
                info!("Extracted the email:\n{}", body);
                Ok(Some(body))
            }
            None => {
                warn!("Could not decode body of message {}", message_id);
                Ok(None)
            }
        }
    }

    async fn fetch_json(&self, url: &str, access_token: &str) -> AppResult<Value> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| gmail_error(&format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(gmail_error(&format!(
                "Request failed: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| gmail_error(&format!("Failed to parse response: {}", e)))
    }
}

/// Decode the base64url body text out of a Gmail message resource
///
/// Multipart messages carry the text in `payload.parts[0].body.data`, plain
/// ones directly in `payload.body.data`.
fn decode_body(message: &Value) -> Option<String> {
    let payload = message.get("payload")?;

    let data = payload
        .get("parts")
        .and_then(|parts| parts.as_array())
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("body"))
        .and_then(|body| body.get("data"))
        .or_else(|| payload.get("body").and_then(|body| body.get("data")))?
        .as_str()?;

    let decoded = URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')).ok()?;
    String::from_utf8(decoded).ok()
}
