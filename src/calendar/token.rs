use crate::config::Config;
use crate::error::{google_calendar_error, AppResult};
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Manages the cached OAuth token used for Google API calls
///
/// The token JSON lives in a local file (the `token.json` convention) holding
/// `access_token`, `refresh_token` and `expires_at`. An expired access token
/// is refreshed with the stored refresh token and written back.
#[derive(Clone)]
pub struct TokenManager {
    config: Arc<RwLock<Config>>,
    client: Client,
}

impl TokenManager {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Get an OAuth token, refreshing it first if it has expired
    pub async fn get_token(&self) -> AppResult<Value> {
        let token_path = {
            let config_read = self.config.read().await;
            config_read.token_path.clone()
        };

        let token_str = fs::read_to_string(&token_path).map_err(|e| {
            google_calendar_error(&format!(
                "Failed to read token file '{}': {}. Please set up the token manually.",
                token_path, e
            ))
        })?;

        let token: Value = serde_json::from_str(&token_str)
            .map_err(|e| google_calendar_error(&format!("Failed to parse token JSON: {}", e)))?;

        // Check if token is expired
        if let Some(expiry) = token.get("expires_at").and_then(|v| v.as_i64()) {
            let now = Utc::now().timestamp();
            if expiry > now {
                return Ok(token);
            }
        }

        // Token is expired or carries no expiry, refresh it
        self.refresh_token(&token, &token_path).await
    }

    /// Refresh an expired token and persist the result
    async fn refresh_token(&self, token: &Value, token_path: &str) -> AppResult<Value> {
        let refresh_token = token
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| google_calendar_error("No refresh token in token data"))?;

        let (client_id, client_secret) = {
            let config_read = self.config.read().await;
            (
                config_read.google_client_id.clone(),
                config_read.google_client_secret.clone(),
            )
        };

        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token.to_string()),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self
            .client
            .post("https://oauth2.googleapis.com/token")
            .form(&params)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse token response: {}", e)))?;

        let access_token = new_token
            .get("access_token")
            .cloned()
            .ok_or_else(|| google_calendar_error("Token response missing 'access_token' field"))?;

        // Combine new access token with the existing refresh token
        let mut token_data = serde_json::Map::new();
        token_data.insert("access_token".to_string(), access_token);
        token_data.insert("refresh_token".to_string(), json!(refresh_token));

        // Calculate expiry
        let expires_in = new_token
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .unwrap_or(3600);
        token_data.insert("expires_at".to_string(), json!(Utc::now().timestamp() + expires_in));

        let token_json = json!(token_data);
        fs::write(token_path, token_json.to_string()).map_err(|e| {
            google_calendar_error(&format!("Failed to save token to '{}': {}", token_path, e))
        })?;

        Ok(token_json)
    }
}
