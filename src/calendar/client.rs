use super::token::TokenManager;
use super::{CalendarApi, EventHandle};
use crate::config::Config;
use crate::error::{google_calendar_error, AppResult};
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Google Calendar v3 client
pub struct GoogleCalendarClient {
    config: Arc<RwLock<Config>>,
    token_manager: TokenManager,
    client: Client,
}

impl GoogleCalendarClient {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            token_manager: TokenManager::new(Arc::clone(&config)),
            config,
            client: Client::new(),
        }
    }

    /// Calendar ID and timezone from the shared config
    async fn calendar_settings(&self) -> (String, String) {
        let config_read = self.config.read().await;
        (
            config_read.google_calendar_id.clone(),
            config_read.timezone.clone(),
        )
    }

    /// Bearer access token for the API call
    async fn access_token(&self) -> AppResult<String> {
        let token = self.token_manager.get_token().await?;
        token
            .get("access_token")
            .and_then(|t| t.as_str())
            .map(|t| t.to_string())
            .ok_or_else(|| google_calendar_error("No access token available"))
    }

    /// Event resource body for insert/update calls
    fn event_body(summary: &str, start: DateTime<Tz>, end: DateTime<Tz>, timezone: &str) -> Value {
        json!({
            "summary": summary,
            "start": {
                "dateTime": start.to_rfc3339(),
                "timeZone": timezone,
            },
            "end": {
                "dateTime": end.to_rfc3339(),
                "timeZone": timezone,
            },
        })
    }

    /// Parse an event handle out of an API response
    async fn parse_event_response(response: reqwest::Response, action: &str) -> AppResult<EventHandle> {
        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to {} event: HTTP {} - {}",
                action, status, error_body
            )));
        }

        let event: Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse event response: {}", e)))?;

        let id = event
            .get("id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| google_calendar_error("Event response missing 'id' field"))?
            .to_string();
        let html_link = event
            .get("htmlLink")
            .and_then(|l| l.as_str())
            .map(|l| l.to_string());

        Ok(EventHandle { id, html_link })
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn create_event(
        &self,
        summary: &str,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> AppResult<EventHandle> {
        let (calendar_id, timezone) = self.calendar_settings().await;
        let access_token = self.access_token().await?;

        let url = format!(
            "https://www.googleapis.com/calendar/v3/calendars/{}/events",
            calendar_id
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", access_token))
            .json(&Self::event_body(summary, start, end, &timezone))
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to create event: {}", e)))?;

        let handle = Self::parse_event_response(response, "create").await?;
        info!("Created event: {:?}", handle.html_link);
        Ok(handle)
    }

    async fn update_event(
        &self,
        event_id: &str,
        summary: &str,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> AppResult<EventHandle> {
        let (calendar_id, timezone) = self.calendar_settings().await;
        let access_token = self.access_token().await?;

        let url = format!(
            "https://www.googleapis.com/calendar/v3/calendars/{}/events/{}",
            calendar_id, event_id
        );

        let response = self
            .client
            .put(&url)
            .header("Authorization", format!("Bearer {}", access_token))
            .json(&Self::event_body(summary, start, end, &timezone))
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to modify event: {}", e)))?;

        let handle = Self::parse_event_response(response, "modify").await?;
        info!("Modified event: {:?}", handle.html_link);
        Ok(handle)
    }
}
