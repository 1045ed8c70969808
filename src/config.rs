use crate::error::{env_error, AppResult, Error};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;

/// Default IANA timezone for created events
pub const DEFAULT_TIMEZONE: &str = "America/Toronto";

/// Default Gemini chat model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default Gemini embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Where the request text comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSource {
    /// Text passed on the command line
    Direct,
    /// Body of the most recent unread Gmail message
    Mailbox,
}

/// Main configuration structure for the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gemini API key for chat and embedding calls
    pub gemini_api_key: String,
    /// Gemini chat model name
    pub gemini_model: String,
    /// Gemini embedding model name
    pub gemini_embedding_model: String,
    /// Google API client ID (token refresh)
    pub google_client_id: String,
    /// Google API client secret (token refresh)
    pub google_client_secret: String,
    /// Google Calendar ID events are created on
    pub google_calendar_id: String,
    /// Path to the cached OAuth token JSON
    pub token_path: String,
    /// Directory holding the record store files
    pub store_dir: String,
    /// Timezone for created events
    pub timezone: String,
    /// Whether event records are persisted to the store
    pub persist_records: bool,
    /// Where request text is read from
    pub input_source: InputSource,
}

impl Config {
    /// Load configuration from the environment
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let gemini_api_key =
            env::var("GEMINI_API_KEY").map_err(|_| env_error("GEMINI_API_KEY"))?;
        let google_client_id =
            env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret =
            env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;
        let google_calendar_id =
            env::var("GOOGLE_CALENDAR_ID").map_err(|_| env_error("GOOGLE_CALENDAR_ID"))?;

        // Optional values with defaults
        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| String::from(DEFAULT_GEMINI_MODEL));
        let gemini_embedding_model = env::var("GEMINI_EMBEDDING_MODEL")
            .unwrap_or_else(|_| String::from(DEFAULT_EMBEDDING_MODEL));
        let token_path = env::var("TOKEN_PATH").unwrap_or_else(|_| String::from("token.json"));
        let store_dir = env::var("STORE_DIR").unwrap_or_else(|_| String::from("eventdb"));
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from(DEFAULT_TIMEZONE));

        let persist_records = match env::var("PERSIST_RECORDS").as_deref() {
            Ok("false") | Ok("0") => false,
            _ => true,
        };

        let input_source = match env::var("INPUT_SOURCE").as_deref() {
            Ok("mailbox") => InputSource::Mailbox,
            Ok("direct") | Err(_) => InputSource::Direct,
            Ok(other) => {
                return Err(Error::Config(format!(
                    "Invalid INPUT_SOURCE '{}', expected 'direct' or 'mailbox'",
                    other
                )))
            }
        };

        Ok(Config {
            gemini_api_key,
            gemini_model,
            gemini_embedding_model,
            google_client_id,
            google_client_secret,
            google_calendar_id,
            token_path,
            store_dir,
            timezone,
            persist_records,
            input_source,
        })
    }
}
