use crate::calendar::{GoogleCalendarClient, TokenManager};
use crate::config::{Config, InputSource};
use crate::error::{config_error, Error};
use crate::llm::GeminiChat;
use crate::mail::GmailReader;
use crate::pipeline::CalendarAssistant;
use crate::store::{EventStore, GeminiEmbedder};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the pipeline, pick the input text, process it and print the outcome
pub async fn run(config: Arc<RwLock<Config>>, args: &[String]) -> miette::Result<()> {
    let (api_key, model, embedding_model, store_dir, timezone, persist_records, input_source) = {
        let config_read = config.read().await;
        (
            config_read.gemini_api_key.clone(),
            config_read.gemini_model.clone(),
            config_read.gemini_embedding_model.clone(),
            config_read.store_dir.clone(),
            config_read.timezone.clone(),
            config_read.persist_records,
            config_read.input_source,
        )
    };

    let timezone: Tz = timezone
        .parse()
        .map_err(|_| config_error(&format!("Invalid timezone: {}", timezone)))?;

    // Assemble the collaborators
    let chat = Arc::new(GeminiChat::new(&api_key, &model));
    let calendar = Arc::new(GoogleCalendarClient::new(Arc::clone(&config)));
    let store = if persist_records {
        let embedder = Arc::new(GeminiEmbedder::new(&api_key, &embedding_model));
        Some(EventStore::open(&store_dir, embedder).await?)
    } else {
        info!("Record persistence disabled");
        None
    };
    let mut assistant = CalendarAssistant::new(chat, calendar, store, timezone);

    // Pick the input text: command line or the latest unread mail
    let use_mailbox =
        input_source == InputSource::Mailbox || args.iter().any(|a| a == "--mailbox");
    let input = if use_mailbox {
        let reader = GmailReader::new(TokenManager::new(Arc::clone(&config)));
        match reader.fetch_latest_unread().await? {
            Some(body) => body,
            None => {
                println!("No request to process");
                return Ok(());
            }
        }
    } else {
        let text = args
            .iter()
            .filter(|a| a.as_str() != "--mailbox")
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        if text.trim().is_empty() {
            return Err(config_error(
                "No request text given. Pass the request on the command line or set INPUT_SOURCE=mailbox.",
            )
            .into());
        }
        text
    };

    match assistant.process(&input).await? {
        Some(response) => println!("Response: {}", response.message),
        None => println!("Request not recognized as a calendar operation"),
    }

    Ok(())
}
