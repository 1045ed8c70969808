pub mod calendar;
pub mod config;
pub mod error;
pub mod llm;
pub mod mail;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod startup;
pub mod store;
pub mod utils;
