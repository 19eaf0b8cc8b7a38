//! HTTP request handlers

pub mod config;
pub mod health;
pub mod query;
pub mod types;

pub use config::get_rag_settings;
pub use health::health_check;
pub use query::{get_conversation_messages, rag_query};
