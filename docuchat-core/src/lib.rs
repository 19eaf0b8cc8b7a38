//! Docuchat Core - Shared data structures and infrastructure
//!
//! This crate defines the error handling, logging and configuration
//! foundations used by the rest of the docuchat system.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
