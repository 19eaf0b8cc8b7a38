//! Token counting utilities
//!
//! Provides token counting using tiktoken-rs, used to report token usage
//! alongside generated answers and to estimate provider cost.

use crate::types::{RagError, RagResult};
use std::sync::OnceLock;
use tiktoken_rs::{get_bpe_from_model, CoreBPE};
use tracing::{debug, warn};

/// Token counter for a specific model family
pub struct TokenCounter {
    encoder: CoreBPE,
    model_name: String,
}

impl TokenCounter {
    /// Create a new token counter for the specified model
    pub fn new(model_name: &str) -> RagResult<Self> {
        let encoder = get_bpe_from_model(model_name).map_err(|e| {
            RagError::Config(format!(
                "Failed to get encoder for model {}: {}",
                model_name, e
            ))
        })?;

        Ok(Self {
            encoder,
            model_name: model_name.to_string(),
        })
    }

    /// Count tokens in a text string
    pub fn count_tokens(&self, text: &str) -> usize {
        self.encoder.encode_with_special_tokens(text).len()
    }

    /// Estimate cost based on token counts (approximate per-1k rates)
    pub fn estimate_cost(&self, input_tokens: usize, output_tokens: usize) -> f64 {
        let (input_cost_per_1k, output_cost_per_1k) = match self.model_name.as_str() {
            "gpt-4o" => (0.01, 0.03),
            "gpt-4" => (0.03, 0.06),
            "gpt-3.5-turbo" => (0.001, 0.002),
            _ => {
                debug!("Unknown model for cost estimation: {}", self.model_name);
                (0.01, 0.03)
            }
        };

        let input_cost = (input_tokens as f64 / 1000.0) * input_cost_per_1k;
        let output_cost = (output_tokens as f64 / 1000.0) * output_cost_per_1k;

        input_cost + output_cost
    }

    /// Get model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Cached counter for the default model family
static DEFAULT_COUNTER: OnceLock<Option<TokenCounter>> = OnceLock::new();

/// Count tokens in a text for the given model.
///
/// Models unknown to tiktoken (e.g. non-OpenAI providers) fall back to the
/// rough 4-characters-per-token heuristic.
pub fn count_tokens(text: &str, model_name: &str) -> usize {
    if let Ok(counter) = TokenCounter::new(model_name) {
        return counter.count_tokens(text);
    }

    let default_counter = DEFAULT_COUNTER.get_or_init(|| match TokenCounter::new("gpt-4o") {
        Ok(counter) => Some(counter),
        Err(e) => {
            warn!("Failed to create default token counter: {}", e);
            None
        }
    });

    match default_counter {
        Some(counter) => counter.count_tokens(text),
        None => estimate_tokens(text),
    }
}

/// Rough token estimation: 1 token per ~4 characters
pub fn estimate_tokens(text: &str) -> usize {
    (text.len() as f32 / 4.0).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_counting() {
        let counter = TokenCounter::new("gpt-4o").unwrap();

        let text = "Hello, world! This is a test.";
        let token_count = counter.count_tokens(text);

        assert!(token_count > 0);
        assert!(token_count < 20);
    }

    #[test]
    fn test_unknown_model_falls_back() {
        let count = count_tokens("Bonjour le monde", "claude-3-5-haiku-latest");
        assert!(count > 0);
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_cost_estimation() {
        let counter = TokenCounter::new("gpt-4o").unwrap();
        let cost = counter.estimate_cost(1000, 500);
        assert!(cost > 0.0);
        assert!(cost < 1.0);
    }
}
