//! Stub inference engine.
//!
//! # Responsibilities
//! - Validate inbound invocation payloads
//! - Produce a completion for a validated prompt
//!
//! # Design Decisions
//! - The echo model keeps the gateway self-contained; swapping in a
//!   real model client changes this module only
//! - Validation and generation are separate steps so each gets its own
//!   subsegment in the trace

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::schema::InferenceConfig;

/// Errors produced by the inference engine.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The payload had no usable `inputs` field.
    #[error("Missing required field: inputs")]
    MissingInputs,

    /// The input exceeded the configured length cap.
    #[error("Input exceeds maximum length of {0} characters")]
    InputTooLong(usize),

    /// Generation failed after validation.
    #[error("Generation failed: {0}")]
    Generation(String),
}

/// Inbound invocation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Text to run through the model.
    pub inputs: Option<String>,

    /// Free-form generation parameters; accepted but unused by the
    /// echo model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// A validated prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
}

/// A model completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub output: String,
    pub model: String,
    pub tokens: u32,
}

/// The gateway's model seam.
pub struct InferenceEngine {
    config: InferenceConfig,
}

impl InferenceEngine {
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Check the payload and build a prompt from it.
    pub fn validate(&self, request: &InvokeRequest) -> Result<Prompt, InferenceError> {
        let text = request
            .inputs
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(InferenceError::MissingInputs)?;

        if text.chars().count() > self.config.max_input_chars {
            return Err(InferenceError::InputTooLong(self.config.max_input_chars));
        }

        Ok(Prompt {
            text: text.to_string(),
        })
    }

    /// Produce a completion for a validated prompt.
    pub async fn generate(&self, prompt: &Prompt) -> Result<Completion, InferenceError> {
        let tokens = prompt.text.split_whitespace().count() as u32;
        if tokens == 0 {
            return Err(InferenceError::Generation("empty prompt".to_string()));
        }

        Ok(Completion {
            output: prompt.text.clone(),
            model: self.config.model_name.clone(),
            tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> InferenceEngine {
        InferenceEngine::new(InferenceConfig::default())
    }

    #[test]
    fn validate_requires_inputs() {
        let request = InvokeRequest {
            inputs: None,
            parameters: None,
        };
        let err = engine().validate(&request).unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: inputs");
    }

    #[test]
    fn validate_rejects_blank_inputs() {
        let request = InvokeRequest {
            inputs: Some("   ".to_string()),
            parameters: None,
        };
        assert!(matches!(
            engine().validate(&request),
            Err(InferenceError::MissingInputs)
        ));
    }

    #[test]
    fn validate_enforces_length_cap() {
        let engine = InferenceEngine::new(InferenceConfig {
            max_input_chars: 4,
            ..InferenceConfig::default()
        });
        let request = InvokeRequest {
            inputs: Some("hello".to_string()),
            parameters: None,
        };
        assert!(matches!(
            engine.validate(&request),
            Err(InferenceError::InputTooLong(4))
        ));
    }

    #[tokio::test]
    async fn generate_echoes_and_counts_tokens() {
        let prompt = Prompt {
            text: "hello traced world".to_string(),
        };
        let completion = engine().generate(&prompt).await.unwrap();
        assert_eq!(completion.output, "hello traced world");
        assert_eq!(completion.tokens, 3);
        assert_eq!(completion.model, "echo-1");
    }
}
