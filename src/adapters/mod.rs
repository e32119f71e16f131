//! Adapter interfaces for external systems.
//!
//! Adapters wrap the services the evaluator talks to: the local model
//! server that answers questions, and the Wikipedia feed that supplies
//! facts.

pub mod ollama;
pub mod wikipedia;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ollama::OllamaClient;
pub use wikipedia::OnThisDayClient;

/// Sampling parameters sent with every generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_tokens: u32,
    /// Fixed seed; None lets the caller draw one per query
    pub seed: Option<u64>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1000,
            seed: None,
        }
    }
}

/// One request to a model
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub system: Option<String>,
    pub params: GenerationParams,
}

/// Failures talking to a model server
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Cannot connect to model server at {0}")]
    Connection(String),

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Model server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed model response: {0}")]
    Malformed(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Trait for model-query backends
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Generate a free-text answer
    async fn generate(&self, request: &GenerationRequest) -> Result<String, QueryError>;

    /// Check the backend is reachable
    async fn health_check(&self) -> Result<(), QueryError>;
}
