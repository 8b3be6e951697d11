//! Language-model adapter for the repository assistant.
//!
//! [`OpenAiModel`] implements the [`assistant::LanguageModel`] port over an
//! OpenAI-compatible chat-completions endpoint with function calling.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** The [`mapping`] module owns the wire format; nothing
//! outside this crate sees provider JSON.

pub mod client;
pub mod mapping;

pub use client::{OpenAiConfig, OpenAiModel, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Errors raised while constructing the adapter.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}
