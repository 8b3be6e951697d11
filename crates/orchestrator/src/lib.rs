//! Repository assistant control loop.
//!
//! [`Orchestrator::run`] is the single entry point: text in, text out. Behind
//! it the orchestrator alternates between the [`assistant::LanguageModel`] and
//! the tools behind [`ToolDispatcher`] until the model produces a plain reply
//! or the per-request round ceiling is hit.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Sequences calls between the domain in the
//! [`assistant`] crate and the port implementations (GitHub, LLM). Contains
//! no platform or provider details of its own.

pub mod dispatch;
pub mod engine;
pub mod prompt;

#[cfg(test)]
mod test_support;

pub use dispatch::ToolDispatcher;
pub use engine::{Orchestrator, OrchestratorConfig, DEFAULT_MAX_ROUNDS};
pub use prompt::{DEFAULT_SYSTEM_PROMPT, GIVE_UP_MESSAGE};
