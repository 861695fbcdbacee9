//! External AI service access.
//!
//! `AiProvider` is the contract the core needs from the embedding/generation
//! service; `OpenAiProvider` talks to any OpenAI-compatible HTTP API.

mod openai;
mod provider;
mod types;

pub use openai::OpenAiProvider;
pub use provider::AiProvider;
pub use types::SamplingParams;
