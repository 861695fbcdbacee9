//! Document Q&A backend.
//!
//! Stores small text documents with their embeddings, retrieves a relevant
//! subset for a natural-language question, and assembles a bounded context
//! for a rate-limited external generation call.

pub mod ai;
pub mod config;
pub mod core;
pub mod logging;
pub mod rag;
pub mod server;
pub mod state;
pub mod store;
pub mod throttle;
