//! Retrieval-augmented query core.
//!
//! - `selector`: resolves caller criteria into a working document subset
//! - `ranker`: cosine-similarity scoring with threshold and result cap
//! - `context`: bounded, deterministic prompt composition
//! - `orchestrator`: the per-request sequence and response packaging

pub mod context;
pub mod orchestrator;
pub mod ranker;
pub mod selector;
