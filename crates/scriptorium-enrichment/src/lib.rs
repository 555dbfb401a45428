//! LLM request fan-out with partial-failure semantics.
//!
//! This crate knows nothing about commits, repositories, or enrichment
//! types — it takes `{id, text, system_prompt}` triples and returns
//! `{id, text}` pairs. The business meaning of a request lives entirely in
//! the caller's prompt.

pub mod enricher;
pub mod error;
pub mod mock;
pub mod provider;
pub mod types;

pub use enricher::{DefaultEnricher, EnrichOptions, Enricher};
pub use error::{EnrichmentError, EnrichmentResult};
pub use mock::MockEnricher;
pub use provider::LlmProvider;
pub use types::{EnrichmentRequest, EnrichmentResponse, LlmRequest};
