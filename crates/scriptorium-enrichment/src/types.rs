//! Request/response shapes for the `Enricher` interface.

/// One document to enrich: an opaque id the caller uses to re-associate the
/// response, the text to summarize/describe, and the system prompt steering
/// the completion.
#[derive(Debug, Clone)]
pub struct EnrichmentRequest {
    pub id: String,
    pub text: String,
    pub system_prompt: String,
}

#[derive(Debug, Clone)]
pub struct EnrichmentResponse {
    pub id: String,
    pub text: String,
}

/// The provider-facing request: same shape as `EnrichmentRequest` minus the
/// caller's id, since `LlmProvider` has no notion of batching.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub text: String,
    pub system_prompt: String,
}
