//! The wire-protocol seam. Deliberately minimal: HTTP endpoint, auth, and
//! prompt templating are a provider's own business, not this crate's.

use async_trait::async_trait;

use crate::error::EnrichmentError;
use crate::types::LlmRequest;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<String, EnrichmentError>;
}
