//! Handler registry.
//!
//! A `Handler` is registered under the exact operation string a task's
//! `operation` column carries. Registration happens once, at process
//! startup, in the binary's bootstrap — the registry itself never
//! constructs handlers, it only holds them.
//!
//! `Handler::execute` takes a cancellation token and the task's raw JSON
//! payload rather than a business-domain context object: the concrete
//! handler struct captures whatever repositories/clients it needs at
//! registration time, so this crate never needs to depend on the crate
//! that defines those business types.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn execute(
        &self,
        cancellation: CancellationToken,
        payload: serde_json::Value,
    ) -> Result<(), TaskError>;
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: std::sync::RwLock<HashMap<&'static str, Arc<dyn Handler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, operation: &'static str, handler: Arc<dyn Handler>) {
        self.handlers.write().unwrap().insert(operation, handler);
    }

    pub fn get(&self, operation: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.read().unwrap().get(operation).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoHandler;

    #[async_trait]
    impl Handler for EchoHandler {
        async fn execute(
            &self,
            _cancellation: CancellationToken,
            _payload: serde_json::Value,
        ) -> Result<(), TaskError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn register_and_dispatch_by_operation_name() {
        let registry = HandlerRegistry::new();
        registry.register("enrich.commit_description", Arc::new(EchoHandler));

        let handler = registry.get("enrich.commit_description").expect("registered");
        handler
            .execute(CancellationToken::new(), serde_json::json!({}))
            .await
            .unwrap();

        assert!(registry.get("unknown.operation").is_none());
    }
}
