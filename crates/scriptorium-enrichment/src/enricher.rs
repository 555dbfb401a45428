//! `Enricher`: batched LLM request fan-out with partial-failure semantics.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::error::EnrichmentError;
use crate::provider::LlmProvider;
use crate::types::{EnrichmentRequest, EnrichmentResponse, LlmRequest};

/// Callbacks and knobs for one `enrich` call. A rate of `0.0` makes any
/// single request failure fatal; the default (0.05) tolerates a small
/// fraction of failures before the whole batch is considered failed.
pub struct EnrichOptions {
    pub max_failure_rate: f64,
    pub progress: Option<Box<dyn Fn(usize, usize) + Send + Sync>>,
    pub request_error: Option<Box<dyn Fn(&str, &EnrichmentError) + Send + Sync>>,
    pub cancellation: CancellationToken,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            max_failure_rate: 0.05,
            progress: None,
            request_error: None,
            cancellation: CancellationToken::new(),
        }
    }
}

impl EnrichOptions {
    pub fn with_max_failure_rate(mut self, rate: f64) -> Self {
        self.max_failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(
        &self,
        requests: Vec<EnrichmentRequest>,
        opts: EnrichOptions,
    ) -> Result<Vec<EnrichmentResponse>, EnrichmentError>;
}

/// Fans requests out over a `Semaphore`-bounded pool of concurrent calls to
/// `P::complete`, reassembles responses in request order regardless of
/// completion order, and fails the whole call only once every request has
/// settled (or cancellation cut the batch short) and the observed failure
/// rate exceeds `opts.max_failure_rate`.
pub struct DefaultEnricher<P: LlmProvider> {
    provider: Arc<P>,
    concurrency: usize,
}

impl<P: LlmProvider> DefaultEnricher<P> {
    pub fn new(provider: Arc<P>, concurrency: usize) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
        }
    }
}

#[async_trait]
impl<P: LlmProvider + 'static> Enricher for DefaultEnricher<P> {
    async fn enrich(
        &self,
        requests: Vec<EnrichmentRequest>,
        opts: EnrichOptions,
    ) -> Result<Vec<EnrichmentResponse>, EnrichmentError> {
        let total = requests.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let completed = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut handles = Vec::with_capacity(total);

        for request in requests {
            if opts.cancellation.is_cancelled() {
                break;
            }
            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&semaphore);
            let cancellation = opts.cancellation.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await;
                if cancellation.is_cancelled() {
                    return (request.id, Err(EnrichmentError::Request(
                        "cancelled before start".to_string(),
                    )));
                }
                let result = provider
                    .complete(LlmRequest {
                        text: request.text,
                        system_prompt: request.system_prompt,
                    })
                    .await;
                (request.id, result)
            }));
        }

        let mut responses = Vec::with_capacity(handles.len());
        let mut failures = 0usize;

        for handle in handles {
            let (id, result) = handle
                .await
                .map_err(|e| EnrichmentError::Other(format!("task join error: {e}")))?;

            let settled = completed.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            if let Some(progress) = &opts.progress {
                progress(settled, total);
            }

            match result {
                Ok(text) => responses.push(EnrichmentResponse { id, text }),
                Err(err) => {
                    if let Some(on_error) = &opts.request_error {
                        on_error(&id, &err);
                    }
                    failures += 1;
                }
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let failure_rate = failures as f64 / total as f64;
        if failure_rate > opts.max_failure_rate {
            return Err(EnrichmentError::FailureRateExceeded {
                rate: failure_rate,
                threshold: opts.max_failure_rate,
            });
        }

        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoProvider;

    #[async_trait]
    impl LlmProvider for EchoProvider {
        async fn complete(&self, request: LlmRequest) -> Result<String, EnrichmentError> {
            Ok(format!("{}: {}", request.system_prompt, request.text))
        }
    }

    struct AlwaysFailsProvider;

    #[async_trait]
    impl LlmProvider for AlwaysFailsProvider {
        async fn complete(&self, _request: LlmRequest) -> Result<String, EnrichmentError> {
            Err(EnrichmentError::Request("provider unreachable".to_string()))
        }
    }

    fn requests(n: usize) -> Vec<EnrichmentRequest> {
        (0..n)
            .map(|i| EnrichmentRequest {
                id: i.to_string(),
                text: format!("doc {i}"),
                system_prompt: "summarize".to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn responses_preserve_request_order_and_ids() {
        let enricher = DefaultEnricher::new(Arc::new(EchoProvider), 4);
        let responses = enricher
            .enrich(requests(5), EnrichOptions::default())
            .await
            .unwrap();

        let ids: Vec<&str> = responses.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn progress_callback_fires_once_per_request() {
        let enricher = DefaultEnricher::new(Arc::new(EchoProvider), 2);
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);

        let opts = EnrichOptions {
            progress: Some(Box::new(move |_completed, _total| {
                seen_clone.fetch_add(1, Ordering::SeqCst);
            })),
            ..EnrichOptions::default()
        };

        enricher.enrich(requests(6), opts).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn zero_failure_rate_makes_any_failure_fatal() {
        let enricher = DefaultEnricher::new(Arc::new(AlwaysFailsProvider), 4);
        let opts = EnrichOptions::default().with_max_failure_rate(0.0);

        let result = enricher.enrich(requests(1), opts).await;
        assert!(matches!(
            result,
            Err(EnrichmentError::FailureRateExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn request_error_callback_fires_for_each_failure() {
        let enricher = DefaultEnricher::new(Arc::new(AlwaysFailsProvider), 4);
        let errors = Arc::new(std::sync::Mutex::new(Vec::new()));
        let errors_clone = Arc::clone(&errors);

        let opts = EnrichOptions {
            max_failure_rate: 1.0,
            request_error: Some(Box::new(move |id, _err| {
                errors_clone.lock().unwrap().push(id.to_string());
            })),
            ..EnrichOptions::default()
        };

        enricher.enrich(requests(3), opts).await.unwrap();
        assert_eq!(errors.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_request_list_returns_empty_without_calling_provider() {
        let enricher = DefaultEnricher::new(Arc::new(AlwaysFailsProvider), 4);
        let responses = enricher.enrich(Vec::new(), EnrichOptions::default()).await.unwrap();
        assert!(responses.is_empty());
    }
}
