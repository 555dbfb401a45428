//! `MockEnricher` for handler unit tests: no network, deterministic output,
//! optional configurable failure fraction for failure-budget property tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::enricher::{EnrichOptions, Enricher};
use crate::error::EnrichmentError;
use crate::types::{EnrichmentRequest, EnrichmentResponse};

pub struct MockEnricher {
    /// Fraction of requests (by position, deterministic) that fail.
    fail_fraction: f64,
}

impl Default for MockEnricher {
    fn default() -> Self {
        Self { fail_fraction: 0.0 }
    }
}

impl MockEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fail_fraction(fail_fraction: f64) -> Self {
        Self {
            fail_fraction: fail_fraction.clamp(0.0, 1.0),
        }
    }
}

#[async_trait]
impl Enricher for MockEnricher {
    async fn enrich(
        &self,
        requests: Vec<EnrichmentRequest>,
        opts: EnrichOptions,
    ) -> Result<Vec<EnrichmentResponse>, EnrichmentError> {
        let total = requests.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
        let fail_every = if self.fail_fraction <= 0.0 {
            0
        } else {
            (1.0 / self.fail_fraction).round().max(1.0) as usize
        };

        let completed = AtomicUsize::new(0);
        let mut responses = Vec::with_capacity(total);
        let mut failures = 0usize;

        for (idx, request) in requests.into_iter().enumerate() {
            if opts.cancellation.is_cancelled() {
                break;
            }

            let settled = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(progress) = &opts.progress {
                progress(settled, total);
            }

            let should_fail = fail_every != 0 && (idx + 1) % fail_every == 0;
            if should_fail {
                let err = EnrichmentError::Request(format!("mock failure for {}", request.id));
                if let Some(on_error) = &opts.request_error {
                    on_error(&request.id, &err);
                }
                failures += 1;
                continue;
            }

            responses.push(EnrichmentResponse {
                id: request.id,
                text: format!("summary of: {}", request.text),
            });
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
    async fn echoes_summary_of_text_when_no_failures_configured() {
        let enricher = MockEnricher::new();
        let responses = enricher
            .enrich(requests(3), EnrichOptions::default())
            .await
            .unwrap();

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0].text, "summary of: doc 0");
    }

    #[tokio::test]
    async fn exceeding_failure_budget_returns_error() {
        let enricher = MockEnricher::with_fail_fraction(0.5);
        let opts = EnrichOptions::default().with_max_failure_rate(0.05);

        let result = enricher.enrich(requests(10), opts).await;
        assert!(matches!(
            result,
            Err(EnrichmentError::FailureRateExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn failure_rate_within_budget_succeeds_with_partial_responses() {
        let enricher = MockEnricher::with_fail_fraction(0.1);
        let opts = EnrichOptions::default().with_max_failure_rate(0.2);

        let responses = enricher.enrich(requests(10), opts).await.unwrap();
        assert!(responses.len() < 10);
    }
}
