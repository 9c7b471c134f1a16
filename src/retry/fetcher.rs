//! Backoff fetcher: one HTTP call, retried on transient statuses.

use std::sync::Arc;
use tokio::time::sleep;

use super::policy::RetryPolicy;
use crate::error::DispatchError;
use crate::execution::http::{HttpTransport, HttpTransportRequest, HttpTransportResponse};

/// Sends a request and retries on 429/5xx with exponential delay.
///
/// When retries run out the last response is returned as-is, so callers must
/// still check its status. Transport failures are never retried here.
#[derive(Clone)]
pub struct BackoffFetcher {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl BackoffFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Makes at most `max_retries + 1` calls in total (4 with the default policy).
    pub async fn send(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, DispatchError> {
        let mut attempt: u32 = 0;
        loop {
            let response = self.transport.execute_json(request.clone()).await?;
            if !self.policy.is_retryable_status(response.status)
                || attempt >= self.policy.max_retries
            {
                if attempt > 0 {
                    tracing::debug!(
                        request_id = %request.request_id,
                        status = response.status,
                        retries = attempt,
                        "Returning response after retries"
                    );
                }
                return Ok(response);
            }

            let delay = self.policy.calculate_delay(attempt);
            tracing::warn!(
                request_id = %request.request_id,
                status = response.status,
                attempt = attempt + 1,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                "Transient upstream status, retrying"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}
