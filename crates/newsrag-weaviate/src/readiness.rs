use std::sync::Arc;
use std::time::Duration;

use newsrag_core::NewsragError;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::backend::{BackendRequest, BackendResponse, WeaviateBackend};
use crate::config::WeaviateConfig;

/// How the delay between two polls grows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Backoff {
    #[default]
    Fixed,
    /// `interval * factor^(n-1)` after the n-th failed poll, capped at `max_delay`.
    Exponential { factor: u32, max_delay: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub interval: Duration,
    pub max_attempts: usize,
    /// Timeout applied to each individual health request.
    pub request_timeout: Duration,
    pub backoff: Backoff,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
            request_timeout: Duration::from_secs(5),
            backoff: Backoff::Fixed,
        }
    }
}

impl ReadinessPolicy {
    /// Enough fixed-interval attempts to cover `timeout`, at least one.
    ///
    /// A zero interval cannot cover any timeout and yields a single attempt;
    /// callers that read the interval from user input reject zero first.
    pub fn from_timeout(timeout: Duration, interval: Duration) -> Self {
        let max_attempts = if interval.is_zero() {
            1
        } else {
            let attempts = timeout.as_nanos().div_ceil(interval.as_nanos()).max(1);
            usize::try_from(attempts).unwrap_or(usize::MAX)
        };
        Self {
            interval,
            max_attempts,
            ..Self::default()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: usize) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential { factor, max_delay } => {
                let exponent = attempt.saturating_sub(1).min(u32::MAX as usize) as u32;
                self.interval
                    .saturating_mul(factor.saturating_pow(exponent))
                    .min(max_delay)
            }
        }
    }
}

/// Outcome of a successful wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyReport {
    pub attempts: usize,
    pub elapsed: Duration,
}

enum Probe {
    Ready,
    NotReady(String),
}

fn classify(result: Result<BackendResponse, NewsragError>) -> Probe {
    let response = match result {
        Ok(response) => response,
        Err(e) => return Probe::NotReady(e.to_string()),
    };
    if !response.is_success() {
        return Probe::NotReady(format!("HTTP {}", response.status));
    }
    // Weaviate itself answers 200 with an empty body; proxies in front of it
    // may answer {"status": "..."}.
    match response.body.get("status") {
        Some(Value::String(status)) if status == "ready" => Probe::Ready,
        Some(other) => Probe::NotReady(match other {
            Value::String(s) => s.clone(),
            v => v.to_string(),
        }),
        None => Probe::Ready,
    }
}

/// Polls the readiness endpoint until the server reports ready.
pub struct ReadinessWaiter {
    backend: Arc<dyn WeaviateBackend>,
    policy: ReadinessPolicy,
}

impl ReadinessWaiter {
    pub fn new(backend: Arc<dyn WeaviateBackend>, policy: ReadinessPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &ReadinessPolicy {
        &self.policy
    }

    /// Poll `GET /v1/.well-known/ready` on the configured server.
    ///
    /// Returns `ServiceUnavailable` once `max_attempts` polls have failed,
    /// carrying the status observed on the last one.
    pub async fn wait(&self, config: &WeaviateConfig) -> Result<ReadyReport, NewsragError> {
        let url = config.ready_url();
        let max_attempts = self.policy.max_attempts.max(1);
        let started = Instant::now();
        let mut last_status = String::from("no response");

        for attempt in 1..=max_attempts {
            let request = config.apply_auth(
                BackendRequest::get(&url).with_timeout(self.policy.request_timeout),
            );
            match classify(self.backend.send(request).await) {
                Probe::Ready => {
                    let elapsed = started.elapsed();
                    info!(attempt, elapsed_ms = elapsed.as_millis() as u64, "Weaviate is ready");
                    return Ok(ReadyReport {
                        attempts: attempt,
                        elapsed,
                    });
                }
                Probe::NotReady(status) => {
                    info!(attempt, max_attempts, status = %status, "waiting for Weaviate to start");
                    last_status = status;
                }
            }

            if attempt < max_attempts {
                let delay = self.policy.delay_after(attempt);
                debug!(delay_ms = delay.as_millis() as u64, "sleeping before next readiness poll");
                tokio::time::sleep(delay).await;
            }
        }

        warn!(attempts = max_attempts, last_status = %last_status, "Weaviate never became ready");
        Err(NewsragError::ServiceUnavailable {
            attempts: max_attempts,
            last_status,
        })
    }
}
