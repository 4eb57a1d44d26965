// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Persistence Retry Logic
 * Uniform bounded retry with linear backoff for durable-store writes
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use crate::errors::{ScorerError, ScorerResult};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Retry configuration with linear backoff.
///
/// Backoff is deliberately linear and jitter-free: persistence writes are
/// serialized per publisher, so there is no thundering-herd concern, and
/// callers impose their own deadlines around the whole save sequence.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (initial try included)
    pub max_attempts: u32,

    /// Base delay; attempt N backs off for N * base_delay
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Linear backoff: attempt * base_delay
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Outcome of a retried operation, recording how many attempts were used
#[derive(Debug)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

/// Retry a persistence operation with linear backoff.
///
/// Up to `max_attempts` tries; non-retryable errors (validation,
/// configuration) abort immediately. After exhausting the budget the last
/// error is re-thrown annotated with the operation name and retry count.
pub async fn retry_persist<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> ScorerResult<Retried<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ScorerResult<T>>,
{
    let started = Instant::now();
    let mut attempt = 0;
    let mut last_error: Option<ScorerError> = None;

    while attempt < config.max_attempts {
        attempt += 1;

        debug!(
            attempt = attempt,
            max_attempts = config.max_attempts,
            operation = operation_name,
            "Executing persistence operation"
        );

        match operation().await {
            Ok(value) => {
                debug!(
                    attempt = attempt,
                    operation = operation_name,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Persistence operation succeeded"
                );
                return Ok(Retried {
                    value,
                    attempts: attempt,
                });
            }
            Err(err) => {
                let retryable = err.is_retryable();

                warn!(
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    operation = operation_name,
                    error = %err,
                    retryable = retryable,
                    "Persistence operation failed"
                );

                if !retryable {
                    debug!(operation = operation_name, "Error is not retryable, aborting");
                    return Err(err);
                }

                last_error = Some(err);

                if attempt < config.max_attempts {
                    let backoff = config.backoff_for(attempt);
                    debug!(
                        attempt = attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        operation = operation_name,
                        "Backing off before retry"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    warn!(
        operation = operation_name,
        attempts = attempt,
        duration_ms = started.elapsed().as_millis() as u64,
        "Persistence operation exhausted retry budget"
    );

    Err(ScorerError::Persistence {
        operation: operation_name.to_string(),
        retries: config.max_attempts,
        source: Box::new(
            last_error.unwrap_or_else(|| ScorerError::General("no attempts executed".to_string())),
        ),
    })
}
