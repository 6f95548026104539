// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Resilient JSON fetching.
//!
//! A request is retried on network failure, non-2xx status or an undecodable
//! body. Each call owns its retry loop; there is no shared circuit breaker
//! between callers. The delay before attempt `n + 1` is `base_delay * n`, so
//! waits grow strictly with every failed attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::time::sleep;

/// Errors that can occur while fetching a JSON document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Whether the failure came from the server answering with an error status.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::Decode(_) | Self::Io { .. } => None,
        }
    }
}

/// Retry configuration for a single logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay unit; the wait after failed attempt `n` is `base_delay * n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Policy that gives up after the first failure.
    #[must_use]
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Effective attempt budget. A zero budget still performs one attempt.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Wait applied after the given failed attempt (numbered from 1).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Run `attempt_fn` until it succeeds or the policy's attempt budget is spent.
///
/// The closure receives the attempt number, starting at 1. On exhaustion the
/// error from the last attempt is returned.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut attempt_fn: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match attempt_fn(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Succeeded on attempt {}/{}", attempt, attempts);
                }
                return Ok(value);
            }
            Err(e) if attempt < attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "Attempt {}/{} failed: {}; retrying in {} ms",
                    attempt,
                    attempts,
                    e,
                    delay.as_millis()
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!("Giving up after {} attempts: {}", attempts, e);
                return Err(e);
            }
        }
    }
}

/// Single GET expecting a JSON body.
pub async fn fetch_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
) -> Result<T, FetchError> {
    debug!("GET {}", url);
    let response = http.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            url: url.to_string(),
        });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// GET expecting a JSON body, retried according to `policy`.
pub async fn fetch_json_with_retry<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<T, FetchError> {
    retry(policy, |_attempt| fetch_json(http, url)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    fn unavailable() -> FetchError {
        FetchError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            url: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }

    #[test]
    fn test_delays_strictly_increase() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after(2), Duration::from_millis(1000));
        assert!(policy.delay_after(3) > policy.delay_after(2));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(policy.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::default();
        let started = Instant::now();

        let result: Result<&str, FetchError> = retry(&policy, |attempt| {
            calls.set(calls.get() + 1);
            async move {
                if attempt < 3 {
                    Err(unavailable())
                } else {
                    Ok("payload")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "payload");
        assert_eq!(calls.get(), 3);
        // 500 ms after the first failure, 1000 ms after the second
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_stops_at_budget() {
        let calls = Cell::new(0);
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(10),
        };

        let result: Result<(), FetchError> = retry(&policy, |_| {
            calls.set(calls.get() + 1);
            async { Err(unavailable()) }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(calls.get(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
        };

        let result: Result<(), String> =
            retry(&policy, |attempt| async move { Err(format!("failure {attempt}")) }).await;

        assert_eq!(result.unwrap_err(), "failure 2");
    }

    #[tokio::test]
    async fn test_first_success_skips_delay() {
        let calls = Cell::new(0);
        let result: Result<u32, String> = retry(&RetryPolicy::default(), |attempt| {
            calls.set(calls.get() + 1);
            async move { Ok(attempt) }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.get(), 1);
    }
}
