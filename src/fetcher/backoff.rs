//! Adaptive backoff HTTP client
//!
//! Unlike per-call exponential backoff, the wait time here is one
//! continuous scalar carried across the whole run: every success shrinks
//! it toward the floor, every failure grows it toward the cap, so the
//! client adapts to sustained server throttling rather than reacting only
//! within a single call's retry loop.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{FetchError, FetchOutcome, FetchResult};

/// Immutable retry configuration.
///
/// Defaults: 1 s initial wait bounded to [1 s, 60 s], growth x1.5 on
/// failure, decay x0.9 on success, 5 attempts, 5 s request timeout. The
/// cap keeps a long outage from inflating the wait beyond a minute; the
/// floor keeps a healthy server from being hammered faster than once a
/// second.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Wait time a fresh [`BackoffState`] starts from.
    pub initial_wait: Duration,
    /// Lower bound the wait time decays toward on success.
    pub min_wait: Duration,
    /// Upper bound the wait time grows toward on failure.
    pub max_wait: Duration,
    /// Multiplier applied on failure, > 1.
    pub fail_factor: f64,
    /// Multiplier applied on success, < 1.
    pub success_factor: f64,
    /// Total attempts per call before giving up.
    pub max_retries: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_wait: Duration::from_secs(1),
            min_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(60),
            fail_factor: 1.5,
            success_factor: 0.9,
            max_retries: 5,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Mutable wait-time state, threaded through every fetch call.
///
/// Created once per run (or per independent job group) and never reset
/// mid-job: the learned server load carries across jobs even when per-job
/// counters reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffState {
    wait: Duration,
}

impl BackoffState {
    /// Start from the policy's initial wait.
    pub fn new(policy: &BackoffPolicy) -> Self {
        Self {
            wait: policy.initial_wait,
        }
    }

    /// Current wait time. Also used by the orchestrator as the pacing
    /// delay between units.
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Decay the wait time after a success, bounded below by `min_wait`.
    pub fn shrink(&mut self, policy: &BackoffPolicy) {
        self.wait = self.wait.mul_f64(policy.success_factor).max(policy.min_wait);
    }

    /// Grow the wait time after a failure, bounded above by `max_wait`.
    pub fn grow(&mut self, policy: &BackoffPolicy) {
        self.wait = self.wait.mul_f64(policy.fail_factor).min(policy.max_wait);
    }
}

/// HTTP GET with bounded retries and adaptive wait.
///
/// Per attempt:
/// - 200: shrink the wait, return the body. No further retries.
/// - 204: return [`FetchOutcome::NoContent`] immediately, wait untouched.
///   Glyph-range requests answer 204 for empty codepoint ranges; tile
///   endpoints do not emit it in practice, but the client treats it the
///   same for every resource kind and the caller records it as a skip.
/// - any other status, timeout, or transport error: sleep the current
///   wait, grow it, try again.
///
/// After `max_retries` attempts the call fails with
/// [`FetchError::Exhausted`] carrying the last error seen.
pub struct BackoffClient {
    http: Client,
    policy: BackoffPolicy,
}

impl BackoffClient {
    /// Build a client enforcing the policy's request timeout.
    pub fn new(policy: BackoffPolicy) -> FetchResult<Self> {
        let http = Client::builder()
            .timeout(policy.timeout)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;
        Ok(Self { http, policy })
    }

    /// The policy this client was built with.
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Fetch one URL, mutating `state` per the adaptive protocol.
    pub async fn fetch(&self, url: &str, state: &mut BackoffState) -> FetchResult<FetchOutcome> {
        let mut last_error = String::new();

        for attempt in 1..=self.policy.max_retries {
            match self.http.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::OK {
                        match response.bytes().await {
                            Ok(body) => {
                                state.shrink(&self.policy);
                                debug!(
                                    attempt,
                                    bytes = body.len(),
                                    wait_secs = state.wait().as_secs_f64(),
                                    "fetch succeeded"
                                );
                                return Ok(FetchOutcome::Fetched(body));
                            }
                            Err(e) => {
                                // Body read failures count as transport
                                // failures: retry under backoff.
                                warn!(
                                    attempt,
                                    max = self.policy.max_retries,
                                    error = %e,
                                    "failed to read response body"
                                );
                                last_error = format!("body read error: {e}");
                            }
                        }
                    } else if status == StatusCode::NO_CONTENT {
                        debug!(attempt, "no content (204), skipping");
                        return Ok(FetchOutcome::NoContent);
                    } else {
                        warn!(
                            attempt,
                            max = self.policy.max_retries,
                            status = status.as_u16(),
                            retry_in_secs = state.wait().as_secs_f64(),
                            "server returned error status"
                        );
                        last_error = format!("HTTP status {status}");
                    }
                }
                Err(e) if e.is_timeout() => {
                    warn!(
                        attempt,
                        max = self.policy.max_retries,
                        timeout_secs = self.policy.timeout.as_secs_f64(),
                        retry_in_secs = state.wait().as_secs_f64(),
                        "request timed out"
                    );
                    last_error = format!("timeout after {:?}", self.policy.timeout);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max = self.policy.max_retries,
                        error = %e,
                        retry_in_secs = state.wait().as_secs_f64(),
                        "transport error"
                    );
                    last_error = e.to_string();
                }
            }

            sleep(state.wait()).await;
            state.grow(&self.policy);
        }

        warn!(attempts = self.policy.max_retries, "max retries reached");
        Err(FetchError::Exhausted {
            attempts: self.policy.max_retries,
            last_error,
        })
    }
}
