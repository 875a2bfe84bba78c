use crate::core::state::Generation;
use crate::services::llm::{ErrorKind, LlmClient};
use log::{debug, error, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts per prompt, first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default)]
    pub jitter: bool,
    #[serde(default = "default_retry_on")]
    pub retry_on: Vec<ErrorKind>,
}

fn default_max_attempts() -> usize {
    3
}
fn default_initial_delay_ms() -> u64 {
    1000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_max_delay_ms() -> u64 {
    30_000
}
fn default_retry_on() -> Vec<ErrorKind> {
    vec![ErrorKind::Timeout]
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            jitter: false,
            retry_on: default_retry_on(),
        }
    }
}

impl RetryConfig {
    pub fn attempts(&self) -> usize {
        self.max_attempts.max(1)
    }

    pub fn is_retryable(&self, kind: ErrorKind) -> bool {
        self.retry_on.contains(&kind)
    }

    /// Delay before retry number `retry` (1-based), without jitter.
    pub fn delay_for(&self, retry: usize) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as usize) as i32;
        let scaled = self.initial_delay_ms as f64 * self.backoff_multiplier.max(1.0).powi(exponent);
        let capped = scaled.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }

    fn backoff(&self, retry: usize) -> Duration {
        let delay = self.delay_for(retry);
        if self.jitter && !delay.is_zero() {
            delay.mul_f64(rand::rng().random_range(0.5..=1.0))
        } else {
            delay
        }
    }
}

/// Wraps an [`LlmClient`] with the retry policy. Never returns an error:
/// every failure ends up as [`Generation::Failed`].
#[derive(Debug)]
pub struct Generator {
    llm: Box<dyn LlmClient>,
    retry: RetryConfig,
}

impl Generator {
    pub fn new(llm: Box<dyn LlmClient>, retry: RetryConfig) -> Self {
        Self { llm, retry }
    }

    pub async fn generate(&self, prompt: &str) -> Generation {
        let max_attempts = self.retry.attempts();

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let delay = self.retry.backoff(attempt - 1);
                debug!("Waiting {:?} before attempt {}/{}", delay, attempt, max_attempts);
                sleep(delay).await;
            }

            match self.llm.complete(prompt).await {
                Ok(text) => {
                    let generation = Generation::from_text(text);
                    if generation.is_failed() {
                        warn!("Model returned an empty completion");
                    }
                    return generation;
                }
                Err(e) => {
                    let kind = ErrorKind::classify(&e);
                    if !self.retry.is_retryable(kind) {
                        error!("Generation failed ({}), not retrying: {:#}", kind, e);
                        return Generation::Failed;
                    }
                    if attempt < max_attempts {
                        warn!(
                            "Generation {} (attempt {}/{}), retrying...",
                            kind, attempt, max_attempts
                        );
                    } else {
                        warn!("Generation {} on final attempt: {:#}", kind, e);
                    }
                }
            }
        }

        error!("Maximum retries ({}) exceeded, giving up on this prompt", max_attempts);
        Generation::Failed
    }
}
