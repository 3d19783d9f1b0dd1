use std::time::Duration;

/// Whether a failed attempt is worth repeating against the same model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Transient,
    Terminal,
}

/// 503 means the model is warming up; 402/429 and explicit rate-limit
/// messages mean we are being throttled. Everything else is terminal for
/// that model.
pub fn classify(status: u16, body: &str) -> FailureClass {
    match status {
        503 | 402 | 429 => FailureClass::Transient,
        _ if body.to_ascii_lowercase().contains("rate limit") => FailureClass::Transient,
        _ => FailureClass::Terminal,
    }
}

/// Per-model retry budget with a linear backoff schedule. The budget resets
/// for every model in the fallback chain.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Backoff after the given failed attempt (1-based): `retry_delay * n`.
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        self.retry_delay * failed_attempt
    }

    /// Non-blocking wait; other in-flight requests keep making progress.
    pub async fn wait(&self, failed_attempt: u32) {
        let delay = self.delay_for(failed_attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warming_up_and_rate_limits_are_transient() {
        assert_eq!(classify(503, ""), FailureClass::Transient);
        assert_eq!(classify(402, ""), FailureClass::Transient);
        assert_eq!(classify(429, ""), FailureClass::Transient);
        assert_eq!(
            classify(500, "Rate limit reached for this token"),
            FailureClass::Transient
        );
    }

    #[test]
    fn other_statuses_are_terminal() {
        assert_eq!(classify(400, "bad request"), FailureClass::Terminal);
        assert_eq!(classify(401, "unauthorized"), FailureClass::Terminal);
        assert_eq!(classify(500, "internal error"), FailureClass::Terminal);
    }

    #[test]
    fn backoff_scales_with_attempt_number() {
        let policy = RetryPolicy::new().with_retry_delay(Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(6));
    }

    #[test]
    fn budget_never_drops_below_one_attempt() {
        assert_eq!(RetryPolicy::new().with_max_retries(0).max_retries, 1);
    }
}
