use std::time::Duration;

/// Fixed-delay retry. No backoff, no cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self { Self::none() }
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self { max_attempts: 1, delay: Duration::ZERO }
    }

    pub const fn single_retry(delay: Duration) -> Self {
        Self { max_attempts: 2, delay }
    }

    /// Call `op(attempt)` until it succeeds, `retryable` rejects the error, or
    /// attempts run out. Returns the last error.
    pub fn run<T, E>(
        &self,
        mut op: impl FnMut(u32) -> Result<T, E>,
        retryable: impl Fn(&E) -> bool,
    ) -> Result<T, E> {
        let max = self.max_attempts.max(1);
        let mut attempt = 1u32;
        loop {
            match op(attempt) {
                Ok(v) => return Ok(v),
                Err(e) => {
                    if attempt >= max || !retryable(&e) { return Err(e); }
                    tracing::warn!(attempt, max, delay_ms = self.delay.as_millis() as u64, "retrying after failure");
                    if !self.delay.is_zero() { std::thread::sleep(self.delay); }
                    attempt += 1;
                }
            }
        }
    }
}
