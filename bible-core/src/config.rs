use crate::retry::RetryPolicy;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://bible-api.dws-cloud.workers.dev/v1";

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            user_agent: format!("bible-mcp/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(12),
            retry: RetryPolicy::none(),
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by `BIBLE_API_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut c = Self::default();
        if let Some(b) = get("BIBLE_API_BASE") { if !b.trim().is_empty() { c = c.with_base_url(&b); } }
        if let Some(ua) = get("BIBLE_API_USER_AGENT") { if !ua.is_empty() { c.user_agent = ua; } }
        if let Some(s) = get("BIBLE_API_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) { c.timeout = Duration::from_secs(s); }
        if let Some(s) = get("BIBLE_API_CONNECT_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) { c.connect_timeout = Duration::from_secs(s); }
        c
    }

    pub fn with_base_url(mut self, base: &str) -> Self {
        self.base_url = base.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("BIBLE_API_BASE", "http://localhost:8787/v1/"),
            ("BIBLE_API_TIMEOUT_SECS", "3"),
            ("BIBLE_API_CONNECT_TIMEOUT_SECS", "not-a-number"),
        ].into_iter().collect();
        let c = ApiConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(c.base_url, "http://localhost:8787/v1");
        assert_eq!(c.timeout, Duration::from_secs(3));
        assert_eq!(c.connect_timeout, Duration::from_secs(5));
        assert_eq!(c.retry, RetryPolicy::none());
    }

    #[test]
    fn empty_env_keeps_defaults() {
        let c = ApiConfig::from_lookup(|_| None);
        assert_eq!(c.base_url, DEFAULT_API_BASE);
        assert!(c.user_agent.starts_with("bible-mcp/"));
    }
}
