//! Client configuration.

use std::collections::HashMap;
use std::time::Duration;

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration options for the client.
///
/// # Example
///
/// ```rust
/// use hwcloud::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new()
///     .with_language("zh-cn")
///     .with_ssl_verification_disabled()
///     .with_endpoint("kms", "https://kms.example.internal")
///     .with_timeout(Duration::from_secs(10));
/// assert!(!config.ssl_verification);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Locale tag sent as `X-Language` (e.g. `zh-cn`, `en-us`).
    pub language: Option<String>,
    /// Verify the server's TLS certificate (default: true).
    pub ssl_verification: bool,
    /// Base URL per service name, replacing the regional default.
    pub endpoint_overrides: HashMap<String, String>,
    /// Per-call timeout (default: 30 seconds).
    pub timeout: Option<Duration>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            language: None,
            ssl_verification: true,
            endpoint_overrides: HashMap::new(),
            timeout: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Defaults: no language header, TLS verification on, public regional
    /// endpoints, 30 second timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `language` (e.g. `zh-cn`, `en-us`) as `X-Language`.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Accept any server certificate. Only meant for test environments.
    pub fn with_ssl_verification_disabled(mut self) -> Self {
        self.ssl_verification = false;
        self
    }

    /// Use `base_url` instead of the regional endpoint for `service`
    /// (`"kms"`, `"nat"`). A trailing `/` is ignored.
    pub fn with_endpoint(mut self, service: impl Into<String>, base_url: impl Into<String>) -> Self {
        self.endpoint_overrides
            .insert(service.into(), base_url.into());
        self
    }

    /// Bound every call, connection included, by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub(crate) fn effective_timeout(&self) -> Duration {
        self.timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub(crate) fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("hwcloud-sdk-rust/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Base URL for `service`: the override if configured, the regional
    /// public endpoint otherwise. Never ends with `/`.
    pub(crate) fn endpoint(&self, service: &str, region: &str) -> String {
        match self.endpoint_overrides.get(service) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{service}.{region}.myhuaweicloud.com"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.language.is_none());
        assert!(config.ssl_verification);
        assert!(config.endpoint_overrides.is_empty());
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
        assert!(config.effective_user_agent().starts_with("hwcloud-sdk-rust/"));
    }

    #[test]
    fn test_endpoint_resolution() {
        let config = ClientConfig::new().with_endpoint("kms", "http://127.0.0.1:8080/");
        assert_eq!(config.endpoint("kms", "cn-north-1"), "http://127.0.0.1:8080");
        assert_eq!(
            config.endpoint("nat", "cn-north-1"),
            "https://nat.cn-north-1.myhuaweicloud.com"
        );
    }
}
