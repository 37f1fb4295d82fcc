//! Defaults for lazily constructed clients.

use std::env;
use std::time::Duration;

use crate::{ReqError, Result};

/// Prefix for environment overrides read by [`ClientConfig::from_env`].
pub const ENV_PREFIX: &str = "ARMATURE_REQ_";

/// Settings used when a [`Req`](crate::Req) builds its client on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Overall per-request deadline, zero for none.
    pub timeout: Duration,
    /// TCP dial timeout.
    pub connect_timeout: Duration,
    /// TLS handshake timeout.
    pub tls_handshake_timeout: Duration,
    /// TCP keep-alive interval, `None` disables keep-alive probes.
    pub tcp_keepalive: Option<Duration>,
    /// How long an idle pooled connection is kept.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// Attach a cookie jar to new clients.
    pub cookies: bool,
    /// Skip certificate verification.
    pub insecure_tls: bool,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(30),
            tls_handshake_timeout: Duration::from_secs(10),
            tcp_keepalive: Some(Duration::from_secs(30)),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 100,
            cookies: true,
            insecure_tls: false,
            user_agent: format!("armature-req/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load the defaults, overridden by any `ARMATURE_REQ_*` variables.
    ///
    /// Durations are whole seconds (`TIMEOUT_SECS=0` disables the overall
    /// deadline), booleans accept `1/0/true/false`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let tcp_keepalive = match env_secs("KEEPALIVE_SECS")? {
            Some(d) if d.is_zero() => None,
            Some(d) => Some(d),
            None => defaults.tcp_keepalive,
        };

        Ok(Self {
            timeout: env_secs("TIMEOUT_SECS")?.unwrap_or(defaults.timeout),
            connect_timeout: env_secs("CONNECT_TIMEOUT_SECS")?.unwrap_or(defaults.connect_timeout),
            tls_handshake_timeout: env_secs("TLS_HANDSHAKE_TIMEOUT_SECS")?
                .unwrap_or(defaults.tls_handshake_timeout),
            tcp_keepalive,
            pool_idle_timeout: env_secs("POOL_IDLE_TIMEOUT_SECS")?
                .unwrap_or(defaults.pool_idle_timeout),
            pool_max_idle_per_host: env_parsed("POOL_MAX_IDLE_PER_HOST")?
                .unwrap_or(defaults.pool_max_idle_per_host),
            cookies: env_bool("COOKIES")?.unwrap_or(defaults.cookies),
            insecure_tls: env_bool("INSECURE_TLS")?.unwrap_or(defaults.insecure_tls),
            user_agent: env_var("USER_AGENT")
                .map(|(_, value)| value)
                .unwrap_or(defaults.user_agent),
        })
    }
}

fn env_var(key: &str) -> Option<(String, String)> {
    let name = format!("{}{}", ENV_PREFIX, key);
    env::var(&name).ok().map(|value| (name, value))
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env_var(key) {
        Some((name, value)) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ReqError::InvalidConfig { key: name, value }),
        None => Ok(None),
    }
}

fn env_secs(key: &str) -> Result<Option<Duration>> {
    Ok(env_parsed::<u64>(key)?.map(Duration::from_secs))
}

fn env_bool(key: &str) -> Result<Option<bool>> {
    match env_var(key) {
        Some((name, value)) => match value.trim().to_lowercase().as_str() {
            "1" | "true" => Ok(Some(true)),
            "0" | "false" => Ok(Some(false)),
            _ => Err(ReqError::InvalidConfig { key: name, value }),
        },
        None => Ok(None),
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the TCP dial timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the TLS handshake timeout.
    pub fn tls_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.tls_handshake_timeout = timeout;
        self
    }

    /// Set the TCP keep-alive interval.
    pub fn tcp_keepalive(mut self, interval: Option<Duration>) -> Self {
        self.config.tcp_keepalive = interval;
        self
    }

    /// Set the connection pool idle timeout.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set the maximum idle connections per host.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable the cookie jar on new clients.
    pub fn cookies(mut self, enable: bool) -> Self {
        self.config.cookies = enable;
        self
    }

    /// Skip certificate verification on new clients.
    pub fn insecure_tls(mut self, enable: bool) -> Self {
        self.config.insecure_tls = enable;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_finite() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(90));
        assert_eq!(config.tls_handshake_timeout, Duration::from_secs(10));
        assert!(!config.connect_timeout.is_zero());
        assert!(config.cookies);
        assert!(!config.insecure_tls);
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(4)
            .tcp_keepalive(None)
            .cookies(false)
            .user_agent("test-agent")
            .build();

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.pool_max_idle_per_host, 4);
        assert_eq!(config.tcp_keepalive, None);
        assert!(!config.cookies);
        assert_eq!(config.user_agent, "test-agent");
    }
}
