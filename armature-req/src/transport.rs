//! Transport layer: connection pooling, TLS policy and proxy resolution.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::ClientConfig;

/// Error produced by a proxy resolver.
pub type ProxyError = Box<dyn std::error::Error + Send + Sync>;

/// Per-request proxy resolver. `Ok(None)` means connect directly.
pub type ProxyResolver =
    Arc<dyn Fn(&Url) -> std::result::Result<Option<Url>, ProxyError> + Send + Sync>;

/// Proxy handed to the connector when a resolver fails.
///
/// The `socks` feature of reqwest is off, so the connector rejects this
/// scheme and the request errors instead of connecting directly.
const REJECT_PROXY: &str = "socks5://127.0.0.1:0";

/// How a transport picks the proxy for a request target.
#[derive(Clone)]
pub enum ProxyPolicy {
    /// Defer to `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` discovery in the connector.
    Environment,
    /// Route every request through one proxy.
    Fixed(Url),
    /// Ask a resolver for every request.
    Custom(ProxyResolver),
}

impl ProxyPolicy {
    /// Resolve the proxy for `target`.
    ///
    /// [`ProxyPolicy::Environment`] always yields `Ok(None)` here since the
    /// lookup happens inside the connector.
    pub fn resolve(&self, target: &Url) -> std::result::Result<Option<Url>, ProxyError> {
        match self {
            Self::Environment => Ok(None),
            Self::Fixed(proxy) => Ok(Some(proxy.clone())),
            Self::Custom(resolver) => resolver(target),
        }
    }

    fn apply(&self, builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
        match self {
            Self::Environment => builder,
            Self::Fixed(proxy) => {
                let proxy = proxy.clone();
                builder.proxy(reqwest::Proxy::custom(move |_| Some(proxy.clone())))
            }
            Self::Custom(resolver) => {
                let resolver = Arc::clone(resolver);
                builder.proxy(reqwest::Proxy::custom(move |target| {
                    match resolver(target) {
                        Ok(proxy) => proxy,
                        Err(error) => {
                            warn!(
                                target_url = %target,
                                error = %error,
                                "Proxy resolver failed, rejecting request"
                            );
                            Url::parse(REJECT_PROXY).ok()
                        }
                    }
                }))
            }
        }
    }
}

impl fmt::Debug for ProxyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => f.write_str("Environment"),
            Self::Fixed(proxy) => f.debug_tuple("Fixed").field(&proxy.as_str()).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Connection layer of a [`Client`](crate::Client).
///
/// Only [`PooledTransport`] exposes mutable TLS and proxy settings. Other
/// implementations keep the defaults of `configure` and are reported as
/// [`ReqError::TransportUnavailable`](crate::ReqError::TransportUnavailable)
/// by the setters that need those settings.
pub trait Transport: fmt::Debug + Send + Sync {
    /// Apply this transport's settings to a reqwest builder.
    fn configure(&self, builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder;

    /// Borrow as the pooled transport, if it is one.
    fn as_pooled(&self) -> Option<&PooledTransport> {
        None
    }

    /// Mutably borrow as the pooled transport, if it is one.
    fn as_pooled_mut(&mut self) -> Option<&mut PooledTransport> {
        None
    }
}

/// The default pooled transport.
#[derive(Debug, Clone)]
pub struct PooledTransport {
    connect_timeout: Duration,
    tls_handshake_timeout: Duration,
    tcp_keepalive: Option<Duration>,
    pool_idle_timeout: Duration,
    pool_max_idle_per_host: usize,
    insecure_tls: bool,
    proxy: ProxyPolicy,
}

impl PooledTransport {
    /// Create a transport from client defaults.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout,
            tls_handshake_timeout: config.tls_handshake_timeout,
            tcp_keepalive: config.tcp_keepalive,
            pool_idle_timeout: config.pool_idle_timeout,
            pool_max_idle_per_host: config.pool_max_idle_per_host,
            insecure_tls: config.insecure_tls,
            proxy: ProxyPolicy::Environment,
        }
    }

    /// TCP dial timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// TLS handshake timeout.
    pub fn tls_handshake_timeout(&self) -> Duration {
        self.tls_handshake_timeout
    }

    /// TCP keep-alive interval.
    pub fn tcp_keepalive(&self) -> Option<Duration> {
        self.tcp_keepalive
    }

    /// Idle connection timeout.
    pub fn pool_idle_timeout(&self) -> Duration {
        self.pool_idle_timeout
    }

    /// Maximum idle connections per host.
    pub fn pool_max_idle_per_host(&self) -> usize {
        self.pool_max_idle_per_host
    }

    /// Whether certificate verification is skipped.
    pub fn insecure_tls(&self) -> bool {
        self.insecure_tls
    }

    /// Skip (or restore) certificate verification.
    pub fn set_insecure_tls(&mut self, enable: bool) {
        self.insecure_tls = enable;
    }

    /// Current proxy policy.
    pub fn proxy(&self) -> &ProxyPolicy {
        &self.proxy
    }

    /// Replace the proxy policy.
    pub fn set_proxy(&mut self, proxy: ProxyPolicy) {
        self.proxy = proxy;
    }

    /// Resolve the proxy used for `target`.
    pub fn resolve_proxy(&self, target: &Url) -> std::result::Result<Option<Url>, ProxyError> {
        self.proxy.resolve(target)
    }
}

impl Default for PooledTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Transport for PooledTransport {
    fn configure(&self, builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
        // reqwest bounds the TLS handshake as part of the connect phase
        let builder = builder
            .connect_timeout(self.connect_timeout + self.tls_handshake_timeout)
            .tcp_keepalive(self.tcp_keepalive)
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .danger_accept_invalid_certs(self.insecure_tls);

        self.proxy.apply(builder)
    }

    fn as_pooled(&self) -> Option<&PooledTransport> {
        Some(self)
    }

    fn as_pooled_mut(&mut self) -> Option<&mut PooledTransport> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Url {
        Url::parse("https://api.example.com/users").unwrap()
    }

    #[test]
    fn test_transport_from_config() {
        let config = ClientConfig::builder()
            .connect_timeout(Duration::from_secs(3))
            .pool_max_idle_per_host(8)
            .insecure_tls(true)
            .build();

        let transport = PooledTransport::new(&config);
        assert_eq!(transport.connect_timeout(), Duration::from_secs(3));
        assert_eq!(transport.pool_max_idle_per_host(), 8);
        assert!(transport.insecure_tls());
        assert!(matches!(transport.proxy(), ProxyPolicy::Environment));
    }

    #[test]
    fn test_environment_policy_resolves_in_connector() {
        let transport = PooledTransport::default();
        assert!(transport.resolve_proxy(&target()).unwrap().is_none());
    }

    #[test]
    fn test_fixed_policy() {
        let proxy = Url::parse("http://proxy.local:8080").unwrap();
        let mut transport = PooledTransport::default();
        transport.set_proxy(ProxyPolicy::Fixed(proxy.clone()));

        assert_eq!(transport.resolve_proxy(&target()).unwrap(), Some(proxy));
    }

    #[test]
    fn test_custom_policy_sees_target() {
        let mut transport = PooledTransport::default();
        transport.set_proxy(ProxyPolicy::Custom(Arc::new(
            |target: &Url| -> std::result::Result<Option<Url>, ProxyError> {
                if target.host_str() == Some("internal.local") {
                    Ok(None)
                } else {
                    Ok(Some(Url::parse("http://egress:3128")?))
                }
            },
        )));

        let internal = Url::parse("http://internal.local/").unwrap();
        assert!(transport.resolve_proxy(&internal).unwrap().is_none());
        assert_eq!(
            transport.resolve_proxy(&target()).unwrap().unwrap().as_str(),
            "http://egress:3128/"
        );
    }

    #[test]
    fn test_custom_policy_error() {
        let mut transport = PooledTransport::default();
        transport.set_proxy(ProxyPolicy::Custom(Arc::new(
            |_: &Url| -> std::result::Result<Option<Url>, ProxyError> { Err("no route".into()) },
        )));

        let err = transport.resolve_proxy(&target()).unwrap_err();
        assert_eq!(err.to_string(), "no route");
    }

    #[test]
    fn test_reject_proxy_is_socks() {
        let proxy = Url::parse(REJECT_PROXY).unwrap();
        assert_eq!(proxy.scheme(), "socks5");
    }

    #[test]
    fn test_debug_hides_resolver() {
        let policy = ProxyPolicy::Custom(Arc::new(
            |_: &Url| -> std::result::Result<Option<Url>, ProxyError> { Ok(None) },
        ));
        assert_eq!(format!("{:?}", policy), "Custom(..)");
    }
}
