//! Shared, reconfigurable pooled client.

use parking_lot::RwLock;
use reqwest::cookie::Jar;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::{ClientConfig, PooledTransport, ReqError, Result, Transport};

/// A pooled HTTP client whose settings can change after construction.
///
/// `Client` is a handle: clones share the same state. Every setter drops the
/// cached [`reqwest::Client`], so the next [`Client::http`] call builds a new
/// one (with a new connection pool). Requests that already hold the previous
/// `reqwest::Client` keep using it.
#[derive(Clone)]
pub struct Client {
    inner: Arc<RwLock<ClientState>>,
}

struct ClientState {
    transport: Box<dyn Transport>,
    cookie_jar: Option<Arc<Jar>>,
    timeout: Duration,
    user_agent: String,
    http: Option<reqwest::Client>,
}

impl ClientState {
    fn build(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(&self.user_agent);

        // zero disables the overall deadline
        if !self.timeout.is_zero() {
            builder = builder.timeout(self.timeout);
        }

        if let Some(jar) = &self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder = self.transport.configure(builder);
        Ok(builder.build()?)
    }
}

impl Client {
    /// Create a client with a [`PooledTransport`] built from `config`.
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(PooledTransport::new(config), config)
    }

    /// Create a client on top of a custom transport.
    ///
    /// Timeout, cookie and user agent settings still come from `config`.
    pub fn with_transport(transport: impl Transport + 'static, config: &ClientConfig) -> Self {
        debug!(
            timeout = ?config.timeout,
            cookies = config.cookies,
            transport = ?transport,
            "Creating HTTP client"
        );

        Self {
            inner: Arc::new(RwLock::new(ClientState {
                transport: Box::new(transport),
                cookie_jar: config.cookies.then(|| Arc::new(Jar::default())),
                timeout: config.timeout,
                user_agent: config.user_agent.clone(),
                http: None,
            })),
        }
    }

    /// Get the underlying reqwest client, building it if needed.
    pub fn http(&self) -> Result<reqwest::Client> {
        if let Some(http) = self.inner.read().http.clone() {
            return Ok(http);
        }

        let mut state = self.inner.write();
        // another caller may have built it while we waited
        if let Some(http) = &state.http {
            return Ok(http.clone());
        }

        let http = state.build()?;
        state.http = Some(http.clone());
        Ok(http)
    }

    /// Check whether two handles refer to the same client.
    pub fn ptr_eq(&self, other: &Client) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Overall per-request deadline.
    pub fn timeout(&self) -> Duration {
        self.inner.read().timeout
    }

    /// Set the overall per-request deadline. `Duration::ZERO` means no deadline.
    pub fn set_timeout(&self, timeout: Duration) {
        let mut state = self.inner.write();
        state.timeout = timeout;
        state.http = None;
    }

    /// User agent sent with every request.
    pub fn user_agent(&self) -> String {
        self.inner.read().user_agent.clone()
    }

    /// The attached cookie jar, if any.
    pub fn cookie_jar(&self) -> Option<Arc<Jar>> {
        self.inner.read().cookie_jar.clone()
    }

    /// Attach a cookie jar, or detach it with `None`.
    pub fn set_cookie_jar(&self, jar: Option<Arc<Jar>>) {
        let mut state = self.inner.write();
        state.cookie_jar = jar;
        state.http = None;
    }

    /// Check whether the transport is a [`PooledTransport`].
    pub fn is_pooled(&self) -> bool {
        self.inner.read().transport.as_pooled().is_some()
    }

    /// Read the pooled transport.
    ///
    /// Returns `None` when the transport is not a [`PooledTransport`].
    pub fn pooled<R>(&self, f: impl FnOnce(&PooledTransport) -> R) -> Option<R> {
        self.inner.read().transport.as_pooled().map(f)
    }

    /// Modify the pooled transport.
    pub fn pooled_mut<R>(&self, f: impl FnOnce(&mut PooledTransport) -> R) -> Result<R> {
        let mut state = self.inner.write();
        let transport = state
            .transport
            .as_pooled_mut()
            .ok_or(ReqError::TransportUnavailable)?;
        let out = f(transport);
        state.http = None;
        Ok(out)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.read();
        f.debug_struct("Client")
            .field("transport", &state.transport)
            .field("cookies", &state.cookie_jar.is_some())
            .field("timeout", &state.timeout)
            .field("user_agent", &state.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore;

    #[derive(Debug)]
    struct BareTransport;

    impl Transport for BareTransport {
        fn configure(&self, builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
            builder
        }
    }

    #[test]
    fn test_client_defaults() {
        let client = Client::default();
        assert_eq!(client.timeout(), Duration::from_secs(120));
        assert!(client.cookie_jar().is_some());
        assert!(client.is_pooled());
        assert_eq!(client.pooled(|t| t.insecure_tls()), Some(false));
    }

    #[test]
    fn test_clones_share_state() {
        let client = Client::default();
        let other = client.clone();

        other.set_timeout(Duration::from_secs(7));
        assert!(client.ptr_eq(&other));
        assert_eq!(client.timeout(), Duration::from_secs(7));
        assert!(!client.ptr_eq(&Client::default()));
    }

    #[test]
    fn test_http_is_cached_until_mutation() {
        let client = Client::default();
        assert!(client.inner.read().http.is_none());
        client.http().unwrap();
        assert!(client.inner.read().http.is_some());

        client.set_timeout(Duration::from_secs(5));
        assert!(client.inner.read().http.is_none());
        client.http().unwrap();
        assert!(client.inner.read().http.is_some());
    }

    #[test]
    fn test_cookie_jar_detach() {
        let client = Client::default();
        let url = url::Url::parse("https://example.com/").unwrap();
        let jar = client.cookie_jar().unwrap();
        jar.add_cookie_str("session=abc", &url);
        assert!(jar.cookies(&url).is_some());

        client.set_cookie_jar(None);
        assert!(client.cookie_jar().is_none());
    }

    #[test]
    fn test_custom_transport_is_not_pooled() {
        let client = Client::with_transport(BareTransport, &ClientConfig::default());
        assert!(!client.is_pooled());
        assert!(client.pooled(|t| t.insecure_tls()).is_none());

        let err = client.pooled_mut(|t| t.set_insecure_tls(true)).unwrap_err();
        assert!(err.is_transport_unavailable());
        assert!(client.http().is_ok());
    }

    #[test]
    fn test_pooled_mut_invalidates_http() {
        let client = Client::default();
        client.http().unwrap();

        client.pooled_mut(|t| t.set_insecure_tls(true)).unwrap();
        assert!(client.inner.read().http.is_none());
        assert_eq!(client.pooled(|t| t.insecure_tls()), Some(true));
    }
}
