//! Configuration holder: the lazily created client plus auxiliary settings.

use parking_lot::{Mutex, RwLock};
use reqwest::cookie::Jar;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::flags::STD_FLAGS;
use crate::{
    Client, ClientConfig, JsonCodec, ProxyError, ProxyPolicy, ReqError, Result, StdJson,
    XmlIndent,
};

/// Default interval between upload/download progress callbacks.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

/// Owns one pooled [`Client`] and the settings request execution reads.
///
/// The client is built on first use from the holder's [`ClientConfig`].
/// Every setter is memory-safe to call from any thread, but a setter racing
/// requests in flight may or may not be seen by them: finish configuration
/// before steady-state traffic, or synchronize externally.
pub struct Req {
    config: ClientConfig,
    client: Mutex<Option<Client>>,
    settings: RwLock<Settings>,
}

struct Settings {
    flags: u32,
    progress_interval: Duration,
    xml_indent: Option<XmlIndent>,
    json_encoder: Arc<dyn JsonCodec>,
    json_decoder: Arc<dyn JsonCodec>,
}

impl Req {
    /// Create a holder using [`ClientConfig::default`].
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a holder whose client will be built from `config`.
    pub fn with_config(config: ClientConfig) -> Self {
        let json: Arc<dyn JsonCodec> = Arc::new(StdJson);
        Self {
            config,
            client: Mutex::new(None),
            settings: RwLock::new(Settings {
                flags: STD_FLAGS,
                progress_interval: DEFAULT_PROGRESS_INTERVAL,
                xml_indent: None,
                json_encoder: Arc::clone(&json),
                json_decoder: json,
            }),
        }
    }

    /// Defaults used for lazy client construction.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the active client, building it on first use.
    pub fn client(&self) -> Client {
        let mut slot = self.client.lock();
        slot.get_or_insert_with(|| {
            debug!("Initializing default HTTP client");
            Client::new(&self.config)
        })
        .clone()
    }

    /// Replace the active client. `None` restores lazy construction.
    pub fn set_client(&self, client: Option<Client>) {
        debug!(custom = client.is_some(), "Replacing HTTP client");
        *self.client.lock() = client;
    }

    /// Output flags, see [`crate::flags`].
    pub fn flags(&self) -> u32 {
        self.settings.read().flags
    }

    /// Set the output flags.
    pub fn set_flags(&self, flags: u32) {
        self.settings.write().flags = flags;
    }

    /// Skip (or restore) certificate verification on the active client.
    ///
    /// Returns [`ReqError::TransportUnavailable`] and changes nothing when
    /// the client was replaced by one without a pooled transport.
    pub fn enable_insecure_tls(&self, enable: bool) -> Result<()> {
        self.client()
            .pooled_mut(|transport| transport.set_insecure_tls(enable))
            .inspect(|_| debug!(enable, "Updated TLS verification"))
            .inspect_err(|_| warn!(enable, "Transport does not support TLS settings"))
    }

    /// Enable or disable cookie persistence.
    ///
    /// Enabling always starts from an empty jar; cookies collected before a
    /// disable are not restored.
    pub fn enable_cookie(&self, enable: bool) {
        let jar = enable.then(|| Arc::new(Jar::default()));
        self.client().set_cookie_jar(jar);
        debug!(enable, "Updated cookie jar");
    }

    /// Set the overall deadline for requests issued from now on.
    ///
    /// `Duration::ZERO` removes the deadline; dial and TLS handshake
    /// timeouts still apply.
    pub fn set_timeout(&self, timeout: Duration) {
        self.client().set_timeout(timeout);
        debug!(?timeout, "Updated request timeout");
    }

    /// Route every request through the proxy at `raw`.
    ///
    /// On a parse error the current proxy configuration is kept.
    pub fn set_proxy_url(&self, raw: &str) -> Result<()> {
        let client = self.client();
        if !client.is_pooled() {
            warn!("Transport does not support proxy settings");
            return Err(ReqError::TransportUnavailable);
        }

        let proxy = Url::parse(raw).map_err(|source| ReqError::InvalidProxyUrl {
            url: raw.to_string(),
            source,
        })?;

        debug!(proxy = %proxy, "Using fixed proxy");
        client.pooled_mut(|transport| transport.set_proxy(ProxyPolicy::Fixed(proxy)))
    }

    /// Resolve the proxy for every request with `resolver`.
    ///
    /// Replaces any earlier proxy configuration, including
    /// [`set_proxy_url`](Self::set_proxy_url).
    pub fn set_proxy<F>(&self, resolver: F) -> Result<()>
    where
        F: Fn(&Url) -> std::result::Result<Option<Url>, ProxyError> + Send + Sync + 'static,
    {
        self.client()
            .pooled_mut(|transport| transport.set_proxy(ProxyPolicy::Custom(Arc::new(resolver))))
            .inspect(|_| debug!("Using custom proxy resolver"))
            .inspect_err(|_| warn!("Transport does not support proxy settings"))
    }

    /// Set the XML indentation used by encoders.
    pub fn set_xml_indent(&self, prefix: impl Into<String>, indent: impl Into<String>) {
        let mut settings = self.settings.write();
        let opts = settings.xml_indent.get_or_insert_with(XmlIndent::default);
        opts.prefix = prefix.into();
        opts.indent = indent.into();
    }

    /// XML indentation, `None` until first configured.
    pub fn xml_indent(&self) -> Option<XmlIndent> {
        self.settings.read().xml_indent.clone()
    }

    /// Interval between upload/download progress callbacks.
    pub fn progress_interval(&self) -> Duration {
        self.settings.read().progress_interval
    }

    /// Set the progress callback interval.
    pub fn set_progress_interval(&self, interval: Duration) {
        self.settings.write().progress_interval = interval;
    }

    /// JSON provider used for request bodies.
    pub fn json_encoder(&self) -> Arc<dyn JsonCodec> {
        Arc::clone(&self.settings.read().json_encoder)
    }

    /// Replace the JSON encoder.
    pub fn set_json_encoder(&self, encoder: Arc<dyn JsonCodec>) {
        debug!(encoder = encoder.name(), "Updated JSON encoder");
        self.settings.write().json_encoder = encoder;
    }

    /// JSON provider used for response bodies.
    pub fn json_decoder(&self) -> Arc<dyn JsonCodec> {
        Arc::clone(&self.settings.read().json_decoder)
    }

    /// Replace the JSON decoder.
    pub fn set_json_decoder(&self, decoder: Arc<dyn JsonCodec>) {
        debug!(decoder = decoder.name(), "Updated JSON decoder");
        self.settings.write().json_decoder = decoder;
    }

    /// Serialize `value` with the configured encoder.
    pub fn encode_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let value = serde_json::to_value(value)?;
        Ok(self.json_encoder().encode(&value)?)
    }

    /// Deserialize `bytes` with the configured decoder.
    pub fn decode_json<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        let value = self.json_decoder().decode(bytes)?;
        Ok(serde_json::from_value(value)?)
    }
}

impl Default for Req {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Req {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.settings.read();
        f.debug_struct("Req")
            .field("config", &self.config)
            .field("client", &*self.client.lock())
            .field("flags", &settings.flags)
            .field("progress_interval", &settings.progress_interval)
            .field("xml_indent", &settings.xml_indent)
            .finish_non_exhaustive()
    }
}
