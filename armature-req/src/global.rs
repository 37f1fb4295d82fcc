//! Process-wide default holder.
//!
//! Each function here forwards to the same-named method on [`default_req`].

use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::{Client, ClientConfig, JsonCodec, ProxyError, Req, Result, XmlIndent};

static DEFAULT_REQ: Lazy<Req> = Lazy::new(|| {
    let config = ClientConfig::from_env().unwrap_or_else(|error| {
        warn!(error = %error, "Ignoring invalid environment configuration");
        ClientConfig::default()
    });
    Req::with_config(config)
});

/// The process-wide default holder.
pub fn default_req() -> &'static Req {
    &DEFAULT_REQ
}

/// See [`Req::client`].
pub fn client() -> Client {
    default_req().client()
}

/// See [`Req::set_client`].
pub fn set_client(client: Option<Client>) {
    default_req().set_client(client)
}

/// See [`Req::flags`].
pub fn flags() -> u32 {
    default_req().flags()
}

/// See [`Req::set_flags`].
pub fn set_flags(flags: u32) {
    default_req().set_flags(flags)
}

/// See [`Req::enable_insecure_tls`].
pub fn enable_insecure_tls(enable: bool) -> Result<()> {
    default_req().enable_insecure_tls(enable)
}

/// See [`Req::enable_cookie`].
pub fn enable_cookie(enable: bool) {
    default_req().enable_cookie(enable)
}

/// See [`Req::set_timeout`].
pub fn set_timeout(timeout: Duration) {
    default_req().set_timeout(timeout)
}

/// See [`Req::set_proxy_url`].
pub fn set_proxy_url(raw: &str) -> Result<()> {
    default_req().set_proxy_url(raw)
}

/// See [`Req::set_proxy`].
pub fn set_proxy<F>(resolver: F) -> Result<()>
where
    F: Fn(&Url) -> std::result::Result<Option<Url>, ProxyError> + Send + Sync + 'static,
{
    default_req().set_proxy(resolver)
}

/// See [`Req::set_xml_indent`].
pub fn set_xml_indent(prefix: impl Into<String>, indent: impl Into<String>) {
    default_req().set_xml_indent(prefix, indent)
}

/// See [`Req::xml_indent`].
pub fn xml_indent() -> Option<XmlIndent> {
    default_req().xml_indent()
}

/// See [`Req::progress_interval`].
pub fn progress_interval() -> Duration {
    default_req().progress_interval()
}

/// See [`Req::set_progress_interval`].
pub fn set_progress_interval(interval: Duration) {
    default_req().set_progress_interval(interval)
}

/// See [`Req::json_encoder`].
pub fn json_encoder() -> Arc<dyn JsonCodec> {
    default_req().json_encoder()
}

/// See [`Req::set_json_encoder`].
pub fn set_json_encoder(encoder: Arc<dyn JsonCodec>) {
    default_req().set_json_encoder(encoder)
}

/// See [`Req::json_decoder`].
pub fn json_decoder() -> Arc<dyn JsonCodec> {
    default_req().json_decoder()
}

/// See [`Req::set_json_decoder`].
pub fn set_json_decoder(decoder: Arc<dyn JsonCodec>) {
    default_req().set_json_decoder(decoder)
}
