//! # Armature Req
//!
//! Lazily built, runtime-configurable pooled HTTP client settings for
//! request builders.
//!
//! A [`Req`] owns one pooled [`Client`] which is built on first use with
//! finite defaults (120s request timeout, 30s dial timeout, 10s TLS
//! handshake timeout, 90s idle connection timeout, cookie jar enabled) and
//! can be reconfigured at any time afterwards. Every operation also exists
//! as a free function acting on the process-wide [`default_req`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! fn main() -> armature_req::Result<()> {
//!     // process-wide defaults
//!     armature_req::set_timeout(Duration::from_secs(30));
//!     armature_req::set_proxy_url("http://proxy.local:8080")?;
//!
//!     let http = armature_req::client().http()?;
//!     let _ = http.get("https://api.example.com/users");
//!     Ok(())
//! }
//! ```
//!
//! ## Isolated Holders
//!
//! ```rust
//! use armature_req::{ClientConfig, Req};
//! use std::time::Duration;
//!
//! let req = Req::with_config(
//!     ClientConfig::builder()
//!         .timeout(Duration::from_secs(10))
//!         .cookies(false)
//!         .build(),
//! );
//!
//! req.enable_cookie(true);
//! req.set_xml_indent("", "  ");
//! assert_eq!(req.client().timeout(), Duration::from_secs(10));
//! ```
//!
//! ## Concurrency
//!
//! Configuration is expected to finish before steady-state request traffic.
//! Setters never corrupt the client, but a request already in flight may
//! observe either the old or the new settings.

mod client;
mod codec;
mod config;
mod error;
mod req;
mod transport;

pub mod flags;
pub mod global;

pub use client::Client;
pub use codec::{JsonCodec, PrettyJson, StdJson, XmlIndent};
pub use config::{ClientConfig, ClientConfigBuilder, ENV_PREFIX};
pub use error::{ReqError, Result};
pub use req::{DEFAULT_PROGRESS_INTERVAL, Req};
pub use transport::{PooledTransport, ProxyError, ProxyPolicy, ProxyResolver, Transport};

pub use global::{
    client, default_req, enable_cookie, enable_insecure_tls, flags, json_decoder, json_encoder,
    progress_interval, set_client, set_flags, set_json_decoder, set_json_encoder,
    set_progress_interval, set_proxy, set_proxy_url, set_timeout, set_xml_indent, xml_indent,
};

// Re-export common types
pub use reqwest::cookie::Jar;
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use armature_req::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::Client;
    pub use crate::codec::{JsonCodec, PrettyJson, StdJson, XmlIndent};
    pub use crate::config::{ClientConfig, ClientConfigBuilder};
    pub use crate::error::{ReqError, Result};
    pub use crate::req::Req;
    pub use crate::transport::{PooledTransport, ProxyPolicy, Transport};
    pub use url::Url;
}
