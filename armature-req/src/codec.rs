//! Serialization providers and formatting options read at encode time.

use serde_json::Value;

/// A pluggable JSON provider.
///
/// A [`Req`](crate::Req) keeps separate encoder and decoder slots; nothing
/// checks that the two agree.
pub trait JsonCodec: Send + Sync {
    /// Provider name, used in logs.
    fn name(&self) -> &'static str {
        "custom"
    }

    /// Serialize a value.
    fn encode(&self, value: &Value) -> serde_json::Result<Vec<u8>>;

    /// Deserialize a value.
    fn decode(&self, bytes: &[u8]) -> serde_json::Result<Value>;
}

/// Compact `serde_json` output. The default provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdJson;

impl JsonCodec for StdJson {
    fn name(&self) -> &'static str {
        "std"
    }

    fn encode(&self, value: &Value) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(value)
    }

    fn decode(&self, bytes: &[u8]) -> serde_json::Result<Value> {
        serde_json::from_slice(bytes)
    }
}

/// Indented `serde_json` output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyJson;

impl JsonCodec for PrettyJson {
    fn name(&self) -> &'static str {
        "pretty"
    }

    fn encode(&self, value: &Value) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(value)
    }

    fn decode(&self, bytes: &[u8]) -> serde_json::Result<Value> {
        serde_json::from_slice(bytes)
    }
}

/// XML indentation: each element starts on a new line beginning with
/// `prefix`, followed by one `indent` per nesting level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlIndent {
    /// Line prefix.
    pub prefix: String,
    /// Per-level indent.
    pub indent: String,
}
