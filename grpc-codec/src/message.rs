//! The message container the codec reads and mutates.
//!
//! A [`Message`] carries the routing fields and header map of one RPC
//! message. The codec fills in `target`/`endpoint` on the read path and the
//! pseudo-headers and status on the write path.

use std::collections::HashMap;
use std::collections::hash_map;

use bytes::Bytes;
use grpc_codec_core::Code;

use crate::header::{CONTENT_TYPE, GRPC_MESSAGE, GRPC_STATUS};

/// Header map keyed by exact (case-sensitive) name.
///
/// Unlike an HTTP header map this accepts pseudo-headers such as `:path` and
/// keeps the spelling of names like `Trailer` as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    headers: HashMap<String, String>,
}

impl Metadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a header value by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    /// Get a header value, treating an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Set a header, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.headers.insert(key.into(), value.into())
    }

    /// Remove a header, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.headers.remove(key)
    }

    /// Check if a header exists.
    pub fn contains(&self, key: &str) -> bool {
        self.headers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterate over `(name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            headers: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl From<HashMap<String, String>> for Metadata {
    fn from(headers: HashMap<String, String>) -> Self {
        Self { headers }
    }
}

impl From<Metadata> for HashMap<String, String> {
    fn from(metadata: Metadata) -> Self {
        metadata.headers
    }
}

impl IntoIterator for Metadata {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.into_iter()
    }
}

/// What a message is, which decides the headers written for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Request,
    Response,
    Error,
}

/// One RPC message as seen by the codec.
#[derive(Debug, Clone)]
pub struct Message {
    pub kind: MessageType,
    /// Target service, e.g. `pkg.sub`.
    pub target: String,
    /// Endpoint, `Service.Method`.
    pub endpoint: String,
    /// Error text for [`MessageType::Error`] messages.
    pub error: Option<String>,
    pub header: Metadata,
    pub body: Bytes,
}

impl Message {
    /// Create an empty message of the given kind.
    pub fn new(kind: MessageType) -> Self {
        Self {
            kind,
            target: String::new(),
            endpoint: String::new(),
            error: None,
            header: Metadata::new(),
            body: Bytes::new(),
        }
    }

    /// Create a request for `endpoint` (`Service.Method`) on `target`.
    pub fn request(target: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            endpoint: endpoint.into(),
            ..Self::new(MessageType::Request)
        }
    }

    pub fn response() -> Self {
        Self::new(MessageType::Response)
    }

    /// Create an error message. Pass [`EOS`](crate::EOS) to end a stream cleanly.
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(MessageType::Error)
        }
    }

    /// Set a header, builder style.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.insert(key, value);
        self
    }

    /// The `content-type` header, if present and non-empty.
    pub fn content_type(&self) -> Option<&str> {
        self.header.get_non_empty(CONTENT_TYPE)
    }

    /// Read back the `grpc-status` / `grpc-message` pair.
    ///
    /// Returns `None` if `grpc-status` is absent or not a valid code.
    pub fn status(&self) -> Option<(Code, Option<&str>)> {
        let code = self.header.get(GRPC_STATUS)?.parse().ok()?;
        Some((code, self.header.get(GRPC_MESSAGE)))
    }
}
