//! Payload variants accepted by the marshaler.
//!
//! A payload is exactly one of:
//!
//! - [`RawFrame`]: opaque bytes relayed unchanged, so a proxy can forward a
//!   body between two connections without knowing its shape
//! - a descriptor-aware protobuf message ([`ProtoMessage`], any
//!   [`prost_reflect::ReflectMessage`] including `DynamicMessage`)
//! - a plain `prost` message whose JSON form comes from its own `serde`
//!   implementation ([`LegacyMessage`], as pbjson-generated types have)
//! - any `serde` value, JSON only ([`JsonValue`] / [`JsonTarget`])
//!
//! The variant is chosen once by the caller when the payload is built. A type
//! that qualifies for several variants should be wrapped with the first that
//! applies in the order above; [`Payload::message`] always picks the
//! descriptor-aware variant.

use bytes::Bytes;
use prost::DecodeError;
use prost_reflect::{DynamicMessage, MessageDescriptor, ReflectMessage};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Opaque bytes that bypass marshaling entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrame {
    pub data: Bytes,
}

impl RawFrame {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

/// A protobuf message that carries its own descriptor.
///
/// Implemented for every [`ReflectMessage`]. JSON transcoding goes through a
/// `DynamicMessage` so the codec's JSON options apply.
pub trait ProtoMessage {
    /// Binary protobuf encoding.
    fn encode_binary(&self) -> Vec<u8>;

    /// Replace the contents with a binary protobuf decoding of `buf`.
    fn replace_from_binary(&mut self, buf: &[u8]) -> Result<(), DecodeError>;

    /// Copy into a `DynamicMessage` of the same type.
    fn to_dynamic(&self) -> DynamicMessage;

    fn message_descriptor(&self) -> MessageDescriptor;
}

impl<T: ReflectMessage> ProtoMessage for T {
    fn encode_binary(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    fn replace_from_binary(&mut self, buf: &[u8]) -> Result<(), DecodeError> {
        self.clear();
        self.merge(buf)
    }

    fn to_dynamic(&self) -> DynamicMessage {
        self.transcode_to_dynamic()
    }

    fn message_descriptor(&self) -> MessageDescriptor {
        self.descriptor()
    }
}

/// A protobuf message without a descriptor.
///
/// Binary encoding comes from `prost`; JSON comes from the type's own serde
/// implementation, so its field casing and default handling are whatever the
/// generated code chose.
pub trait LegacyMessage {
    fn encode_binary(&self) -> Vec<u8>;

    fn replace_from_binary(&mut self, buf: &[u8]) -> Result<(), DecodeError>;

    fn to_json(&self) -> serde_json::Result<Vec<u8>>;

    /// Replace the contents with the JSON in `buf`.
    ///
    /// Fields the type does not know fail the call unless `discard_unknown`
    /// is set. On failure the contents are left as they were.
    fn replace_from_json(&mut self, buf: &[u8], discard_unknown: bool) -> serde_json::Result<()>;
}

impl<T> LegacyMessage for T
where
    T: prost::Message + Serialize + DeserializeOwned,
{
    fn encode_binary(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    fn replace_from_binary(&mut self, buf: &[u8]) -> Result<(), DecodeError> {
        self.clear();
        self.merge(buf)
    }

    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    fn replace_from_json(&mut self, buf: &[u8], discard_unknown: bool) -> serde_json::Result<()> {
        let mut deserializer = serde_json::Deserializer::from_slice(buf);
        let mut unknown = Vec::new();
        let value: T = serde_ignored::deserialize(&mut deserializer, |path| {
            unknown.push(path.to_string());
        })?;
        deserializer.end()?;

        if !discard_unknown {
            if let Some(field) = unknown.first() {
                return Err(serde::de::Error::custom(format!("unknown field `{field}`")));
            }
        }
        *self = value;
        Ok(())
    }
}

/// A generic value that can be written as JSON.
pub trait JsonValue {
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T: Serialize + ?Sized> JsonValue for T {
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// A generic value that can be read from JSON.
pub trait JsonTarget {
    fn replace_from_json(&mut self, buf: &[u8]) -> serde_json::Result<()>;
}

impl<T: DeserializeOwned> JsonTarget for T {
    fn replace_from_json(&mut self, buf: &[u8]) -> serde_json::Result<()> {
        *self = serde_json::from_slice(buf)?;
        Ok(())
    }
}

/// A value to marshal.
#[derive(Clone, Copy)]
pub enum Payload<'a> {
    Raw(&'a RawFrame),
    Proto(&'a dyn ProtoMessage),
    Legacy(&'a dyn LegacyMessage),
    Json(&'a dyn JsonValue),
}

impl<'a> Payload<'a> {
    pub fn raw(frame: &'a RawFrame) -> Self {
        Payload::Raw(frame)
    }

    /// A descriptor-aware message. Preferred over [`legacy`](Self::legacy)
    /// for types that qualify as both.
    pub fn message<M: ReflectMessage>(msg: &'a M) -> Self {
        Payload::Proto(msg)
    }

    pub fn legacy<M>(msg: &'a M) -> Self
    where
        M: prost::Message + Serialize + DeserializeOwned,
    {
        Payload::Legacy(msg)
    }

    pub fn json<T: Serialize>(value: &'a T) -> Self {
        Payload::Json(value)
    }

    /// Short name of the variant, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Raw(_) => "raw frame",
            Payload::Proto(_) => "protobuf message",
            Payload::Legacy(_) => "legacy protobuf message",
            Payload::Json(_) => "generic value",
        }
    }
}

impl std::fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Raw(frame) => f.debug_tuple("Raw").field(frame).finish(),
            other => f.debug_tuple("Payload").field(&other.kind()).finish(),
        }
    }
}

impl<'a> From<&'a RawFrame> for Payload<'a> {
    fn from(frame: &'a RawFrame) -> Self {
        Payload::Raw(frame)
    }
}

impl<'a> From<&'a DynamicMessage> for Payload<'a> {
    fn from(msg: &'a DynamicMessage) -> Self {
        Payload::Proto(msg)
    }
}

/// A value to unmarshal into.
pub enum PayloadMut<'a> {
    Raw(&'a mut RawFrame),
    Proto(&'a mut dyn ProtoMessage),
    Legacy(&'a mut dyn LegacyMessage),
    Json(&'a mut dyn JsonTarget),
}

impl<'a> PayloadMut<'a> {
    pub fn raw(frame: &'a mut RawFrame) -> Self {
        PayloadMut::Raw(frame)
    }

    pub fn message<M: ReflectMessage>(msg: &'a mut M) -> Self {
        PayloadMut::Proto(msg)
    }

    pub fn legacy<M>(msg: &'a mut M) -> Self
    where
        M: prost::Message + Serialize + DeserializeOwned,
    {
        PayloadMut::Legacy(msg)
    }

    pub fn json<T: DeserializeOwned>(value: &'a mut T) -> Self {
        PayloadMut::Json(value)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PayloadMut::Raw(_) => "raw frame",
            PayloadMut::Proto(_) => "protobuf message",
            PayloadMut::Legacy(_) => "legacy protobuf message",
            PayloadMut::Json(_) => "generic value",
        }
    }
}

impl std::fmt::Debug for PayloadMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PayloadMut").field(&self.kind()).finish()
    }
}

impl<'a> From<&'a mut RawFrame> for PayloadMut<'a> {
    fn from(frame: &'a mut RawFrame) -> Self {
        PayloadMut::Raw(frame)
    }
}

impl<'a> From<&'a mut DynamicMessage> for PayloadMut<'a> {
    fn from(msg: &'a mut DynamicMessage) -> Self {
        PayloadMut::Proto(msg)
    }
}
