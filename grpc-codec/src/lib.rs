//! # gRPC codec
//!
//! The wire codec a message transport uses to speak gRPC over HTTP/2 byte
//! streams. It sits below the RPC layer and above the transport:
//!
//! - **Framing:** 5-byte length-prefixed frames with a receive size limit
//!   checked before the payload is read (re-exported from `grpc-codec-core`)
//! - **Content negotiation:** binary protobuf (`application/grpc`,
//!   `application/grpc+proto`) or JSON transcoding (`application/grpc+json`)
//! - **Header translation:** routing from `:path` on the way in, pseudo-headers
//!   and `grpc-status` trailers on the way out
//!
//! ## Example
//!
//! ```rust
//! use grpc_codec::{GrpcCodec, Message, Payload, PayloadMut, RawFrame};
//!
//! let codec = GrpcCodec::new();
//!
//! // Outbound request
//! let mut request = Message::request("pkg.sub", "Service.Method");
//! let body = RawFrame::new(&b"\x0a\x02hi"[..]);
//! let mut wire = Vec::new();
//! codec.write(&mut wire, &mut request, Some(Payload::raw(&body))).unwrap();
//! assert_eq!(request.header.get(":path"), Some("/pkg.sub.Service/Method"));
//!
//! // Inbound on the other side
//! let mut inbound = Message::request("", "");
//! inbound.header = request.header.clone();
//! codec.read_header(&mut inbound).unwrap();
//! assert_eq!(inbound.endpoint, "Service.Method");
//!
//! let mut received = RawFrame::default();
//! codec
//!     .read_body(&mut &wire[..], &inbound, Some(PayloadMut::raw(&mut received)))
//!     .unwrap();
//! assert_eq!(received, body);
//! ```

mod codec;
mod config;
mod content_type;
pub mod header;
pub mod marshal;
mod message;
mod payload;

pub use codec::GrpcCodec;
pub use config::{CodecConfig, DEFAULT_USER_AGENT, JsonMarshalOptions, JsonUnmarshalOptions};
pub use content_type::ContentType;
pub use header::EOS;
pub use message::{Message, MessageType, Metadata};
pub use payload::{
    JsonTarget, JsonValue, LegacyMessage, Payload, PayloadMut, ProtoMessage, RawFrame,
};

pub use grpc_codec_core::*;

// Re-export the protobuf crates payloads are built from
pub use prost;
pub use prost_reflect;
