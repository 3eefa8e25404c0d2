//! Content-type negotiation.
//!
//! The content-type token selects how message bodies are encoded inside
//! frames. Only the three gRPC tokens are recognized; anything else makes
//! marshaling fail with [`CodecError::UnsupportedContentType`].

use grpc_codec_core::CodecError;

/// Recognized gRPC content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// `application/grpc`, binary protobuf.
    #[default]
    Grpc,
    /// `application/grpc+proto`, binary protobuf.
    GrpcProto,
    /// `application/grpc+json`, protobuf transcoded to JSON.
    GrpcJson,
}

impl ContentType {
    /// Parse a `content-type` header value.
    ///
    /// Media-type parameters (`; charset=utf-8`) are ignored; the token itself
    /// must match exactly. Returns `None` for unrecognized tokens.
    pub fn from_header(value: &str) -> Option<Self> {
        let token = value.split(';').next().unwrap_or_default().trim();
        match token {
            "application/grpc" => Some(Self::Grpc),
            "application/grpc+proto" => Some(Self::GrpcProto),
            "application/grpc+json" => Some(Self::GrpcJson),
            _ => None,
        }
    }

    /// Like [`from_header`](Self::from_header), but unrecognized tokens are an error.
    pub fn parse(value: &str) -> Result<Self, CodecError> {
        Self::from_header(value).ok_or_else(|| CodecError::UnsupportedContentType(value.to_owned()))
    }

    /// The header value for this content type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grpc => "application/grpc",
            Self::GrpcProto => "application/grpc+proto",
            Self::GrpcJson => "application/grpc+json",
        }
    }

    /// Whether bodies are JSON (vs binary protobuf).
    pub fn is_json(&self) -> bool {
        matches!(self, Self::GrpcJson)
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
