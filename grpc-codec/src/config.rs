//! Codec configuration.
//!
//! Set once when the codec is built and never mutated afterwards, so a single
//! [`GrpcCodec`](crate::GrpcCodec) can serve many calls at once.

use std::borrow::Cow;

use grpc_codec_core::MessageLimits;
use prost_reflect::SerializeOptions;

use crate::content_type::ContentType;

/// User agent sent on outbound requests.
pub const DEFAULT_USER_AGENT: &str = "grpc-go/1.0.0";

/// How protobuf messages are rendered as JSON.
///
/// The defaults render enums by name, omit unpopulated fields, keep the
/// original proto field names and refuse to encode a message that is missing
/// required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonMarshalOptions {
    /// Render enum values as numbers instead of names.
    pub use_enum_numbers: bool,
    /// Emit fields that hold their default value.
    pub emit_unpopulated: bool,
    /// Use the proto field name (`user_name`) instead of the JSON name (`userName`).
    pub use_proto_names: bool,
    /// Allow encoding messages with missing required fields.
    pub allow_partial: bool,
}

impl Default for JsonMarshalOptions {
    fn default() -> Self {
        Self {
            use_enum_numbers: false,
            emit_unpopulated: false,
            use_proto_names: true,
            allow_partial: false,
        }
    }
}

impl JsonMarshalOptions {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render enum values as numbers instead of their names.
    pub fn use_enum_numbers(mut self, yes: bool) -> Self {
        self.use_enum_numbers = yes;
        self
    }

    /// Emit fields that hold their default value.
    pub fn emit_unpopulated(mut self, yes: bool) -> Self {
        self.emit_unpopulated = yes;
        self
    }

    /// Key fields by proto name (`user_name`) rather than JSON name (`userName`).
    pub fn use_proto_names(mut self, yes: bool) -> Self {
        self.use_proto_names = yes;
        self
    }

    /// Encode messages even if required fields are missing.
    pub fn allow_partial(mut self, yes: bool) -> Self {
        self.allow_partial = yes;
        self
    }

    pub(crate) fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions::new()
            .use_enum_numbers(self.use_enum_numbers)
            .skip_default_fields(!self.emit_unpopulated)
            .use_proto_field_name(self.use_proto_names)
    }
}

/// How JSON is parsed into protobuf messages.
///
/// The defaults reject unknown fields and messages missing required fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonUnmarshalOptions {
    /// Ignore JSON fields that the message does not define.
    pub discard_unknown: bool,
    /// Accept messages with missing required fields.
    pub allow_partial: bool,
}

impl JsonUnmarshalOptions {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore JSON fields the target does not define instead of failing.
    pub fn discard_unknown(mut self, yes: bool) -> Self {
        self.discard_unknown = yes;
        self
    }

    /// Accept descriptor-aware messages that are missing required fields.
    pub fn allow_partial(mut self, yes: bool) -> Self {
        self.allow_partial = yes;
        self
    }
}

/// Configuration for [`GrpcCodec`](crate::GrpcCodec).
///
/// # Example
///
/// ```rust
/// use grpc_codec::{CodecConfig, ContentType, JsonMarshalOptions, MessageLimits};
///
/// let config = CodecConfig::new()
///     .limits(MessageLimits::new().receive_max_bytes(1024 * 1024))
///     .default_content_type(ContentType::GrpcJson)
///     .json_marshal(JsonMarshalOptions::new().emit_unpopulated(true));
/// assert_eq!(config.get_default_content_type(), ContentType::GrpcJson);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    limits: MessageLimits,
    default_content_type: ContentType,
    json_marshal: JsonMarshalOptions,
    json_unmarshal: JsonUnmarshalOptions,
    user_agent: Cow<'static, str>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            limits: MessageLimits::default(),
            default_content_type: ContentType::Grpc,
            json_marshal: JsonMarshalOptions::default(),
            json_unmarshal: JsonUnmarshalOptions::default(),
            user_agent: Cow::Borrowed(DEFAULT_USER_AGENT),
        }
    }
}

impl CodecConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set message size limits.
    pub fn limits(mut self, limits: MessageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Content type used when a message carries no `content-type` header.
    pub fn default_content_type(mut self, content_type: ContentType) -> Self {
        self.default_content_type = content_type;
        self
    }

    /// JSON rendering used when a call supplies no override.
    pub fn json_marshal(mut self, options: JsonMarshalOptions) -> Self {
        self.json_marshal = options;
        self
    }

    /// JSON parsing used when a call supplies no override.
    pub fn json_unmarshal(mut self, options: JsonUnmarshalOptions) -> Self {
        self.json_unmarshal = options;
        self
    }

    /// User agent sent on outbound requests.
    pub fn user_agent(mut self, user_agent: impl Into<Cow<'static, str>>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the message size limits.
    pub fn get_limits(&self) -> &MessageLimits {
        &self.limits
    }

    /// Returns the content type used for messages without a `content-type` header.
    pub fn get_default_content_type(&self) -> ContentType {
        self.default_content_type
    }

    /// Returns the JSON rendering applied when a call gives no override.
    pub fn get_json_marshal(&self) -> &JsonMarshalOptions {
        &self.json_marshal
    }

    /// Returns the JSON parsing applied when a call gives no override.
    pub fn get_json_unmarshal(&self) -> &JsonUnmarshalOptions {
        &self.json_unmarshal
    }

    /// Returns the user agent sent on outbound requests.
    pub fn get_user_agent(&self) -> &str {
        &self.user_agent
    }
}
