//! Content marshaling.
//!
//! Turns a [`Payload`] into frame payload bytes and back, choosing between
//! binary protobuf and JSON from the content-type. Dispatch order:
//!
//! 1. no payload: nothing to do
//! 2. [`RawFrame`](crate::RawFrame): bytes pass through unchanged, the
//!    content-type is never looked at
//! 3. unrecognized content-type: [`CodecError::UnsupportedContentType`]
//! 4. protobuf messages: binary or JSON per content-type
//! 5. generic values: JSON only, otherwise [`CodecError::InvalidMessage`]

use bytes::Bytes;
use grpc_codec_core::CodecError;
use prost::Message as _;
use prost_reflect::{Cardinality, DeserializeOptions, DynamicMessage, ReflectMessage, Value};

use crate::config::{JsonMarshalOptions, JsonUnmarshalOptions};
use crate::content_type::ContentType;
use crate::payload::{Payload, PayloadMut, ProtoMessage};

/// Encode `payload` for `content_type`.
///
/// Returns empty bytes for `None`.
pub fn marshal(
    content_type: &str,
    payload: Option<Payload<'_>>,
    options: &JsonMarshalOptions,
) -> Result<Bytes, CodecError> {
    let Some(payload) = payload else {
        return Ok(Bytes::new());
    };
    let resolve = || ContentType::parse(content_type);

    let buf = match payload {
        Payload::Raw(frame) => return Ok(frame.data.clone()),
        Payload::Proto(msg) => {
            if resolve()?.is_json() {
                proto_to_json(msg, options)?
            } else {
                msg.encode_binary()
            }
        }
        Payload::Legacy(msg) => {
            if resolve()?.is_json() {
                msg.to_json().map_err(json_encode_error)?
            } else {
                msg.encode_binary()
            }
        }
        Payload::Json(value) => {
            let content_type = resolve()?;
            if !content_type.is_json() {
                return Err(not_json(content_type));
            }
            value.to_json().map_err(json_encode_error)?
        }
    };

    Ok(Bytes::from(buf))
}

/// Decode `data` for `content_type` into `target`.
///
/// Empty input or a `None` target leaves everything untouched.
pub fn unmarshal(
    content_type: &str,
    data: &[u8],
    target: Option<PayloadMut<'_>>,
    options: &JsonUnmarshalOptions,
) -> Result<(), CodecError> {
    let Some(target) = target else {
        return Ok(());
    };
    if data.is_empty() {
        return Ok(());
    }
    let resolve = || ContentType::parse(content_type);

    match target {
        PayloadMut::Raw(frame) => {
            frame.data = Bytes::copy_from_slice(data);
            Ok(())
        }
        PayloadMut::Proto(msg) => {
            if resolve()?.is_json() {
                proto_from_json(msg, data, options)
            } else {
                msg.replace_from_binary(data).map_err(proto_decode_error)
            }
        }
        PayloadMut::Legacy(msg) => {
            if resolve()?.is_json() {
                msg.replace_from_json(data, options.discard_unknown)
                    .map_err(json_decode_error)
            } else {
                msg.replace_from_binary(data).map_err(proto_decode_error)
            }
        }
        PayloadMut::Json(value) => {
            let content_type = resolve()?;
            if !content_type.is_json() {
                return Err(not_json(content_type));
            }
            value.replace_from_json(data).map_err(json_decode_error)
        }
    }
}

fn proto_to_json(
    msg: &dyn ProtoMessage,
    options: &JsonMarshalOptions,
) -> Result<Vec<u8>, CodecError> {
    let dynamic = msg.to_dynamic();
    if !options.allow_partial {
        check_required(&dynamic).map_err(CodecError::Encode)?;
    }

    let mut serializer = serde_json::Serializer::new(Vec::new());
    dynamic
        .serialize_with_options(&mut serializer, &options.serialize_options())
        .map_err(json_encode_error)?;
    Ok(serializer.into_inner())
}

fn proto_from_json(
    msg: &mut dyn ProtoMessage,
    data: &[u8],
    options: &JsonUnmarshalOptions,
) -> Result<(), CodecError> {
    let deserialize_options =
        DeserializeOptions::new().deny_unknown_fields(!options.discard_unknown);
    let mut deserializer = serde_json::Deserializer::from_slice(data);
    let dynamic = DynamicMessage::deserialize_with_options(
        msg.message_descriptor(),
        &mut deserializer,
        &deserialize_options,
    )
    .and_then(|dynamic| deserializer.end().map(|()| dynamic))
    .map_err(json_decode_error)?;

    if !options.allow_partial {
        check_required(&dynamic).map_err(CodecError::Decode)?;
    }

    msg.replace_from_binary(&dynamic.encode_to_vec())
        .map_err(proto_decode_error)
}

/// Fail on the first unset `required` field, searching nested messages too.
fn check_required(msg: &DynamicMessage) -> Result<(), String> {
    for field in msg.descriptor().fields() {
        let present = msg.has_field(&field);
        if field.cardinality() == Cardinality::Required && !present {
            return Err(format!("required field {} not set", field.full_name()));
        }
        if !present || field.kind().as_message().is_none() {
            continue;
        }

        match &*msg.get_field(&field) {
            Value::Message(nested) => check_required(nested)?,
            Value::List(items) => {
                for item in items {
                    if let Value::Message(nested) = item {
                        check_required(nested)?;
                    }
                }
            }
            Value::Map(entries) => {
                for value in entries.values() {
                    if let Value::Message(nested) = value {
                        check_required(nested)?;
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn not_json(content_type: ContentType) -> CodecError {
    CodecError::InvalidMessage(format!(
        "generic values need {}, got {content_type}",
        ContentType::GrpcJson
    ))
}

fn json_encode_error(e: serde_json::Error) -> CodecError {
    CodecError::Encode(format!("JSON encoding failed: {e}"))
}

fn json_decode_error(e: serde_json::Error) -> CodecError {
    CodecError::Decode(format!("JSON decoding failed: {e}"))
}

fn proto_decode_error(e: prost::DecodeError) -> CodecError {
    CodecError::Decode(format!("protobuf decoding failed: {e}"))
}
