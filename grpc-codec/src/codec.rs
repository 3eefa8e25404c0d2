//! The codec facade a transport drives for each message.
//!
//! Inbound: [`GrpcCodec::read_header`] then [`GrpcCodec::read_body`].
//! Outbound: [`GrpcCodec::write`].
//!
//! The codec only holds its [`CodecConfig`]. The content type of a call is
//! taken from the message's own `content-type` header (or the configured
//! default), so one codec can be shared by any number of concurrent streams.

use std::io::{Read, Write};

use bytes::Bytes;
use grpc_codec_core::{CodecError, frame_flags, read_frame, write_frame};

use crate::config::{CodecConfig, JsonMarshalOptions, JsonUnmarshalOptions};
use crate::header;
use crate::marshal;
use crate::message::{Message, MessageType};
use crate::payload::{Payload, PayloadMut};

/// gRPC codec over blocking byte streams.
#[derive(Debug, Clone, Default)]
pub struct GrpcCodec {
    config: CodecConfig,
}

impl GrpcCodec {
    /// Create a codec with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Codec identifier.
    pub fn name(&self) -> &'static str {
        "grpc"
    }

    /// The content type in effect for `msg`.
    pub fn content_type<'a>(&'a self, msg: &'a Message) -> &'a str {
        msg.content_type()
            .unwrap_or_else(|| self.config.get_default_content_type().as_str())
    }

    /// Resolve `target` and `endpoint` from the inbound headers.
    pub fn read_header(&self, msg: &mut Message) -> Result<(), CodecError> {
        header::read_header(msg)
    }

    /// Read one frame from `reader` and decode it into `target`.
    ///
    /// With no target the stream is not touched. A clean end of stream or a
    /// zero-length frame leaves the target as it was.
    pub fn read_body<R>(
        &self,
        reader: &mut R,
        msg: &Message,
        target: Option<PayloadMut<'_>>,
    ) -> Result<(), CodecError>
    where
        R: Read + ?Sized,
    {
        let Some(target) = target else {
            return Ok(());
        };

        let Some(frame) = read_frame(reader, self.config.get_limits())? else {
            tracing::trace!("end of stream before message body");
            return Ok(());
        };
        if frame.compression_flag != frame_flags::UNCOMPRESSED {
            tracing::trace!(
                compression_flag = frame.compression_flag,
                "ignoring frame compression flag"
            );
        }

        self.unmarshal(msg, &frame.payload, Some(target), None)
    }

    /// Write the headers for `msg` and, unless it is an error, frame `payload`
    /// onto `writer`.
    ///
    /// If encoding fails the message is still given a `grpc-status` of
    /// `RESOURCE_EXHAUSTED` and a `grpc-message` before the error is returned.
    /// An empty encoding writes no frame.
    pub fn write<W>(
        &self,
        writer: &mut W,
        msg: &mut Message,
        payload: Option<Payload<'_>>,
    ) -> Result<(), CodecError>
    where
        W: Write + ?Sized,
    {
        let content_type = self.content_type(msg).to_owned();

        match msg.kind {
            MessageType::Request => {
                header::set_request_headers(msg, &content_type, self.config.get_user_agent())?
            }
            MessageType::Response => header::set_response_headers(msg, &content_type),
            MessageType::Error => {
                header::set_error_headers(msg);
                return Ok(());
            }
        }

        let buf = match self.encode(&content_type, payload) {
            Ok(buf) => buf,
            Err(err) => {
                tracing::debug!(error = %err, kind = ?msg.kind, "failed to encode grpc message");
                header::set_failure_headers(msg, &err);
                return Err(err);
            }
        };
        if buf.is_empty() {
            return Ok(());
        }

        write_frame(writer, frame_flags::UNCOMPRESSED, &buf)
    }

    /// Encode `payload` with the content type of `msg`.
    ///
    /// `options` overrides the configured JSON rendering for this call only.
    pub fn marshal(
        &self,
        msg: &Message,
        payload: Option<Payload<'_>>,
        options: Option<&JsonMarshalOptions>,
    ) -> Result<Bytes, CodecError> {
        let options = options.unwrap_or(self.config.get_json_marshal());
        marshal::marshal(self.content_type(msg), payload, options)
    }

    /// Decode `data` with the content type of `msg`.
    ///
    /// `options` overrides the configured JSON parsing for this call only.
    pub fn unmarshal(
        &self,
        msg: &Message,
        data: &[u8],
        target: Option<PayloadMut<'_>>,
        options: Option<&JsonUnmarshalOptions>,
    ) -> Result<(), CodecError> {
        let options = options.unwrap_or(self.config.get_json_unmarshal());
        marshal::unmarshal(self.content_type(msg), data, target, options)
    }

    fn encode(
        &self,
        content_type: &str,
        payload: Option<Payload<'_>>,
    ) -> Result<Bytes, CodecError> {
        let buf = marshal::marshal(content_type, payload, self.config.get_json_marshal())?;
        self.config.get_limits().check_send_size(buf.len())?;
        Ok(buf)
    }
}
