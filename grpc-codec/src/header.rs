//! Header translation.
//!
//! On the read path the logical service and method are recovered from the
//! `:path` pseudo-header, or from the `Micro-Service` / `Micro-Endpoint`
//! metadata headers when no path is present. On the write path the gRPC
//! pseudo-headers and status are synthesized from the message kind.
//!
//! | Condition                      | `grpc-status` |
//! |--------------------------------|---------------|
//! | Response                       | 0             |
//! | Error with text [`EOS`]        | 0             |
//! | Error with any other text      | 13            |
//! | Marshal failure during write   | 8             |

use grpc_codec_core::{Code, CodecError};
use http::{Method, StatusCode, header};

use crate::message::Message;

pub const CONTENT_TYPE: &str = "content-type";
pub const PATH: &str = ":path";
pub const METHOD: &str = ":method";
pub const PROTO: &str = ":proto";
pub const AUTHORITY: &str = ":authority";
pub const STATUS: &str = ":status";
pub const TRAILER: &str = "Trailer";
pub const GRPC_STATUS: &str = "grpc-status";
pub const GRPC_MESSAGE: &str = "grpc-message";

/// Fallback header naming the target service when there is no `:path`.
pub const SERVICE_HEADER: &str = "Micro-Service";
/// Fallback header naming the endpoint when there is no `:path`.
pub const ENDPOINT_HEADER: &str = "Micro-Endpoint";

/// Error text that marks a graceful end of stream rather than a failure.
pub const EOS: &str = "EOS";

const HTTP2: &str = "HTTP/2.0";

/// Split a `:path` value into `(target, endpoint)`.
///
/// `/pkg.sub.Service/Method` yields `("pkg.sub", "Service.Method")`. A
/// service segment without dots yields an empty target.
pub fn parse_path(path: &str) -> Result<(String, String), CodecError> {
    let parts: Vec<&str> = path.split('/').collect();
    let [_, service, method] = parts.as_slice() else {
        return Err(CodecError::UnknownRequestPath(path.to_owned()));
    };

    let (target, service) = service.rsplit_once('.').unwrap_or(("", *service));
    Ok((target.to_owned(), format!("{service}.{method}")))
}

/// Build the `:path` for a request: `/<target>.<Service>/<Method>`.
pub fn request_path(target: &str, endpoint: &str) -> Result<String, CodecError> {
    let mut parts = endpoint.split('.');
    let (Some(service), Some(method), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CodecError::InvalidEndpoint(endpoint.to_owned()));
    };

    if target.is_empty() {
        Ok(format!("/{service}/{method}"))
    } else {
        Ok(format!("/{target}.{service}/{method}"))
    }
}

/// Fill in `target` and `endpoint` from the message's headers.
pub fn read_header(msg: &mut Message) -> Result<(), CodecError> {
    let route = match msg.header.get(PATH).filter(|p| p.starts_with('/')) {
        Some(path) => parse_path(path)?,
        None => {
            tracing::debug!("no usable :path header, routing from metadata headers");
            (
                msg.header.get(SERVICE_HEADER).unwrap_or_default().to_owned(),
                msg.header.get(ENDPOINT_HEADER).unwrap_or_default().to_owned(),
            )
        }
    };

    (msg.target, msg.endpoint) = route;
    tracing::trace!(service = %msg.target, endpoint = %msg.endpoint, "resolved route");
    Ok(())
}

/// Write the pseudo-headers of an outbound request.
///
/// Nothing is written if the endpoint is malformed.
pub fn set_request_headers(
    msg: &mut Message,
    content_type: &str,
    user_agent: &str,
) -> Result<(), CodecError> {
    let path = request_path(&msg.target, &msg.endpoint)?;
    let authority = msg.target.clone();

    let h = &mut msg.header;
    h.insert(METHOD, Method::POST.as_str());
    h.insert(PATH, path);
    h.insert(PROTO, HTTP2);
    h.insert(header::TE.as_str(), "trailers");
    h.insert(header::USER_AGENT.as_str(), user_agent);
    h.insert(AUTHORITY, authority);
    h.insert(CONTENT_TYPE, content_type);
    Ok(())
}

/// Write the headers of a successful response.
pub fn set_response_headers(msg: &mut Message, content_type: &str) {
    let h = &mut msg.header;
    h.insert(TRAILER, GRPC_STATUS);
    h.insert(CONTENT_TYPE, content_type);
    h.insert(STATUS, StatusCode::OK.as_str());
    h.insert(GRPC_STATUS, Code::Ok.header_value());
}

/// Write the trailers of an error message.
///
/// [`EOS`] ends the stream with status 0; anything else is an internal error.
pub fn set_error_headers(msg: &mut Message) {
    let error = msg.error.clone().unwrap_or_default();
    let h = &mut msg.header;
    h.insert(TRAILER, format!("{GRPC_STATUS}, {GRPC_MESSAGE}"));

    if error == EOS {
        h.insert(GRPC_STATUS, Code::Ok.header_value());
    } else {
        h.insert(GRPC_MESSAGE, error);
        h.insert(GRPC_STATUS, Code::Internal.header_value());
    }
}

/// Record a write-time marshal failure so the peer sees a coherent status.
pub fn set_failure_headers(msg: &mut Message, err: &CodecError) {
    msg.header
        .insert(GRPC_STATUS, Code::ResourceExhausted.header_value());
    msg.header.insert(GRPC_MESSAGE, err.to_string());
}
