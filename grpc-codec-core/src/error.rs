//! gRPC status codes and codec errors.
//!
//! - [`Code`]: Status codes carried in the `grpc-status` header
//! - [`CodecError`]: Everything the codec can fail with

use std::io;
use std::str::FromStr;

/// gRPC status codes, as carried in the `grpc-status` header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Code {
    Ok = 0,
    Canceled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl Code {
    /// Get the snake_case name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Ok => "ok",
            Code::Canceled => "canceled",
            Code::Unknown => "unknown",
            Code::InvalidArgument => "invalid_argument",
            Code::DeadlineExceeded => "deadline_exceeded",
            Code::NotFound => "not_found",
            Code::AlreadyExists => "already_exists",
            Code::PermissionDenied => "permission_denied",
            Code::ResourceExhausted => "resource_exhausted",
            Code::FailedPrecondition => "failed_precondition",
            Code::Aborted => "aborted",
            Code::OutOfRange => "out_of_range",
            Code::Unimplemented => "unimplemented",
            Code::Internal => "internal",
            Code::Unavailable => "unavailable",
            Code::DataLoss => "data_loss",
            Code::Unauthenticated => "unauthenticated",
        }
    }

    /// The numeric value sent on the wire.
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Value for the `grpc-status` header (the decimal wire form).
    pub fn header_value(&self) -> String {
        self.as_i32().to_string()
    }

    /// Map a numeric wire value back to a code.
    pub fn from_i32(value: i32) -> Option<Self> {
        let code = match value {
            0 => Code::Ok,
            1 => Code::Canceled,
            2 => Code::Unknown,
            3 => Code::InvalidArgument,
            4 => Code::DeadlineExceeded,
            5 => Code::NotFound,
            6 => Code::AlreadyExists,
            7 => Code::PermissionDenied,
            8 => Code::ResourceExhausted,
            9 => Code::FailedPrecondition,
            10 => Code::Aborted,
            11 => Code::OutOfRange,
            12 => Code::Unimplemented,
            13 => Code::Internal,
            14 => Code::Unavailable,
            15 => Code::DataLoss,
            16 => Code::Unauthenticated,
            _ => return None,
        };
        Some(code)
    }
}

/// Error returned when parsing a [`Code`] from a string fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseCodeError(());

impl std::fmt::Display for ParseCodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown status code")
    }
}

impl std::error::Error for ParseCodeError {}

impl FromStr for Code {
    type Err = ParseCodeError;

    /// Accepts both the decimal wire form (`"13"`) and the snake_case name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(value) = s.parse::<i32>() {
            return Code::from_i32(value).ok_or(ParseCodeError(()));
        }
        match s {
            "ok" => Ok(Code::Ok),
            "canceled" | "cancelled" => Ok(Code::Canceled),
            "unknown" => Ok(Code::Unknown),
            "invalid_argument" => Ok(Code::InvalidArgument),
            "deadline_exceeded" => Ok(Code::DeadlineExceeded),
            "not_found" => Ok(Code::NotFound),
            "already_exists" => Ok(Code::AlreadyExists),
            "permission_denied" => Ok(Code::PermissionDenied),
            "resource_exhausted" => Ok(Code::ResourceExhausted),
            "failed_precondition" => Ok(Code::FailedPrecondition),
            "aborted" => Ok(Code::Aborted),
            "out_of_range" => Ok(Code::OutOfRange),
            "unimplemented" => Ok(Code::Unimplemented),
            "internal" => Ok(Code::Internal),
            "unavailable" => Ok(Code::Unavailable),
            "data_loss" => Ok(Code::DataLoss),
            "unauthenticated" => Ok(Code::Unauthenticated),
            _ => Err(ParseCodeError(())),
        }
    }
}

/// Errors produced while translating headers, marshaling bodies or framing.
///
/// A clean end of stream at a message boundary is not an error; see
/// [`read_frame`](crate::read_frame).
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The `:path` header does not have the `/<service>/<method>` shape.
    #[error("unknown request path: {0:?}")]
    UnknownRequestPath(String),

    /// A request endpoint is not of the form `Service.Method`.
    #[error("invalid endpoint {0:?}: expected Service.Method")]
    InvalidEndpoint(String),

    /// Frame length exceeds the configured maximum message size.
    #[error("grpc: received message larger than max ({length} vs. {limit})")]
    MessageTooLarge { length: u64, limit: u64 },

    /// Frame length cannot be addressed on this host.
    #[error(
        "grpc: received message larger than max length allowed on current machine ({length} vs. {limit})"
    )]
    ExceedsPlatformLimit { length: u64, limit: u64 },

    /// The stream ended in the middle of a frame.
    #[error("unexpected end of stream inside a frame")]
    UnexpectedEof,

    /// The content-type token is not one of the recognized gRPC types.
    #[error("unsupported content-type: {0:?}")]
    UnsupportedContentType(String),

    /// The payload cannot be encoded or decoded under the active content-type.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Message encoding failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Message decoding failed.
    #[error("decode error: {0}")]
    Decode(String),

    /// Underlying transport failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Whether this error is a size-limit violation, either kind.
    pub fn is_size_exceeded(&self) -> bool {
        matches!(
            self,
            CodecError::MessageTooLarge { .. } | CodecError::ExceedsPlatformLimit { .. }
        )
    }
}
