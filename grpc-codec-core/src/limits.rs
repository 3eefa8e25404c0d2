//! Message size limits.
//!
//! The receive limit is checked against the declared frame length before any
//! payload byte is read, so a hostile peer cannot make the codec buffer an
//! arbitrarily large message. The default of 4 MB matches gRPC's default.

use crate::error::CodecError;

/// Default maximum receive message size (4 MB), matching gRPC's default.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Configuration for message size limits.
///
/// # Example
///
/// ```rust
/// use grpc_codec_core::MessageLimits;
///
/// // 4 MB receive limit, no send limit
/// let limits = MessageLimits::default();
///
/// // Custom limits
/// let limits = MessageLimits::new()
///     .receive_max_bytes(16 * 1024 * 1024)
///     .send_max_bytes(8 * 1024 * 1024);
///
/// // No limit at all (not recommended for production)
/// let limits = MessageLimits::unlimited();
/// assert_eq!(limits.get_receive_max_bytes(), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageLimits {
    /// Maximum size of incoming messages in bytes.
    receive_max_bytes: Option<usize>,
    /// Maximum size of outgoing messages in bytes.
    send_max_bytes: Option<usize>,
}

impl Default for MessageLimits {
    fn default() -> Self {
        Self {
            receive_max_bytes: Some(DEFAULT_MAX_MESSAGE_SIZE),
            send_max_bytes: None,
        }
    }
}

impl MessageLimits {
    /// Create the default limits (4 MB receive, unlimited send).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create limits with no maximum in either direction.
    ///
    /// Frames are still bounded by what the host can address.
    pub fn unlimited() -> Self {
        Self {
            receive_max_bytes: None,
            send_max_bytes: None,
        }
    }

    /// Set the maximum size for incoming messages.
    pub fn receive_max_bytes(mut self, max: usize) -> Self {
        self.receive_max_bytes = Some(max);
        self
    }

    /// Set the maximum size for outgoing messages.
    pub fn send_max_bytes(mut self, max: usize) -> Self {
        self.send_max_bytes = Some(max);
        self
    }

    /// Returns the maximum receive message size, or `None` if unlimited.
    pub fn get_receive_max_bytes(&self) -> Option<usize> {
        self.receive_max_bytes
    }

    /// Returns the maximum send message size, or `None` if unlimited.
    pub fn get_send_max_bytes(&self) -> Option<usize> {
        self.send_max_bytes
    }

    /// Check an incoming frame length against the receive limit.
    pub fn check_receive_size(&self, length: u64) -> Result<(), CodecError> {
        check(length, self.receive_max_bytes)
    }

    /// Check an outgoing message length against the send limit.
    pub fn check_send_size(&self, length: usize) -> Result<(), CodecError> {
        check(length as u64, self.send_max_bytes)
    }
}

fn check(length: u64, max: Option<usize>) -> Result<(), CodecError> {
    match max {
        Some(limit) if length > limit as u64 => Err(CodecError::MessageTooLarge {
            length,
            limit: limit as u64,
        }),
        _ => Ok(()),
    }
}
