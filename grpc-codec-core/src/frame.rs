//! gRPC length-prefixed message framing.
//!
//! Every message on a gRPC byte stream is wrapped in a frame:
//!
//! ```text
//! [compression-flag:1][length:4, big-endian][payload:length]
//! ```
//!
//! The compression flag is carried through untouched; nothing in this crate
//! compresses or decompresses payloads.

use std::io::{self, Read, Write};

use bytes::{Bytes, BytesMut};

use crate::error::CodecError;
use crate::limits::MessageLimits;

/// Compression flag values.
pub mod frame_flags {
    /// Payload is not compressed.
    pub const UNCOMPRESSED: u8 = 0x00;
    /// Payload is compressed with the negotiated `grpc-encoding`.
    pub const COMPRESSED: u8 = 0x01;
}

/// Frame header size (flag + length).
pub const FRAME_HEADER_SIZE: usize = 5;

/// Largest frame length the host can hold in a single buffer.
const MAX_ADDRESSABLE_LENGTH: u64 = isize::MAX as u64;

/// A single decoded frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    /// The compression flag byte, as received.
    pub compression_flag: u8,
    /// The frame payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create an uncompressed frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            compression_flag: frame_flags::UNCOMPRESSED,
            payload: payload.into(),
        }
    }

    /// Total bytes this frame occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        FRAME_HEADER_SIZE + self.payload.len()
    }
}

/// Read one frame from `reader`.
///
/// Returns:
/// - `Ok(None)` if the stream is exhausted before the first header byte, the
///   normal end-of-stream signal
/// - `Ok(Some(frame))` with an empty payload for a zero-length frame
/// - `Err(CodecError::MessageTooLarge)` / `Err(CodecError::ExceedsPlatformLimit)`
///   if the declared length is over a limit; no payload byte is read
/// - `Err(CodecError::UnexpectedEof)` if the stream ends inside the frame
pub fn read_frame<R>(reader: &mut R, limits: &MessageLimits) -> Result<Option<Frame>, CodecError>
where
    R: Read + ?Sized,
{
    let mut header = [0u8; FRAME_HEADER_SIZE];
    if !read_header(reader, &mut header)? {
        return Ok(None);
    }

    let (compression_flag, length) = parse_frame_header(&header)?;
    if length == 0 {
        return Ok(Some(Frame {
            compression_flag,
            payload: Bytes::new(),
        }));
    }

    let length = check_frame_length(length, limits)?;
    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            CodecError::UnexpectedEof
        } else {
            CodecError::Io(e)
        }
    })?;

    tracing::trace!(compression_flag, length, "read grpc frame");
    Ok(Some(Frame {
        compression_flag,
        payload: Bytes::from(payload),
    }))
}

/// Write one frame to `writer`: the 5-byte header, then the payload.
///
/// Fails without writing anything if the payload length does not fit the
/// 4-byte length prefix.
pub fn write_frame<W>(
    writer: &mut W,
    compression_flag: u8,
    payload: &[u8],
) -> Result<(), CodecError>
where
    W: Write + ?Sized,
{
    let header = encode_header(compression_flag, payload.len())?;
    writer.write_all(&header)?;
    writer.write_all(payload)?;

    tracing::trace!(compression_flag, length = payload.len(), "wrote grpc frame");
    Ok(())
}

/// Wrap a payload into a complete frame held in memory.
pub fn wrap_frame(compression_flag: u8, payload: &[u8]) -> Result<Vec<u8>, CodecError> {
    let header = encode_header(compression_flag, payload.len())?;
    let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    frame.extend_from_slice(&header);
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Parse a frame header from the start of `data`.
///
/// Returns `(compression_flag, length)`.
pub fn parse_frame_header(data: &[u8]) -> Result<(u8, u32), CodecError> {
    if data.len() < FRAME_HEADER_SIZE {
        return Err(CodecError::UnexpectedEof);
    }

    let flag = data[0];
    let length = u32::from_be_bytes([data[1], data[2], data[3], data[4]]);
    Ok((flag, length))
}

fn encode_header(compression_flag: u8, len: usize) -> Result<[u8; FRAME_HEADER_SIZE], CodecError> {
    let length = u32::try_from(len).map_err(|_| CodecError::MessageTooLarge {
        length: len as u64,
        limit: u64::from(u32::MAX),
    })?;

    let mut header = [0u8; FRAME_HEADER_SIZE];
    header[0] = compression_flag;
    header[1..].copy_from_slice(&length.to_be_bytes());
    Ok(header)
}

/// Fill `header` completely. `Ok(false)` means the stream was already at EOF.
fn read_header<R>(reader: &mut R, header: &mut [u8; FRAME_HEADER_SIZE]) -> Result<bool, CodecError>
where
    R: Read + ?Sized,
{
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(CodecError::UnexpectedEof),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(CodecError::Io(e)),
        }
    }
    Ok(true)
}

fn check_frame_length(length: u32, limits: &MessageLimits) -> Result<usize, CodecError> {
    let declared = u64::from(length);
    if declared > MAX_ADDRESSABLE_LENGTH {
        tracing::debug!(length, "frame length exceeds addressable size");
        return Err(CodecError::ExceedsPlatformLimit {
            length: declared,
            limit: MAX_ADDRESSABLE_LENGTH,
        });
    }

    if let Err(err) = limits.check_receive_size(declared) {
        tracing::debug!(
            length,
            limit = ?limits.get_receive_max_bytes(),
            "rejecting oversized frame"
        );
        return Err(err);
    }

    Ok(length as usize)
}

/// Incremental frame decoder for transports that deliver the stream in chunks.
///
/// Feed chunks with [`extend`](Self::extend) and pull complete frames with
/// [`decode`](Self::decode). Size limits are enforced as soon as a header is
/// buffered, before the payload arrives.
///
/// # Example
///
/// ```
/// use grpc_codec_core::{FrameDecoder, MessageLimits, wrap_frame};
///
/// let wire = wrap_frame(0, b"hello").unwrap();
/// let mut decoder = FrameDecoder::new(MessageLimits::default());
///
/// decoder.extend(&wire[..3]);
/// assert!(decoder.decode().unwrap().is_none());
///
/// decoder.extend(&wire[3..]);
/// let frame = decoder.decode().unwrap().unwrap();
/// assert_eq!(&frame.payload[..], b"hello");
/// ```
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes received but not yet consumed as frames.
    buffer: BytesMut,
    limits: MessageLimits,
}

impl FrameDecoder {
    /// Create a decoder enforcing `limits`.
    pub fn new(limits: MessageLimits) -> Self {
        Self {
            buffer: BytesMut::new(),
            limits,
        }
    }

    /// Append a chunk received from the transport.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Number of buffered bytes not yet returned as frames.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Try to take one complete frame from the buffer.
    ///
    /// Returns `Ok(None)` if more data is needed.
    pub fn decode(&mut self) -> Result<Option<Frame>, CodecError> {
        if self.buffer.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let (compression_flag, length) = parse_frame_header(&self.buffer)?;
        let length = check_frame_length(length, &self.limits)?;
        let frame_size = FRAME_HEADER_SIZE + length;
        if self.buffer.len() < frame_size {
            return Ok(None);
        }

        let mut frame = self.buffer.split_to(frame_size);
        let payload = frame.split_off(FRAME_HEADER_SIZE).freeze();
        Ok(Some(Frame {
            compression_flag,
            payload,
        }))
    }

    /// Signal that the transport is closed.
    ///
    /// Fails with `UnexpectedEof` if a partial frame is still buffered.
    pub fn finish(&self) -> Result<(), CodecError> {
        if self.buffer.is_empty() {
            Ok(())
        } else {
            Err(CodecError::UnexpectedEof)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that returns `Interrupted` once before delegating.
    struct InterruptOnce<R> {
        inner: R,
        interrupted: bool,
    }

    impl<R: Read> Read for InterruptOnce<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::ErrorKind::Interrupted.into());
            }
            self.inner.read(buf)
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    /// Reader that hands out one byte per call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn test_write_frame_layout() {
        let mut out = Vec::new();
        write_frame(&mut out, frame_flags::UNCOMPRESSED, b"hello").unwrap();

        assert_eq!(out[0], frame_flags::UNCOMPRESSED);
        assert_eq!(u32::from_be_bytes([out[1], out[2], out[3], out[4]]), 5);
        assert_eq!(&out[5..], b"hello");
    }

    #[test]
    fn test_round_trip_preserves_flag_and_payload() {
        let mut out = Vec::new();
        write_frame(&mut out, frame_flags::COMPRESSED, b"opaque").unwrap();

        let frame = read_frame(&mut Cursor::new(out), &MessageLimits::default())
            .unwrap()
            .unwrap();
        assert_eq!(frame.compression_flag, frame_flags::COMPRESSED);
        assert_eq!(&frame.payload[..], b"opaque");
    }

    #[test]
    fn test_read_frame_empty_stream_is_end_of_stream() {
        let result = read_frame(&mut Cursor::new(Vec::new()), &MessageLimits::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_read_frame_zero_length() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x00];
        let frame = read_frame(&mut Cursor::new(data), &MessageLimits::default())
            .unwrap()
            .unwrap();
        assert_eq!(frame.compression_flag, 0);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_read_frame_consecutive_frames() {
        let mut out = Vec::new();
        write_frame(&mut out, 0, b"one").unwrap();
        write_frame(&mut out, 0, b"two").unwrap();

        let mut cursor = Cursor::new(out);
        let limits = MessageLimits::default();
        assert_eq!(&read_frame(&mut cursor, &limits).unwrap().unwrap().payload[..], b"one");
        assert_eq!(&read_frame(&mut cursor, &limits).unwrap().unwrap().payload[..], b"two");
        assert!(read_frame(&mut cursor, &limits).unwrap().is_none());
    }

    #[test]
    fn test_read_frame_oversized_does_not_consume_payload() {
        let mut data = vec![0x00, 0x00, 0x00, 0x00, 0x10];
        data.extend_from_slice(&[0xAA; 16]);
        let mut cursor = Cursor::new(data);
        let limits = MessageLimits::new().receive_max_bytes(8);

        match read_frame(&mut cursor, &limits) {
            Err(CodecError::MessageTooLarge { length, limit }) => {
                assert_eq!(length, 16);
                assert_eq!(limit, 8);
            }
            other => panic!("expected MessageTooLarge, got {other:?}"),
        }
        assert_eq!(cursor.position(), FRAME_HEADER_SIZE as u64);
    }

    #[test]
    fn test_read_frame_unlimited_accepts_large_declared_length() {
        let mut out = Vec::new();
        let payload = vec![7u8; 64 * 1024];
        write_frame(&mut out, 0, &payload).unwrap();

        let frame = read_frame(&mut Cursor::new(out), &MessageLimits::unlimited())
            .unwrap()
            .unwrap();
        assert_eq!(frame.payload.len(), payload.len());
    }

    #[test]
    fn test_read_frame_truncated_payload() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x05, b'h', b'e'];
        let result = read_frame(&mut Cursor::new(data), &MessageLimits::default());
        assert!(matches!(result, Err(CodecError::UnexpectedEof)));
    }

    #[test]
    fn test_read_frame_truncated_header() {
        let data = [0x00, 0x00, 0x00];
        let result = read_frame(&mut Cursor::new(data), &MessageLimits::default());
        assert!(matches!(result, Err(CodecError::UnexpectedEof)));
    }

    #[test]
    fn test_read_frame_surfaces_io_error() {
        let result = read_frame(&mut FailingReader, &MessageLimits::default());
        match result {
            Err(CodecError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn test_read_frame_retries_interrupted() {
        let wire = wrap_frame(0, b"abc").unwrap();
        let mut reader = InterruptOnce {
            inner: Cursor::new(wire),
            interrupted: false,
        };
        let frame = read_frame(&mut reader, &MessageLimits::default())
            .unwrap()
            .unwrap();
        assert_eq!(&frame.payload[..], b"abc");
    }

    #[test]
    fn test_read_frame_short_reads() {
        let wire = wrap_frame(0, b"split across reads").unwrap();
        let frame = read_frame(&mut Trickle(&wire), &MessageLimits::default())
            .unwrap()
            .unwrap();
        assert_eq!(&frame.payload[..], b"split across reads");
    }

    #[test]
    fn test_wrap_frame_matches_write_frame() {
        let mut written = Vec::new();
        write_frame(&mut written, 0, b"same").unwrap();
        assert_eq!(wrap_frame(0, b"same").unwrap(), written);
        assert_eq!(Frame::new(&b"same"[..]).encoded_len(), written.len());
    }

    #[test]
    fn test_parse_frame_header() {
        let data = [0x01, 0x00, 0x00, 0x01, 0x00];
        assert_eq!(parse_frame_header(&data).unwrap(), (0x01, 256));
        assert!(matches!(
            parse_frame_header(&data[..4]),
            Err(CodecError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_frame_decoder_chunks() {
        let mut wire = wrap_frame(0, b"first").unwrap();
        wire.extend(wrap_frame(1, b"second").unwrap());

        let mut decoder = FrameDecoder::new(MessageLimits::default());
        let mut frames = Vec::new();
        for chunk in wire.chunks(3) {
            decoder.extend(chunk);
            while let Some(frame) = decoder.decode().unwrap() {
                frames.push(frame);
            }
        }

        assert_eq!(frames.len(), 2);
        assert_eq!(&frames[0].payload[..], b"first");
        assert_eq!(frames[1].compression_flag, 1);
        assert_eq!(&frames[1].payload[..], b"second");
        assert_eq!(decoder.buffered_len(), 0);
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn test_frame_decoder_rejects_oversized_header_early() {
        let mut decoder = FrameDecoder::new(MessageLimits::new().receive_max_bytes(4));
        decoder.extend(&[0x00, 0x00, 0x00, 0x00, 0x05]);
        assert!(matches!(
            decoder.decode(),
            Err(CodecError::MessageTooLarge { length: 5, limit: 4 })
        ));
    }

    #[test]
    fn test_frame_decoder_finish_with_partial_frame() {
        let mut decoder = FrameDecoder::default();
        decoder.extend(&[0x00, 0x00]);
        assert!(decoder.decode().unwrap().is_none());
        assert!(matches!(decoder.finish(), Err(CodecError::UnexpectedEof)));
    }
}
