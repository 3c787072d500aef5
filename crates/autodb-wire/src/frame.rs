//! Length-prefixed frame codec.
//!
//! One frame on the wire is a 4-byte header followed by the payload:
//!
//! ```text
//!   Payload    Sequence
//!    Length      Id        Payload
//! +-----------+--------+-------------+
//! | len <3>   | seq<1> |  len bytes  |
//! +-----------+--------+-------------+
//!   3 bytes     1 byte
//!   Little
//!   Endian
//! ```
//!
//! The codec reads and writes whole frames and never interprets payload
//! contents. Each call corresponds to exactly one frame; the relay never
//! splits or merges them.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::WireError;

/// Largest payload the 3-byte length field can describe.
pub const MAX_PAYLOAD_LEN: usize = 0xff_ffff;

/// Size of the frame header on the wire.
pub const HEADER_LEN: usize = 4;

/// One protocol frame: a sequence number and an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Sequence number from the 4th header byte.
    pub sequence: u8,
    /// Opaque payload bytes; the wire length field is derived from this.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Build a frame, rejecting payloads the length field cannot describe.
    pub fn new(sequence: u8, payload: Vec<u8>) -> Result<Self, WireError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(WireError::PayloadTooLarge(payload.len()));
        }
        Ok(Self { sequence, payload })
    }

    /// Encode the frame into its wire form (header + payload).
    pub fn encode(&self) -> Vec<u8> {
        let len = self.payload.len();
        let mut buf = Vec::with_capacity(HEADER_LEN + len);
        buf.push(len as u8);
        buf.push((len >> 8) as u8);
        buf.push((len >> 16) as u8);
        buf.push(self.sequence);
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Decode one frame from a buffer holding exactly its wire form.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < HEADER_LEN {
            return Err(WireError::ShortRead);
        }
        let len = usize::from(buf[0]) | usize::from(buf[1]) << 8 | usize::from(buf[2]) << 16;
        if buf.len() < HEADER_LEN + len {
            return Err(WireError::ShortRead);
        }
        Ok(Self {
            sequence: buf[3],
            payload: buf[HEADER_LEN..HEADER_LEN + len].to_vec(),
        })
    }
}

/// Read exactly one frame from `stream`.
///
/// Fails with [`WireError::ShortRead`] if the stream closes before the
/// header or the announced payload is complete.
pub async fn read_frame<R>(stream: &mut R) -> Result<Frame, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    stream
        .read_exact(&mut header)
        .await
        .map_err(|_| WireError::ShortRead)?;

    let len =
        usize::from(header[0]) | usize::from(header[1]) << 8 | usize::from(header[2]) << 16;

    let mut payload = vec![0u8; len];
    stream
        .read_exact(&mut payload)
        .await
        .map_err(|_| WireError::ShortRead)?;

    Ok(Frame {
        sequence: header[3],
        payload,
    })
}

/// Read one frame, failing with [`WireError::Timeout`] if `limit` elapses
/// before a complete frame has arrived.
pub async fn read_frame_timeout<R>(stream: &mut R, limit: Duration) -> Result<Frame, WireError>
where
    R: AsyncRead + Unpin,
{
    tokio::time::timeout(limit, read_frame(stream))
        .await
        .map_err(|_| WireError::Timeout)?
}

/// Write one frame to `stream` as a single logical write.
///
/// No retry on failure; the caller decides what a failed write means for
/// the session.
pub async fn write_frame<W>(stream: &mut W, frame: &Frame) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    let buf = frame.encode();
    stream.write_all(&buf).await.map_err(WireError::WriteFailed)?;
    stream.flush().await.map_err(WireError::WriteFailed)?;
    Ok(())
}
