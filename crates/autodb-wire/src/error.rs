//! Error types for the wire crate.

use thiserror::Error;

/// Transport-level errors from the frame codec.
#[derive(Debug, Error)]
pub enum WireError {
    /// The stream closed before a complete frame was read.
    #[error("stream closed before a complete frame was read")]
    ShortRead,

    /// A read deadline elapsed before a complete frame arrived.
    #[error("timed out waiting for a frame")]
    Timeout,

    /// Writing a frame to the stream failed.
    #[error("failed to write frame: {0}")]
    WriteFailed(#[source] std::io::Error),

    /// The payload does not fit the 24-bit length field.
    #[error("frame payload of {0} bytes exceeds the protocol limit")]
    PayloadTooLarge(usize),
}
