//! # autodb-wire
//!
//! MySQL wire-level plumbing for the AutoDB relay:
//!
//! - [`frame`] — length-prefixed frame codec with no knowledge of payload
//!   contents
//! - [`handshake`] — best-effort extraction of the requested schema name
//!   from a client handshake-response payload
//! - [`command`] — hot-path classification of in-session `USE` commands
//!
//! The inspection functions never fail on malformed input: anything the
//! scanner cannot confidently parse yields `None`, and the relay forwards
//! the bytes untouched either way.

pub mod command;
pub mod error;
pub mod frame;
pub mod handshake;

pub use command::schema_from_command;
pub use error::WireError;
pub use frame::{Frame, read_frame, read_frame_timeout, write_frame};
pub use handshake::extract_schema;
