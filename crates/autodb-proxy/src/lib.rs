//! # autodb-proxy
//!
//! Transparent MySQL relay that guarantees a client-requested schema exists
//! upstream before the client's traffic reaches the real server.
//!
//! ## Architecture
//!
//! ```text
//! MySQL client
//!       │
//!       │ framed wire protocol
//!       ▼
//! ┌──────────────────┐
//! │  AutoDB relay    │
//! │  1. Forward      │  ← upstream greeting, verbatim
//! │     greeting     │
//! │  2. Extract      │  ← autodb-wire
//! │     schema name  │
//! │  3. Provision    │  ← autodb-provision
//! │  4. Forward      │
//! │     handshake    │
//! │  5. Duplex copy  │  ← `USE` interception on the client leg
//! └────────┬─────────┘
//!          │
//!          ▼
//!    Upstream MySQL
//! ```
//!
//! Apart from the handshake gate and one synthesized acknowledgment on a
//! slow upstream reply, bytes pass through unmodified and unbuffered; the
//! relay never splits or merges frames.

pub mod error;
pub mod proxy;
pub mod session;

pub use error::RelayError;
pub use proxy::AutoDbProxy;
pub use session::{RelaySession, SessionState, SessionTimeouts};
