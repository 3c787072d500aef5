//! # autodb-provision
//!
//! The provisioning gate: given a schema name extracted from the wire,
//! validate it and make sure it exists on the upstream server before the
//! relay lets traffic flow.
//!
//! Every call opens its own short-lived administrative connection with the
//! configured operator identity and closes it before returning — no
//! pooling, no sharing across sessions. Concurrent calls for the same name
//! are not coordinated; the upstream's `CREATE DATABASE IF NOT EXISTS`
//! idempotency absorbs the race.

pub mod error;
pub mod gate;

pub use error::ProvisionError;
pub use gate::{ProvisioningGate, SchemaProvisioner};
