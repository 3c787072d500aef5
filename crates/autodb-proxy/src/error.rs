//! Error types for the relay crate.

use autodb_provision::ProvisionError;
use autodb_wire::WireError;
use thiserror::Error;

/// Errors that can occur in the relay.
///
/// All of these are per-session (or bind-time) failures; none of them stop
/// the accept loop once it is running.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Failed to bind to the listen address.
    #[error("failed to bind to {address}: {source}")]
    BindFailed {
        address: String,
        source: std::io::Error,
    },

    /// Failed to connect to the upstream server.
    #[error("failed to connect to upstream {address}: {source}")]
    UpstreamConnectFailed {
        address: String,
        source: std::io::Error,
    },

    /// Upstream connection attempt exceeded its deadline.
    #[error("timed out connecting to upstream {address}")]
    UpstreamConnectTimeout { address: String },

    /// Transport error during the handshake phase.
    #[error("handshake transport error: {0}")]
    Wire(#[from] WireError),

    /// The provisioning gate rejected or failed the handshake schema.
    #[error(transparent)]
    Provision(#[from] ProvisionError),
}
