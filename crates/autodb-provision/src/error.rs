//! Error types for the provisioning crate.

use autodb_core::SchemaNameError;
use thiserror::Error;

/// Errors from a provisioning attempt. Terminal for that attempt; the gate
/// never retries on its own.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The requested name failed validation; the upstream was not contacted.
    #[error("invalid schema name: {0}")]
    InvalidName(#[from] SchemaNameError),

    /// The administrative connection or its liveness probe failed.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The schema-catalog existence check failed.
    #[error("failed to check schema '{schema}': {reason}")]
    QueryFailed { schema: String, reason: String },

    /// The creation statement failed.
    #[error("failed to create schema '{schema}': {reason}")]
    CreateFailed { schema: String, reason: String },
}
