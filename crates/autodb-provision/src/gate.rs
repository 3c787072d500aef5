//! The provisioning gate implementation.

use std::time::Duration;

use async_trait::async_trait;
use autodb_core::{AdminConfig, SchemaName, UpstreamConfig};
use sqlx::{Connection, MySqlConnection};
use tokio::time::timeout;

use crate::error::ProvisionError;

/// Bound on connect, liveness probe, and each administrative query.
const ADMIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Ensures a named schema exists upstream before traffic proceeds.
///
/// The trait seam exists so the relay can be exercised against a recording
/// or failing implementation without a live server.
#[async_trait]
pub trait SchemaProvisioner: Send + Sync {
    /// Validate `name` and make sure the schema exists on the upstream
    /// server, creating it if absent.
    async fn ensure_schema(&self, name: &str) -> Result<(), ProvisionError>;
}

/// The real gate: one fresh administrative connection per call.
pub struct ProvisioningGate {
    upstream: UpstreamConfig,
    admin: AdminConfig,
}

impl ProvisioningGate {
    /// Create a gate for the given upstream and operator identity.
    pub fn new(upstream: UpstreamConfig, admin: AdminConfig) -> Self {
        Self { upstream, admin }
    }

    /// Probe liveness, check the schema catalog, create if absent.
    ///
    /// Runs on an already-open connection; the caller owns connect and
    /// close so the connection is released on every path.
    async fn ensure_on(
        conn: &mut MySqlConnection,
        schema: &SchemaName,
    ) -> Result<(), ProvisionError> {
        timeout(ADMIN_TIMEOUT, conn.ping())
            .await
            .map_err(|_| ProvisionError::UpstreamUnreachable("liveness probe timed out".into()))?
            .map_err(|e| ProvisionError::UpstreamUnreachable(e.to_string()))?;

        // Parameterized existence check; the name is never concatenated
        // into this query.
        let exists: i64 = timeout(
            ADMIN_TIMEOUT,
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM information_schema.SCHEMATA WHERE SCHEMA_NAME = ?",
            )
            .bind(schema.as_str())
            .fetch_one(&mut *conn),
        )
        .await
        .map_err(|_| ProvisionError::QueryFailed {
            schema: schema.to_string(),
            reason: "existence check timed out".into(),
        })?
        .map_err(|e| ProvisionError::QueryFailed {
            schema: schema.to_string(),
            reason: e.to_string(),
        })?;

        if exists > 0 {
            tracing::debug!(schema = %schema, "schema already exists");
            return Ok(());
        }

        // The one place the name is embedded in statement text, as a
        // back-tick-quoted identifier. Safe only because validation has
        // already restricted it to [A-Za-z0-9_-]+.
        let statement = format!("CREATE DATABASE IF NOT EXISTS `{}`", schema.as_str());
        timeout(ADMIN_TIMEOUT, sqlx::query(&statement).execute(&mut *conn))
            .await
            .map_err(|_| ProvisionError::CreateFailed {
                schema: schema.to_string(),
                reason: "creation timed out".into(),
            })?
            .map_err(|e| ProvisionError::CreateFailed {
                schema: schema.to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(schema = %schema, "created schema");
        Ok(())
    }
}

#[async_trait]
impl SchemaProvisioner for ProvisioningGate {
    async fn ensure_schema(&self, name: &str) -> Result<(), ProvisionError> {
        let schema = SchemaName::new(name)?;

        let url = self.admin.connection_url(&self.upstream);
        let mut conn = timeout(ADMIN_TIMEOUT, MySqlConnection::connect(&url))
            .await
            .map_err(|_| {
                ProvisionError::UpstreamUnreachable(format!(
                    "connect to {} timed out",
                    self.upstream.addr()
                ))
            })?
            .map_err(|e| ProvisionError::UpstreamUnreachable(e.to_string()))?;

        let result = Self::ensure_on(&mut conn, &schema).await;

        // The administrative connection is closed on success and failure
        // alike; a close error cannot change the outcome of the call.
        if let Err(e) = conn.close().await {
            tracing::debug!(error = %e, "error closing administrative connection");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_gate() -> ProvisioningGate {
        // A host that is never dialed when validation fails first.
        ProvisioningGate::new(
            UpstreamConfig {
                host: "mysql.invalid".to_string(),
                port: 1,
            },
            AdminConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_invalid_name_never_dials_upstream() {
        let gate = unreachable_gate();

        // Completes immediately with InvalidName: a network attempt against
        // the unreachable host would hit the connect path instead.
        let err = gate.ensure_schema("information_schema").await.unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidName(_)));

        let err = gate.ensure_schema("bad name!").await.unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidName(_)));

        let err = gate.ensure_schema("").await.unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_reported() {
        let gate = ProvisioningGate::new(
            UpstreamConfig {
                host: "127.0.0.1".to_string(),
                port: 1, // nothing listens here
            },
            AdminConfig::default(),
        );

        let err = gate.ensure_schema("svc_a").await.unwrap_err();
        assert!(matches!(err, ProvisionError::UpstreamUnreachable(_)));
    }
}
