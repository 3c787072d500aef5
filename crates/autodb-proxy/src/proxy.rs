//! Accept loop for the relay.

use std::sync::Arc;

use autodb_core::AutoDbConfig;
use autodb_provision::{ProvisioningGate, SchemaProvisioner};
use tokio::net::TcpListener;

use crate::error::RelayError;
use crate::session::{RelaySession, SessionTimeouts};

/// The relay server: binds one listening socket and runs a task per
/// accepted client connection.
pub struct AutoDbProxy {
    config: AutoDbConfig,
    gate: Arc<dyn SchemaProvisioner>,
}

impl AutoDbProxy {
    /// Create a relay with the real provisioning gate.
    pub fn new(config: AutoDbConfig) -> Self {
        let gate = Arc::new(ProvisioningGate::new(
            config.upstream.clone(),
            config.admin.clone(),
        ));
        Self { config, gate }
    }

    /// Create a relay with a custom provisioner.
    pub fn with_provisioner(config: AutoDbConfig, gate: Arc<dyn SchemaProvisioner>) -> Self {
        Self { config, gate }
    }

    /// Get a reference to the relay configuration.
    pub fn config(&self) -> &AutoDbConfig {
        &self.config
    }

    /// Run the accept loop.
    ///
    /// Individual session failures are logged and never stop the loop;
    /// only a failed bind is fatal.
    pub async fn run(&self) -> Result<(), RelayError> {
        let listen_addr = self.config.listen.bind_addr();
        let upstream_addr = self.config.upstream.addr();

        tracing::info!(
            listen_addr = %listen_addr,
            upstream = %upstream_addr,
            "starting AutoDB relay"
        );

        let listener = TcpListener::bind(&listen_addr)
            .await
            .map_err(|e| RelayError::BindFailed {
                address: listen_addr.clone(),
                source: e,
            })?;

        tracing::info!(address = %listen_addr, "relay listening");

        loop {
            let (socket, peer_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            tracing::info!(client = %peer_addr, "new connection");

            let mut session = RelaySession::new(
                peer_addr.to_string(),
                upstream_addr.clone(),
                Arc::clone(&self.gate),
                SessionTimeouts::default(),
            );

            tokio::spawn(async move {
                match session.run(socket).await {
                    Ok(()) => tracing::info!(
                        client = %session.client_addr(),
                        schema = session.schema().unwrap_or(""),
                        "connection closed"
                    ),
                    Err(e) => tracing::error!(
                        client = %session.client_addr(),
                        error = %e,
                        "session failed"
                    ),
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_creation() {
        let config = AutoDbConfig::default();
        let proxy = AutoDbProxy::new(config);
        assert_eq!(proxy.config().listen.port, 3308);
        assert_eq!(proxy.config().upstream.addr(), "localhost:3306");
    }
}
