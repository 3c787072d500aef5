//! Per-connection relay session.
//!
//! One session shuttles frames between a single client and the upstream
//! server. The lifecycle is a straight line:
//!
//! `Dialing → GreetingForwarded → HandshakeGated → Relaying → Closed`
//!
//! with a terminal `Failed` reachable from any state. The handshake phase
//! is the only place the relay refuses to forward: a schema name extracted
//! from the client's handshake response must clear the provisioning gate
//! before the response goes upstream. Once relaying starts, interception is
//! advisory — a gate failure is logged and the frame forwarded anyway, so
//! the real server stays the authority for reporting misuse.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use autodb_provision::SchemaProvisioner;
use autodb_wire::{
    Frame, WireError, extract_schema, read_frame, read_frame_timeout, schema_from_command,
    write_frame,
};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use uuid::Uuid;

use crate::error::RelayError;

/// Per-operation deadlines for one session.
#[derive(Debug, Clone, Copy)]
pub struct SessionTimeouts {
    /// Bound on the upstream TCP connect.
    pub connect: Duration,
    /// Per-frame read deadline during the handshake phase.
    pub handshake_io: Duration,
    /// How long to wait for upstream's reply to the handshake response
    /// before acknowledging the client ourselves.
    pub reply_wait: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            handshake_io: Duration::from_secs(30),
            reply_wait: Duration::from_secs(5),
        }
    }
}

/// Lifecycle state of a relay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Opening the upstream connection.
    Dialing,
    /// Upstream's greeting frame has been relayed to the client.
    GreetingForwarded,
    /// The client's handshake response is being gated.
    HandshakeGated,
    /// Unrestricted duplex copying with client-leg interception.
    Relaying,
    /// Both directional copies returned; sockets released.
    Closed,
    /// Terminal failure; the session ended without completing.
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Dialing => "dialing",
            SessionState::GreetingForwarded => "greeting_forwarded",
            SessionState::HandshakeGated => "handshake_gated",
            SessionState::Relaying => "relaying",
            SessionState::Closed => "closed",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One client/upstream pair and everything needed to shuttle between them.
///
/// Owned exclusively by the task handling its connection; nothing in here
/// is shared with other sessions except the provisioning gate handle.
pub struct RelaySession {
    connection_id: String,
    client_addr: String,
    upstream_addr: String,
    gate: Arc<dyn SchemaProvisioner>,
    timeouts: SessionTimeouts,
    state: SessionState,
    /// Schema observed on the wire: set from the handshake, possibly once
    /// more from in-session interception.
    schema: Option<String>,
}

/// Minimal success acknowledgment: OK header, zero affected rows and
/// insert id, autocommit status flag, zero warnings.
fn ok_frame(sequence: u8) -> Frame {
    Frame {
        sequence,
        payload: vec![0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00],
    }
}

impl RelaySession {
    /// Create a session for an accepted client connection.
    pub fn new(
        client_addr: String,
        upstream_addr: String,
        gate: Arc<dyn SchemaProvisioner>,
        timeouts: SessionTimeouts,
    ) -> Self {
        Self {
            connection_id: Uuid::new_v4().to_string(),
            client_addr,
            upstream_addr,
            gate,
            timeouts,
            state: SessionState::Dialing,
            schema: None,
        }
    }

    /// The session's unique id.
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// Address of the connected client.
    pub fn client_addr(&self) -> &str {
        &self.client_addr
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Schema name observed on the wire, if any.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Dial the upstream server and run the session to completion.
    ///
    /// On failure the client connection is simply dropped — the client
    /// observes a reset or EOF, never a half-gated handshake.
    pub async fn run(&mut self, client: TcpStream) -> Result<(), RelayError> {
        self.transition(SessionState::Dialing);

        let upstream = match timeout(self.timeouts.connect, TcpStream::connect(&self.upstream_addr))
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                self.state = SessionState::Failed;
                return Err(RelayError::UpstreamConnectFailed {
                    address: self.upstream_addr.clone(),
                    source: e,
                });
            }
            Err(_) => {
                self.state = SessionState::Failed;
                return Err(RelayError::UpstreamConnectTimeout {
                    address: self.upstream_addr.clone(),
                });
            }
        };

        self.run_with_streams(client, upstream).await
    }

    /// Run the session over already-established streams.
    ///
    /// Split out from [`run`](Self::run) so the handshake gating and relay
    /// behavior can be driven over any stream pair.
    pub async fn run_with_streams<C, U>(
        &mut self,
        client: C,
        upstream: U,
    ) -> Result<(), RelayError>
    where
        C: AsyncRead + AsyncWrite + Unpin,
        U: AsyncRead + AsyncWrite + Unpin,
    {
        let result = self.drive(client, upstream).await;
        if result.is_err() {
            self.transition(SessionState::Failed);
        }
        result
    }

    async fn drive<C, U>(&mut self, mut client: C, mut upstream: U) -> Result<(), RelayError>
    where
        C: AsyncRead + AsyncWrite + Unpin,
        U: AsyncRead + AsyncWrite + Unpin,
    {
        // Server speaks first: relay its greeting verbatim.
        let greeting = read_frame_timeout(&mut upstream, self.timeouts.handshake_io).await?;
        write_frame(&mut client, &greeting).await?;
        self.transition(SessionState::GreetingForwarded);

        // The client's handshake response is the gated frame: it must not
        // reach the upstream until any schema it names exists there.
        let response = read_frame_timeout(&mut client, self.timeouts.handshake_io).await?;
        self.transition(SessionState::HandshakeGated);

        if let Some(schema) = extract_schema(&response.payload) {
            tracing::info!(
                connection_id = %self.connection_id,
                client = %self.client_addr,
                schema = %schema,
                "client requested schema"
            );
            self.gate.ensure_schema(&schema).await?;
            self.schema = Some(schema);
        } else {
            tracing::debug!(
                connection_id = %self.connection_id,
                client = %self.client_addr,
                "no schema named in handshake"
            );
        }

        write_frame(&mut upstream, &response).await?;

        // A slow upstream reply is absorbed rather than propagated: the
        // client gets a synthesized acknowledgment so it is never left
        // hanging, trading strict protocol fidelity for availability.
        match read_frame_timeout(&mut upstream, self.timeouts.reply_wait).await {
            Ok(reply) => write_frame(&mut client, &reply).await?,
            Err(WireError::Timeout) => {
                tracing::warn!(
                    connection_id = %self.connection_id,
                    client = %self.client_addr,
                    "upstream reply timed out, acknowledging handshake ourselves"
                );
                write_frame(&mut client, &ok_frame(response.sequence.wrapping_add(1))).await?;
            }
            Err(e) => return Err(e.into()),
        }

        self.transition(SessionState::Relaying);
        let observed = self.relay(client, upstream).await;
        if observed.is_some() {
            self.schema = observed;
        }

        self.transition(SessionState::Closed);
        Ok(())
    }

    /// Duplex copy phase. Client→upstream goes frame-by-frame through the
    /// command classifier; upstream→client is a raw byte copy. Each
    /// direction half-closes its peer on exit so the other side drains,
    /// and both are joined before the session is considered closed.
    async fn relay<C, U>(&mut self, client: C, upstream: U) -> Option<String>
    where
        C: AsyncRead + AsyncWrite + Unpin,
        U: AsyncRead + AsyncWrite + Unpin,
    {
        let (mut client_read, mut client_write) = tokio::io::split(client);
        let (mut upstream_read, mut upstream_write) = tokio::io::split(upstream);

        let gate = Arc::clone(&self.gate);
        let connection_id = self.connection_id.clone();
        let client_addr = self.client_addr.clone();

        let client_to_upstream = async move {
            let mut observed = None;
            loop {
                let frame = match read_frame(&mut client_read).await {
                    Ok(frame) => frame,
                    Err(_) => break,
                };

                if let Some(schema) = schema_from_command(&frame.payload) {
                    tracing::info!(
                        connection_id = %connection_id,
                        client = %client_addr,
                        schema = %schema,
                        "schema selection intercepted"
                    );
                    match gate.ensure_schema(&schema).await {
                        Ok(()) => observed = Some(schema),
                        // Forwarded anyway: the real server reports its own
                        // error for a name we could not provision.
                        Err(e) => tracing::warn!(
                            connection_id = %connection_id,
                            client = %client_addr,
                            schema = %schema,
                            error = %e,
                            "provisioning failed during relay"
                        ),
                    }
                }

                if write_frame(&mut upstream_write, &frame).await.is_err() {
                    break;
                }
            }
            let _ = upstream_write.shutdown().await;
            observed
        };

        let upstream_to_client = async move {
            let _ = tokio::io::copy(&mut upstream_read, &mut client_write).await;
            let _ = client_write.shutdown().await;
        };

        let (observed, ()) = tokio::join!(client_to_upstream, upstream_to_client);
        observed
    }

    fn transition(&mut self, state: SessionState) {
        self.state = state;
        tracing::debug!(
            connection_id = %self.connection_id,
            client = %self.client_addr,
            state = %state,
            "session state"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_frame_shape() {
        let frame = ok_frame(3);
        assert_eq!(frame.sequence, 3);
        assert_eq!(frame.payload[0], 0x00);
        assert_eq!(frame.payload.len(), 7);
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = SessionTimeouts::default();
        assert_eq!(timeouts.connect, Duration::from_secs(10));
        assert_eq!(timeouts.handshake_io, Duration::from_secs(30));
        assert_eq!(timeouts.reply_wait, Duration::from_secs(5));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::HandshakeGated.to_string(), "handshake_gated");
        assert_eq!(SessionState::Failed.to_string(), "failed");
    }
}
