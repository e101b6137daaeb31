//! Per-connection handler: join, then input routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `join` within the join timeout, or answer 400 and close
//!   2. Ask the engine for a seat, or answer 409 and close
//!   3. Spawn a writer that drains the seat's outbound channel
//!   4. Loop: receive frames and forward moves to the engine
//!
//! The writer stops when the engine drops the seat's sender, which
//! happens when the match ends or the slot is taken over by a newer
//! connection.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};
use volley_protocol::{
    ClientMessage, Codec, ProtocolError, ServerMessage, SessionId, error_code,
};
use volley_session::ConnectionHandle;
use volley_transport::{Connection, ConnectionId, WebSocketConnection};

use crate::VolleyError;
use crate::engine::EngineHandle;

/// Reports the connection lost when the handler exits, however it exits.
struct SeatGuard {
    session_id: SessionId,
    conn_id: ConnectionId,
    engine: EngineHandle,
}

impl Drop for SeatGuard {
    fn drop(&mut self) {
        let _ = self.engine.disconnect(self.session_id, self.conn_id);
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: WebSocketConnection,
    engine: EngineHandle,
    codec: C,
    join_timeout: Duration,
) -> Result<(), VolleyError>
where
    C: Codec + Clone,
{
    let conn_id = conn.id();
    debug!(%conn_id, "handling new connection");

    // --- Step 1: join ---
    let (identity, resume) = match await_join(&conn, &codec, join_timeout).await {
        Ok(join) => join,
        Err(e) => {
            send_error(&conn, &codec, error_code::MALFORMED, &e.to_string()).await?;
            let _ = conn.close().await;
            return Err(e);
        }
    };

    // --- Step 2: seat ---
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let handle = ConnectionHandle::new(conn_id, outbound_tx);
    let seat = match engine.join(handle, identity.as_str(), resume).await {
        Ok(seat) => seat,
        Err(VolleyError::Session(e)) => {
            send_error(&conn, &codec, error_code::REJECTED, &e.to_string()).await?;
            let _ = conn.close().await;
            return Err(e.into());
        }
        Err(e) => return Err(e),
    };
    let _guard = SeatGuard {
        session_id: seat.session_id,
        conn_id,
        engine: engine.clone(),
    };
    info!(
        %conn_id,
        %identity,
        session_id = %seat.session_id,
        slot = %seat.slot,
        reconnected = seat.reconnected,
        "player seated"
    );

    // --- Step 3: writer ---
    let conn = Arc::new(conn);
    let mut writer = tokio::spawn(write_outbound(Arc::clone(&conn), codec.clone(), outbound_rx));

    // --- Step 4: input loop ---
    let reader = async {
        loop {
            let data = match conn.recv().await {
                Ok(Some(data)) => data,
                Ok(None) => {
                    info!(%conn_id, %identity, "connection closed");
                    break;
                }
                Err(e) => {
                    debug!(%conn_id, error = %e, "recv error");
                    break;
                }
            };

            match codec.decode::<ClientMessage>(&data) {
                Ok(ClientMessage::Move { direction }) => {
                    if engine.send_move(seat.session_id, conn_id, direction).is_err() {
                        break;
                    }
                }
                Ok(ClientMessage::Join { .. }) => {
                    debug!(%conn_id, "join from seated connection ignored");
                }
                Err(e) => {
                    debug!(%conn_id, error = %e, "malformed frame ignored");
                }
            }
        }
    };

    tokio::select! {
        _ = reader => {}
        _ = &mut writer => {
            debug!(%conn_id, "outbound channel closed");
        }
    }
    writer.abort();

    // _guard drops here → engine hears about the disconnect.
    Ok(())
}

/// Waits for the first frame and checks that it is a valid `join`.
async fn await_join<C: Codec>(
    conn: &WebSocketConnection,
    codec: &C,
    join_timeout: Duration,
) -> Result<(String, Option<SessionId>), VolleyError> {
    let data = match tokio::time::timeout(join_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage("connection closed before join".into()).into());
        }
        Ok(Err(e)) => return Err(VolleyError::Transport(e)),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage("join timed out".into()).into());
        }
    };

    let msg: ClientMessage = codec.decode(&data)?;
    msg.validate()?;
    match msg {
        ClientMessage::Join {
            identity,
            resume_session_id,
        } => Ok((identity, resume_session_id)),
        ClientMessage::Move { .. } => {
            Err(ProtocolError::InvalidMessage("first message must be join".into()).into())
        }
    }
}

/// Drains `outbound` onto the socket, then closes it.
async fn write_outbound<C: Codec>(
    conn: Arc<WebSocketConnection>,
    codec: C,
    mut outbound: mpsc::UnboundedReceiver<ServerMessage>,
) {
    let conn_id = conn.id();
    while let Some(msg) = outbound.recv().await {
        let bytes = match codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(%conn_id, error = %e, "failed to encode server message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            debug!(%conn_id, error = %e, "send failed, dropping connection");
            return;
        }
    }
    let _ = conn.close().await;
}

/// Sends an `error` message straight to the socket.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    code: u16,
    message: &str,
) -> Result<(), VolleyError> {
    let bytes = codec.encode(&ServerMessage::error(code, message))?;
    conn.send(&bytes).await?;
    Ok(())
}
