//! Per-connection handler: decodes inbound frames into client events,
//! feeds them to the session layer, and pumps outbound events back
//! onto the socket.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info};

use attune_protocol::{
    ClientEvent, Codec, ConnectionId, JsonCodec, ServerEvent,
};
use attune_session::SessionHandle;

use crate::ServerError;

/// Drop guard that reports the disconnect even when the handler
/// unwinds early. `Drop` is synchronous, so the session call is
/// spawned as a fire-and-forget task.
struct DisconnectGuard {
    id: ConnectionId,
    sessions: SessionHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let id = self.id;
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            sessions.disconnect(id).await;
        });
    }
}

/// Handles one connection from WebSocket handshake to close.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    id: ConnectionId,
    sessions: SessionHandle,
) -> Result<(), ServerError> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    info!(connection = %id, %peer, "connection accepted");

    let (mut writer, mut reader) = ws.split();
    let codec = JsonCodec;

    // Outbound pump: session events flow through this channel onto the
    // socket as text frames. The pump ends once the session layer
    // drops the sender on disconnect.
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    sessions.connect(id, tx).await;
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let bytes = match codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(err) => {
                    error!(connection = %id, %err, "outbound encode failed");
                    continue;
                }
            };
            let Ok(text) = String::from_utf8(bytes) else { continue };
            if writer.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = writer.close().await;
    });

    let _guard = DisconnectGuard { id, sessions: sessions.clone() };

    while let Some(message) = reader.next().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                debug!(connection = %id, %err, "socket error");
                break;
            }
        };
        let data = match &message {
            Message::Text(text) => text.as_bytes(),
            Message::Binary(data) => data.as_ref(),
            Message::Close(_) => break,
            _ => continue,
        };
        match codec.decode::<ClientEvent>(data) {
            Ok(event) => sessions.handle_event(id, event).await,
            Err(err) => {
                debug!(connection = %id, %err, "malformed frame ignored");
            }
        }
    }

    info!(connection = %id, "connection closed");
    Ok(())
}
