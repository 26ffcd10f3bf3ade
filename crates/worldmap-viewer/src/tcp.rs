use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::mpsc::Sender;
use tokio::time;
use tracing::{debug, error, warn};

use crate::error::ViewerError;
use crate::message::{ClientMessage, ServerMessage};
use crate::transport::ViewerTransport;

/// Socket-level write timeout (§5: "a viewer write that does not complete
/// within a socket-level timeout terminates that connection"). Not itself a
/// `TileConfig` knob (§6.5), so it lives here as an ambient constant.
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// A [`ViewerTransport`] that speaks newline-delimited JSON over TCP, per
/// §6.3 (framing is left to the implementation). Grounded on
/// `valence_network::connect::do_accept_loop`'s pattern of one task per
/// accepted connection.
pub struct TcpViewerTransport {
    conn_id: u64,
    writer: OwnedWriteHalf,
}

#[async_trait]
impl ViewerTransport for TcpViewerTransport {
    async fn send(&mut self, message: ServerMessage) -> Result<(), ViewerError> {
        let line = serde_json::to_string(&message)
            .map_err(|_| ViewerError::Disconnected(self.conn_id))?;
        time::timeout(WRITE_TIMEOUT, self.writer.write_all(line.as_bytes()))
            .await
            .map_err(|_| ViewerError::WriteTimeout(self.conn_id))?
            .map_err(|_| ViewerError::WriteTimeout(self.conn_id))?;
        time::timeout(WRITE_TIMEOUT, self.writer.write_all(b"\n"))
            .await
            .map_err(|_| ViewerError::WriteTimeout(self.conn_id))?
            .map_err(|_| ViewerError::WriteTimeout(self.conn_id))
    }
}

/// One accepted connection's read half, handed back to the caller so it can
/// log/ignore inbound [`ClientMessage`]s -- none of which have a required
/// server-side effect per §6.3.
pub async fn read_client_messages(stream: OwnedReadHalf, conn_id: u64) {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => return,
            Ok(_) => match serde_json::from_str::<ClientMessage>(line.trim_end()) {
                Ok(message) => debug!(conn_id, ?message, "client message received"),
                Err(e) => warn!(conn_id, error = %e, "malformed client message, ignoring"),
            },
            Err(e) => {
                warn!(conn_id, error = %e, "viewer read failed");
                return;
            }
        }
    }
}

/// Accepts viewer connections on `listener` forever, handing each split
/// stream to `new_conns` as `(conn_id, write_half_transport, read_half)`.
/// `conn_id` is assigned here, starting from `next_conn_id`, so both the
/// transport's error reporting and the caller's bookkeeping agree on it.
pub async fn accept_loop(
    listener: TcpListener,
    new_conns: Sender<(u64, TcpViewerTransport, OwnedReadHalf)>,
    mut next_conn_id: u64,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    warn!(%addr, error = %e, "failed to set TCP_NODELAY");
                }
                let (read_half, write_half) = stream.into_split();
                let conn_id = next_conn_id;
                let transport = TcpViewerTransport { conn_id, writer: write_half };
                next_conn_id += 1;
                if new_conns.send((conn_id, transport, read_half)).await.is_err() {
                    return;
                }
            }
            Err(e) => error!(error = %e, "failed to accept viewer connection"),
        }
    }
}

pub async fn bind(addr: impl tokio::net::ToSocketAddrs) -> std::io::Result<TcpListener> {
    TcpListener::bind(addr).await
}
