use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::error::IngestError;
use crate::packet::UpstreamPacket;
use crate::relay::UpstreamRelay;

/// An [`UpstreamRelay`] that speaks newline-delimited JSON over TCP.
///
/// The upstream relay/decoder library itself is an external collaborator
/// (§1); this assumes whatever sits on the other end of `host:port` has
/// already done protocol decoding and simply emits one JSON-encoded
/// [`UpstreamPacket`] per line, per §6.2's "any framing as long as
/// ordering and atomicity per record are preserved."
pub struct TcpUpstreamRelay {
    host: String,
    port: u16,
    reader: Option<BufReader<tokio::net::tcp::OwnedReadHalf>>,
    writer: Option<tokio::net::tcp::OwnedWriteHalf>,
}

impl TcpUpstreamRelay {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port, reader: None, writer: None }
    }
}

#[async_trait]
impl UpstreamRelay for TcpUpstreamRelay {
    async fn connect(&mut self) -> Result<(), IngestError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| IngestError::Connect(e.to_string()))?;
        stream.set_nodelay(true).map_err(|e| IngestError::Connect(e.to_string()))?;
        let (read_half, write_half) = stream.into_split();
        self.reader = Some(BufReader::new(read_half));
        self.writer = Some(write_half);
        Ok(())
    }

    async fn recv(&mut self) -> Result<UpstreamPacket, IngestError> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| IngestError::Disconnected("not connected".to_owned()))?;

        let mut line = String::new();
        let n = reader
            .read_line(&mut line)
            .await
            .map_err(|e| IngestError::Disconnected(e.to_string()))?;
        if n == 0 {
            return Err(IngestError::Disconnected("upstream closed connection".to_owned()));
        }

        serde_json::from_str(line.trim_end())
            .map_err(|e| IngestError::Disconnected(format!("malformed upstream record: {e}")))
    }
}

impl TcpUpstreamRelay {
    /// Sends a `player_auth_input`-equivalent serverbound record. Exposed
    /// separately from [`UpstreamRelay`] since the trait only models the
    /// inbound half the session loop needs.
    pub async fn send_raw(&mut self, line: &str) -> Result<(), IngestError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| IngestError::Disconnected("not connected".to_owned()))?;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| IngestError::Disconnected(e.to_string()))?;
        writer.write_all(b"\n").await.map_err(|e| IngestError::Disconnected(e.to_string()))
    }
}
