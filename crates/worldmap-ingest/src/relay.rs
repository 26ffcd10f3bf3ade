use async_trait::async_trait;

use crate::error::IngestError;
use crate::packet::UpstreamPacket;

/// The upstream game session, abstracted so the session loop is testable
/// without a real relay connection. Grounded on
/// `valence_server::client::ClientConnection`'s split connect/try_recv
/// shape, inverted since here we dial out rather than accept.
#[async_trait]
pub trait UpstreamRelay: Send {
    /// Establishes (or re-establishes) the upstream connection.
    async fn connect(&mut self) -> Result<(), IngestError>;

    /// Awaits the next decoded packet. Returns `Err` on disconnect; the
    /// session loop treats that as a signal to reconnect.
    async fn recv(&mut self) -> Result<UpstreamPacket, IngestError>;
}
