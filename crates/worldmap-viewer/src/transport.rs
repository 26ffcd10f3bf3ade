use async_trait::async_trait;

use crate::error::ViewerError;
use crate::message::ServerMessage;

/// One viewer's outbound connection, abstracted so the fan-out loop is
/// testable without a real socket. Grounded on
/// `valence_network::packet_io::PacketIo`'s send half: a single `send`
/// suspension point per message, with the connection considered dead after
/// any error.
#[async_trait]
pub trait ViewerTransport: Send {
    async fn send(&mut self, message: ServerMessage) -> Result<(), ViewerError>;
}
