use rustc_hash::FxHashMap;

use crate::error::ViewerError;
use crate::message::ServerMessage;
use crate::transport::ViewerTransport;

/// Live viewer connections, keyed by the same `conn_id` used by
/// [`worldmap_tiles::ClientStateManager`]. Separate from that state
/// manager because a transport is a live resource (closed on drop) while
/// `ClientState` is plain data that survives a disconnect for the
/// reconnect grace period.
#[derive(Default)]
pub struct ViewerRegistry {
    transports: FxHashMap<u64, Box<dyn ViewerTransport>>,
}

impl ViewerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, conn_id: u64, transport: Box<dyn ViewerTransport>) {
        self.transports.insert(conn_id, transport);
    }

    pub fn remove(&mut self, conn_id: u64) -> Option<Box<dyn ViewerTransport>> {
        self.transports.remove(&conn_id)
    }

    pub fn conn_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.transports.keys().copied()
    }

    pub async fn send(&mut self, conn_id: u64, message: ServerMessage) -> Result<(), ViewerError> {
        match self.transports.get_mut(&conn_id) {
            Some(transport) => transport.send(message).await,
            None => Err(ViewerError::Disconnected(conn_id)),
        }
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}
