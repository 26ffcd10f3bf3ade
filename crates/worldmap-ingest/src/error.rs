use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("upstream connection failed: {0}")]
    Connect(String),
    #[error("upstream connection lost: {0}")]
    Disconnected(String),
    #[error("event channel to the tile service closed")]
    ChannelClosed,
}
