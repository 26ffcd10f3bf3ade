use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("viewer {0} write timed out")]
    WriteTimeout(u64),
    #[error("viewer {0} disconnected")]
    Disconnected(u64),
}
