//! The tile service's viewer-facing half: the chunk-processing/caching/
//! batching pipeline wired to a tick-driven fan-out loop over live viewer
//! transports.

mod error;
mod fanout;
mod message;
mod registry;
mod tcp;
mod transport;

pub use error::ViewerError;
pub use fanout::FanOutLoop;
pub use message::{ClientMessage, ServerMessage};
pub use registry::ViewerRegistry;
pub use tcp::{accept_loop, bind, read_client_messages, TcpViewerTransport};
pub use transport::ViewerTransport;
