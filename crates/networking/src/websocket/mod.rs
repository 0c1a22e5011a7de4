//! WebSocket connection to the FMS backend
//!
//! `ConnectionManager` holds the lifecycle and reconnect policy without doing
//! any IO, `ConnectionSession` ties it to a `Transport` and the latency
//! probe, and `WsTransport` is the tokio-tungstenite implementation.

mod event;
mod manager;
mod session;
mod transport;

pub use event::SocketEvent;
pub use manager::{ConnectionManager, ScheduledTask, RECONNECT_DELAY};
pub use session::{ConnectionSession, SendOutcome, SessionUpdate};
pub use transport::{frame_to_event, TaggedEvent, Transport, WsTransport};

pub use fms_core::{ConnectionId, ConnectionState};
