//! FMS Networking - wire codec, latency probe, and the WebSocket session

pub mod clock;
pub mod codec;
pub mod latency;
pub mod websocket;

pub use clock::{Clock, ManualClock, SystemClock};
pub use latency::LatencyProbe;
pub use websocket::{ConnectionManager, ConnectionSession, SessionUpdate, SocketEvent, Transport};
