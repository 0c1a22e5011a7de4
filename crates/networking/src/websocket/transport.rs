//! Socket transport
//!
//! The session only talks to a `Transport`. `WsTransport` runs each
//! connection in its own task and reports back through one event channel;
//! tests substitute a recording fake.

use crate::codec;
use fms_core::{ConnectionId, Error, Result};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, info, warn};

use super::SocketEvent;

/// Event as delivered to the event loop
pub type TaggedEvent = (ConnectionId, SocketEvent);

/// Owner of the live socket.
///
/// Contract: every `open` eventually yields exactly one `Closed` for that id,
/// including after a failed handshake or a `close` request.
pub trait Transport {
    fn open(&mut self, id: ConnectionId, endpoint: &str);
    fn send(&mut self, id: ConnectionId, text: String) -> Result<()>;
    fn close(&mut self, id: ConnectionId);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn open(&mut self, id: ConnectionId, endpoint: &str) {
        (**self).open(id, endpoint)
    }

    fn send(&mut self, id: ConnectionId, text: String) -> Result<()> {
        (**self).send(id, text)
    }

    fn close(&mut self, id: ConnectionId) {
        (**self).close(id)
    }
}

/// Decode a text frame, logging and dropping anything malformed
pub fn frame_to_event(text: &str) -> Option<SocketEvent> {
    match codec::decode(text) {
        Ok(snapshot) => Some(SocketEvent::Message(snapshot)),
        Err(e) => {
            warn!("Skipping inbound message: {}", e);
            None
        }
    }
}

struct Link {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<Message>,
}

/// tokio-tungstenite transport. Must be used inside a tokio runtime.
pub struct WsTransport {
    events: mpsc::UnboundedSender<TaggedEvent>,
    link: Option<Link>,
}

impl WsTransport {
    /// Create the transport and the receiver its events arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TaggedEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { events, link: None }, rx)
    }
}

impl Transport for WsTransport {
    fn open(&mut self, id: ConnectionId, endpoint: &str) {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        // Dropping the previous link's sender makes its task shut down
        self.link = Some(Link { id, outbound });
        tokio::spawn(run_connection(
            id,
            endpoint.to_string(),
            outbound_rx,
            self.events.clone(),
        ));
    }

    fn send(&mut self, id: ConnectionId, text: String) -> Result<()> {
        match &self.link {
            Some(link) if link.id == id => link
                .outbound
                .send(Message::Text(text))
                .map_err(|_| Error::SendFailed(format!("{} is no longer writable", id))),
            _ => Err(Error::SendFailed(format!("{} is not open", id))),
        }
    }

    fn close(&mut self, id: ConnectionId) {
        if self.link.as_ref().is_some_and(|link| link.id == id) {
            self.link = None;
        }
    }
}

/// Drive one connection until it closes
async fn run_connection(
    id: ConnectionId,
    endpoint: String,
    mut outbound: mpsc::UnboundedReceiver<Message>,
    events: mpsc::UnboundedSender<TaggedEvent>,
) {
    let emit = |event: SocketEvent| {
        // Receiver gone means the loop is shutting down
        let _ = events.send((id, event));
    };

    let stream = match connect_async(endpoint.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            emit(SocketEvent::Errored(Some(e.to_string())));
            emit(SocketEvent::Closed(None));
            return;
        }
    };
    info!("WebSocket open to {} ({})", endpoint, id);
    emit(SocketEvent::Opened);

    let (mut write, mut read) = stream.split();

    let reason = loop {
        tokio::select! {
            out = outbound.recv() => match out {
                Some(msg) => {
                    if let Err(e) = write.send(msg).await {
                        emit(SocketEvent::Errored(Some(e.to_string())));
                        break None;
                    }
                }
                None => {
                    debug!("Close requested for {}", id);
                    let _ = write.close().await;
                    break None;
                }
            },
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Some(event) = frame_to_event(&text) {
                        emit(event);
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    break frame.map(|f| f.reason.to_string());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emit(SocketEvent::Errored(Some(e.to_string())));
                    break None;
                }
                None => break None,
            },
        }
    };

    emit(SocketEvent::Closed(reason));
}
