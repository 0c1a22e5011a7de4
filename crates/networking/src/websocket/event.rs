use fms_core::StateSnapshot;

/// Everything a socket can report, funnelled through one handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Opened,
    Closed(Option<String>),
    Errored(Option<String>),
    Message(StateSnapshot),
}

impl SocketEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SocketEvent::Opened => "opened",
            SocketEvent::Closed(_) => "closed",
            SocketEvent::Errored(_) => "errored",
            SocketEvent::Message(_) => "message",
        }
    }
}
