//! Data models exchanged with the FMS backend and handed to the view

mod command;
mod connection;
mod phase;
mod snapshot;
mod view;

pub use command::*;
pub use connection::*;
pub use phase::*;
pub use snapshot::*;
pub use view::*;
