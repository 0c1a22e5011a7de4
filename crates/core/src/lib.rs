//! FMS Core - Shared data model, types, and errors for the dashboard client

pub mod errors;
pub mod models;
pub mod types;

pub use errors::{Error, Result};
pub use models::*;
pub use types::*;
