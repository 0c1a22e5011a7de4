//! FMS Dashboard - terminal front end for the FMS synchronization client

pub mod app;
pub mod config;
pub mod operator;
pub mod render;
pub mod runtime;

pub use app::{Dashboard, DashboardView};
pub use config::{Cli, DashboardConfig};
