//! Console transport layer.
//!
//! This module owns the raw byte stream to a device console: opening it
//! through a [`Connector`], telnet option filtering, and the deadline-bounded
//! reads the channel layer builds on.

pub mod config;
mod session;
mod tcp;
pub mod telnet;

pub use config::ConsoleConfig;
pub use session::{Session, SessionState};
pub use tcp::{Connector, TcpConnector};
