//! # devconsole
//!
//! Async console automation for emulated Linux hosts and Cisco IOS routers.
//!
//! Devices in an emulated lab expose their serial console as a raw telnet
//! listener on a local TCP port. devconsole resolves a device from an
//! inventory snapshot, opens its console, and drives it with a small set of
//! uniform operations while hiding the dialect differences between a Linux
//! shell and the modal IOS CLI.
//!
//! ## Features
//!
//! - Telnet console sessions over tokio, with option negotiation refused
//! - Linux and Cisco IOS dialects behind one façade
//! - IOS mode navigation (`enable`, `configure terminal` ... `end`)
//! - `show ip interface brief` parsing
//! - Pinned-string ping and config-rejection heuristics
//! - Higher-level tasks: reachability, link health, deployment, traffic tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use devconsole::{Console, Inventory};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), devconsole::Error> {
//!     let inventory = Arc::new(Inventory::load_default()?);
//!     let mut console = Console::from_inventory(inventory, "pc1");
//!
//!     let result = async {
//!         console.connect().await?;
//!         console.ping("20.0.0.1").await
//!     }
//!     .await;
//!     console.close().await;
//!
//!     let ping = result?;
//!     println!("reachable: {}", devconsole::heuristics::ping_succeeded(&ping.output));
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod driver;
pub mod error;
pub mod heuristics;
pub mod inventory;
pub mod platform;
pub mod tasks;
pub mod transport;

// Re-export main types for convenience
pub use driver::{CommandResult, ConfigTranscript, Console, ConsoleBuilder};
pub use error::{Error, Result};
pub use inventory::{Device, Inventory};
pub use platform::{CliMode, InterfaceStatus, Platform};
pub use tasks::TaskRunner;
pub use transport::{ConsoleConfig, Connector, TcpConnector};
