//! High-level console API.
//!
//! The driver layer binds one session to one platform driver and exposes
//! the uniform operations callers use regardless of device dialect.

mod builder;
mod console;
pub(crate) mod response;

pub use builder::ConsoleBuilder;
pub use console::Console;
pub(crate) use console::resolve_device;
pub use response::{CommandResult, ConfigTranscript};
