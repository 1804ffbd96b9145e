//! Channel layer between the raw session and the console façade.
//!
//! This module frames single command exchanges: terminator, blind wait,
//! terminal-escape stripping, and echo/prompt normalization.

mod buffer;
mod exchange;
mod patterns;

pub use buffer::CaptureBuffer;
pub use exchange::{Captured, Channel};
pub use patterns::{PromptPattern, last_line, normalize_output};
