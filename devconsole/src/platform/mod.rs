//! Platform dialects.
//!
//! A device is exactly one [`Platform`], decided once from its inventory
//! tags. Each platform has a driver holding its command syntax, mode
//! navigation and output parsing; [`PlatformDriver`] is the closed set of
//! drivers and every dispatch site matches it exhaustively, so adding a
//! platform is a compile-checked change.

mod interface;
mod mode;
pub mod vendors;

pub use interface::{InterfaceStatus, parse_ip_interface_brief};
pub use mode::{CliMode, detect_mode, is_ios_prompt, is_password_prompt};
pub use vendors::cisco_ios::CiscoIosDriver;
pub use vendors::linux::LinuxDriver;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::channel::{Captured, Channel, normalize_output};
use crate::driver::CommandResult;
use crate::error::{DriverError, Result};
use crate::transport::ConsoleConfig;

/// Role tag that classifies a device as a Linux host.
pub const LINUX_TAG: &str = "linux";

static SHELL_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$#]\s?$").expect("shell prompt pattern"));

/// Device dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    CiscoIos,
}

impl Platform {
    /// Classify from role tags: `linux` means Linux, anything else IOS.
    pub fn from_tags(tags: &BTreeSet<String>) -> Self {
        if tags.contains(LINUX_TAG) {
            Platform::Linux
        } else {
            Platform::CiscoIos
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::CiscoIos => "cisco_ios",
        }
    }

    /// Terminator appended to every command.
    pub fn line_ending(self) -> &'static str {
        match self {
            Platform::Linux => "\n",
            Platform::CiscoIos => "\r",
        }
    }

    /// Wait tuned for simple status commands.
    pub fn default_command_wait(self) -> Duration {
        match self {
            Platform::Linux => Duration::from_secs(1),
            Platform::CiscoIos => Duration::from_secs(2),
        }
    }

    /// Wait covering the bounded ping this platform issues.
    pub fn default_ping_wait(self) -> Duration {
        match self {
            Platform::Linux => Duration::from_secs(6),
            Platform::CiscoIos => Duration::from_secs(12),
        }
    }

    /// Whether a line is this platform's prompt.
    pub fn is_prompt(self, line: &str) -> bool {
        match self {
            Platform::Linux => SHELL_PROMPT.is_match(line),
            Platform::CiscoIos => is_ios_prompt(line),
        }
    }

    /// Error for an operation this dialect does not offer.
    pub fn unsupported(self, operation: &'static str) -> DriverError {
        DriverError::UnsupportedOperation {
            platform: self.name(),
            operation,
        }
    }

    /// Send one command and normalize what comes back.
    pub(crate) async fn run<S>(
        self,
        channel: &mut Channel<S>,
        command: &str,
        wait: Duration,
    ) -> Result<CommandResult>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let captured = channel.exchange(command, self.line_ending(), wait).await?;
        Ok(self.finish(command, captured))
    }

    pub(crate) fn finish(self, command: &str, captured: Captured) -> CommandResult {
        let output = normalize_output(&captured.raw, command, |line| self.is_prompt(line));
        CommandResult::new(command, output, captured.raw, captured.wait, captured.elapsed)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The driver bound to a console for its lifetime.
#[derive(Debug)]
pub enum PlatformDriver {
    Linux(LinuxDriver),
    CiscoIos(CiscoIosDriver),
}

impl PlatformDriver {
    pub fn new(platform: Platform, config: &ConsoleConfig) -> Self {
        match platform {
            Platform::Linux => PlatformDriver::Linux(LinuxDriver::new(config)),
            Platform::CiscoIos => PlatformDriver::CiscoIos(CiscoIosDriver::new(config)),
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            PlatformDriver::Linux(_) => Platform::Linux,
            PlatformDriver::CiscoIos(_) => Platform::CiscoIos,
        }
    }
}

/// Refuse arguments that would smuggle extra input onto the console.
pub(crate) fn check_argument(what: &'static str, value: &str) -> Result<()> {
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DriverError::InvalidArgument {
            what,
            value: value.to_string(),
        }
        .into());
    }
    Ok(())
}
