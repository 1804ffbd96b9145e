//! Linux host driver.
//!
//! The simplest dialect: a shell with `$`/`#` prompts and no modes. Every
//! line is an independent command, so configuration is just one send per
//! line.

use std::time::Duration;

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::channel::Channel;
use crate::driver::{CommandResult, ConfigTranscript};
use crate::error::{Error, Result};
use crate::platform::{InterfaceStatus, Platform, check_argument};
use crate::transport::ConsoleConfig;

const PLATFORM: Platform = Platform::Linux;

/// Driver for Linux consoles.
#[derive(Debug, Clone)]
pub struct LinuxDriver {
    command_wait: Duration,
    ping_wait: Duration,
    wake_wait: Duration,
}

impl LinuxDriver {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            command_wait: config
                .command_wait
                .unwrap_or_else(|| PLATFORM.default_command_wait()),
            ping_wait: config
                .ping_wait
                .unwrap_or_else(|| PLATFORM.default_ping_wait()),
            wake_wait: config.wake_wait,
        }
    }

    pub fn command_wait(&self) -> Duration {
        self.command_wait
    }

    /// Wake the console with a blank line.
    ///
    /// A console that stays silent is not a transport problem, so a timeout
    /// here is only logged.
    pub async fn prepare<S>(&mut self, channel: &mut Channel<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        match PLATFORM.run(channel, "", self.wake_wait).await {
            Ok(_) => Ok(()),
            Err(Error::Timeout { .. }) => {
                warn!("Linux console did not answer the wake-up line");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn send_command<S>(
        &mut self,
        channel: &mut Channel<S>,
        command: &str,
        wait: Option<Duration>,
    ) -> Result<CommandResult>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        PLATFORM
            .run(channel, command, wait.unwrap_or(self.command_wait))
            .await
    }

    /// Send each non-blank line as its own command, in order.
    pub async fn configure<S>(
        &mut self,
        channel: &mut Channel<S>,
        commands: &str,
    ) -> Result<ConfigTranscript>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let mut transcript = ConfigTranscript::new();
        for line in commands.lines().filter(|l| !l.trim().is_empty()) {
            let line = line.trim();
            debug!("Linux config line: {}", line);
            transcript.push(PLATFORM.run(channel, line, self.command_wait).await?);
        }
        Ok(transcript)
    }

    pub async fn ping<S>(&mut self, channel: &mut Channel<S>, target: &str) -> Result<CommandResult>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        check_argument("ping target", target)?;
        let command = format!("ping -c 4 -W 2 {target}");
        PLATFORM.run(channel, &command, self.ping_wait).await
    }

    /// Interface status is not scraped from Linux hosts.
    pub fn get_interfaces(&self) -> Vec<InterfaceStatus> {
        Vec::new()
    }
}
