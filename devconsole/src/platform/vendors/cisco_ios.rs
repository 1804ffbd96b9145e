//! Cisco IOS driver.
//!
//! IOS is a modal CLI (see [`CliMode`]). The driver tracks the mode from the
//! prompt that ends every capture and navigates explicitly:
//!
//! - configuration always runs `configure terminal` ... `end`, and `end` is
//!   sent on every exit path so the next caller never inherits config mode
//! - `enable` is answered with the configured secret when IOS asks for one
//! - the boot-time setup dialog and "Press RETURN" banner are dismissed when
//!   the console is first woken

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use secrecy::{ExposeSecret, SecretString};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::channel::{Channel, last_line};
use crate::driver::{CommandResult, ConfigTranscript};
use crate::error::{DriverError, Error, Result};
use crate::heuristics;
use crate::platform::{
    CliMode, InterfaceStatus, Platform, check_argument, detect_mode, is_password_prompt,
    parse_ip_interface_brief,
};
use crate::transport::ConsoleConfig;

const PLATFORM: Platform = Platform::CiscoIos;

pub const ENTER_CONFIG: &str = "configure terminal";
pub const EXIT_CONFIG: &str = "end";
pub const DISABLE_PAGING: &str = "terminal length 0";
pub const SHOW_INTERFACES: &str = "show ip interface brief";

const SETUP_DIALOG: &str = "initial configuration dialog";
const AUTOINSTALL: &str = "terminate autoinstall";
const PRESS_RETURN: &str = "Press RETURN to get started";
const MAX_BANNER_ROUNDS: usize = 4;

/// Driver for Cisco IOS consoles.
pub struct CiscoIosDriver {
    command_wait: Duration,
    ping_wait: Duration,
    wake_wait: Duration,
    enable_secret: Option<Arc<SecretString>>,
    mode: Option<CliMode>,
    prompt: String,
}

impl CiscoIosDriver {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            command_wait: config
                .command_wait
                .unwrap_or_else(|| PLATFORM.default_command_wait()),
            ping_wait: config
                .ping_wait
                .unwrap_or_else(|| PLATFORM.default_ping_wait()),
            wake_wait: config.wake_wait,
            enable_secret: config.enable_secret.clone(),
            mode: None,
            prompt: String::new(),
        }
    }

    /// Mode seen at the end of the last capture, if the prompt was recognised.
    pub fn mode(&self) -> Option<CliMode> {
        self.mode
    }

    pub fn command_wait(&self) -> Duration {
        self.command_wait
    }

    /// Send one command and track the mode from the prompt it leaves behind.
    async fn run<S>(
        &mut self,
        channel: &mut Channel<S>,
        command: &str,
        wait: Duration,
    ) -> Result<CommandResult>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let result = PLATFORM.run(channel, command, wait).await?;
        self.observe(&result.raw);
        Ok(result)
    }

    fn observe(&mut self, raw: &str) {
        self.prompt = last_line(raw).to_string();
        self.mode = detect_mode(&self.prompt);
    }

    /// Wake the console, dismiss boot banners and disable paging.
    pub async fn prepare<S>(&mut self, channel: &mut Channel<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let mut last = match self.run(channel, "", self.wake_wait).await {
            Ok(result) => result.raw,
            Err(Error::Timeout { .. }) => {
                warn!("IOS console did not answer the wake-up line");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        for _ in 0..MAX_BANNER_ROUNDS {
            let answer = if last.contains(SETUP_DIALOG) {
                "no"
            } else if last.contains(AUTOINSTALL) {
                "yes"
            } else if last.contains(PRESS_RETURN) {
                ""
            } else {
                break;
            };
            debug!("Dismissing IOS boot prompt with '{}'", answer);
            last = self.run(channel, answer, self.wake_wait).await?.raw;
        }

        self.run(channel, DISABLE_PAGING, self.command_wait).await?;
        Ok(())
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
        let wait = wait.unwrap_or(self.command_wait);
        self.run(channel, command, wait).await
    }

    /// Get to privileged exec, from whatever mode the console is in.
    async fn ensure_privileged<S>(
        &mut self,
        channel: &mut Channel<S>,
        transcript: &mut ConfigTranscript,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        if self.mode.is_none() {
            self.run(channel, "", self.command_wait).await?;
        }

        // At most config -> privileged or user -> privileged
        for _ in 0..2 {
            let Some(mode) = self.mode else {
                warn!(
                    "Unrecognised IOS prompt '{}', assuming privileged exec",
                    self.prompt
                );
                return Ok(());
            };

            let Some(step) = mode.step_to_privileged() else {
                return Ok(());
            };
            if mode == CliMode::UserExec {
                self.enable(channel, transcript).await?;
            } else {
                let result = self.run(channel, step, self.command_wait).await?;
                transcript.push(result);
            }
        }

        if self.mode == Some(CliMode::PrivilegedExec) || self.mode.is_none() {
            return Ok(());
        }
        Err(DriverError::ModeAcquisitionFailed {
            target: CliMode::PrivilegedExec.name().to_string(),
            prompt: self.prompt.clone(),
        }
        .into())
    }

    async fn enable<S>(
        &mut self,
        channel: &mut Channel<S>,
        transcript: &mut ConfigTranscript,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let result = self.run(channel, "enable", self.command_wait).await?;
        transcript.push(result);

        if !is_password_prompt(&self.prompt) {
            return Ok(());
        }

        let Some(secret) = self.enable_secret.clone() else {
            // Clear the password prompt before giving up
            self.run(channel, "", self.command_wait).await?;
            return Err(DriverError::EnableSecretRequired.into());
        };

        let captured = channel
            .exchange_secret(
                secret.expose_secret(),
                PLATFORM.line_ending(),
                self.command_wait,
            )
            .await?;
        self.observe(&captured.raw);
        transcript.push(PLATFORM.finish("<secret>", captured));

        if self.mode != Some(CliMode::PrivilegedExec) {
            return Err(DriverError::ModeAcquisitionFailed {
                target: CliMode::PrivilegedExec.name().to_string(),
                prompt: self.prompt.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Apply a configuration block in global configuration mode.
    ///
    /// Lines are forwarded verbatim; sub-mode nesting (`interface X` ...
    /// `exit`) is the caller's business. Sending stops at the first line
    /// IOS rejects, and `end` is sent regardless of how the block went.
    pub async fn configure<S>(
        &mut self,
        channel: &mut Channel<S>,
        commands: &str,
    ) -> Result<ConfigTranscript>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let mut transcript = ConfigTranscript::new();
        self.ensure_privileged(channel, &mut transcript).await?;

        let body = self.configure_body(channel, commands, &mut transcript).await;
        let exit = self.run(channel, EXIT_CONFIG, self.command_wait).await;

        match (body, exit) {
            (Ok(()), Ok(result)) => {
                transcript.push(result);
                Ok(transcript)
            }
            (Ok(()), Err(e)) => Err(e),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(exit_err)) => {
                warn!("Failed to leave configuration mode after an error: {}", exit_err);
                Err(e)
            }
        }
    }

    async fn configure_body<S>(
        &mut self,
        channel: &mut Channel<S>,
        commands: &str,
        transcript: &mut ConfigTranscript,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let entry = self.run(channel, ENTER_CONFIG, self.command_wait).await?;
        transcript.push(entry);

        for line in commands.lines().filter(|l| !l.trim().is_empty()) {
            let result = self.run(channel, line, self.command_wait).await?;

            if let Some(marker) = heuristics::find_rejection(&result.output) {
                warn!("IOS rejected '{}': {}", line.trim(), marker);
                let output = result.output.clone();
                transcript.push(result);
                return Err(Error::ConfigRejected {
                    command: line.to_string(),
                    marker: marker.to_string(),
                    output,
                });
            }
            transcript.push(result);
        }
        Ok(())
    }

    pub async fn get_interfaces<S>(
        &mut self,
        channel: &mut Channel<S>,
    ) -> Result<Vec<InterfaceStatus>>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let result = self
            .run(channel, SHOW_INTERFACES, self.command_wait)
            .await?;
        let interfaces = parse_ip_interface_brief(&result.output);
        if interfaces.is_empty() {
            debug!("No interface rows recognised in '{}' output", SHOW_INTERFACES);
        }
        Ok(interfaces)
    }

    pub async fn ping<S>(&mut self, channel: &mut Channel<S>, target: &str) -> Result<CommandResult>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        check_argument("ping target", target)?;
        let command = format!("ping {target} repeat 5 timeout 2");
        self.run(channel, &command, self.ping_wait).await
    }
}

impl std::fmt::Debug for CiscoIosDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CiscoIosDriver")
            .field("command_wait", &self.command_wait)
            .field("ping_wait", &self.ping_wait)
            .field("mode", &self.mode)
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}
