//! Single command exchanges over a console session.

use std::time::Duration;

use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::Instant;

use super::buffer::CaptureBuffer;
use crate::error::{Error, Result};
use crate::transport::{ConsoleConfig, Connector, Session, SessionState};

/// Text captured for one command.
#[derive(Debug, Clone)]
pub struct Captured {
    /// Cleaned console text, echo and prompt included.
    pub raw: String,

    /// Wait the capture was taken with.
    pub wait: Duration,

    /// Time from send to end of capture.
    pub elapsed: Duration,
}

/// Blind-timing command channel.
///
/// A command is written with its line terminator, then the channel drains
/// the console for exactly the requested wait. There is no prompt-driven
/// early return: the wait is the contract, so a capture is never shorter
/// than the wait. Only when nothing at all arrived does the channel give the
/// device `read_timeout` more before failing.
pub struct Channel<S> {
    session: Session<S>,
    buffer: CaptureBuffer,
    read_timeout: Duration,
    settle: Duration,
}

impl<S> Channel<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            session: Session::new(),
            buffer: CaptureBuffer::default(),
            read_timeout: config.read_timeout,
            settle: config.settle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Open the underlying session.
    pub async fn connect<C>(
        &mut self,
        connector: &C,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<()>
    where
        C: Connector<Stream = S>,
    {
        self.session.connect(connector, host, port, timeout).await
    }

    /// Send `command` and capture everything the console prints during `wait`.
    pub async fn exchange(
        &mut self,
        command: &str,
        line_ending: &str,
        wait: Duration,
    ) -> Result<Captured> {
        self.exchange_as(command, command, line_ending, wait).await
    }

    /// Like [`exchange`](Self::exchange), but never logs or reports the text sent.
    pub async fn exchange_secret(
        &mut self,
        secret: &str,
        line_ending: &str,
        wait: Duration,
    ) -> Result<Captured> {
        self.exchange_as(secret, "<secret>", line_ending, wait).await
    }

    async fn exchange_as(
        &mut self,
        command: &str,
        label: &str,
        line_ending: &str,
        wait: Duration,
    ) -> Result<Captured> {
        // Late output from an earlier command must not leak into this one
        let stale = self.session.read_available(Instant::now()).await?;
        if !stale.is_empty() {
            trace!("Discarding {} stale bytes", stale.len());
        }

        let start = Instant::now();
        let mut line = Vec::with_capacity(command.len() + line_ending.len());
        line.extend_from_slice(command.as_bytes());
        line.extend_from_slice(line_ending.as_bytes());
        self.session.write(&line).await?;
        debug!("Sent '{}', waiting {:?}", label, wait);

        self.buffer.clear();
        let data = self.session.read_available(start + wait).await?;
        self.buffer.extend(&data);

        if data.is_empty() {
            let late = self
                .session
                .read_first(Instant::now() + self.read_timeout)
                .await?;
            match late {
                Some(first) => {
                    self.buffer.extend(&first);
                    if self.session.is_connected() {
                        let rest = self
                            .session
                            .read_available(Instant::now() + self.settle)
                            .await?;
                        self.buffer.extend(&rest);
                    }
                }
                None => {
                    return Err(Error::Timeout {
                        command: label.to_string(),
                        waited: wait + self.read_timeout,
                    });
                }
            }
        }

        // An early EOF must not shorten the wait
        tokio::time::sleep_until(start + wait).await;

        let raw = self.buffer.take();
        trace!("Captured {} bytes for '{}'", raw.len(), label);

        Ok(Captured {
            raw,
            wait,
            elapsed: start.elapsed(),
        })
    }

    /// Release the session. Idempotent.
    pub async fn close(&mut self) {
        self.session.close().await;
        self.buffer.clear();
    }
}
