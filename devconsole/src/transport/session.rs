//! Console session: one transport connection and its lifecycle.

use std::time::Duration;

use log::{debug, trace, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::Instant;

use super::tcp::Connector;
use super::telnet::{self, TelnetFilter};
use crate::error::{ConnectionError, Result};

const READ_CHUNK: usize = 4096;

/// Lifecycle of a [`Session`].
///
/// Moves strictly forward: `Disconnected -> Connected -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Closed,
}

/// Raw character-stream session to a device console.
///
/// Reads return whatever arrived by a deadline; there is no framing on a
/// console stream, so nothing here waits for a delimiter.
pub struct Session<S> {
    stream: Option<S>,
    state: SessionState,
    telnet: TelnetFilter,
    peer_closed: bool,
}

impl<S> Session<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send,
{
    /// Create a session in the `Disconnected` state.
    pub fn new() -> Self {
        Self {
            stream: None,
            state: SessionState::Disconnected,
            telnet: TelnetFilter::new(),
            peer_closed: false,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session can carry traffic.
    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected && !self.peer_closed
    }

    /// Open the transport.
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
        match self.state {
            SessionState::Disconnected => {}
            SessionState::Connected => return Err(ConnectionError::AlreadyConnected.into()),
            SessionState::Closed => return Err(ConnectionError::SessionClosed.into()),
        }

        let stream = connector.connect(host, port, timeout).await?;
        self.stream = Some(stream);
        self.state = SessionState::Connected;
        debug!("Session connected to {}:{}", host, port);
        Ok(())
    }

    /// Send raw bytes.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream_mut()?;
        stream
            .write_all(&telnet::escape(data))
            .await
            .map_err(ConnectionError::Io)?;
        stream.flush().await.map_err(ConnectionError::Io)?;
        trace!("Sent {} bytes", data.len());
        Ok(())
    }

    /// Read everything that arrives before `deadline`.
    ///
    /// Returns an empty vector if nothing arrived. Fails with
    /// [`ConnectionError::Closed`] only when the peer closed the stream and
    /// no data is left to hand out.
    pub async fn read_available(&mut self, deadline: Instant) -> Result<Vec<u8>> {
        let mut collected = Vec::new();
        while let Some(chunk) = self.read_chunk(deadline).await? {
            collected.extend_from_slice(&chunk);
        }
        if collected.is_empty() && self.peer_closed {
            return Err(ConnectionError::Closed.into());
        }
        Ok(collected)
    }

    /// Wait until `deadline` for the first device text to arrive.
    ///
    /// Returns `None` if the deadline passed with nothing received.
    pub async fn read_first(&mut self, deadline: Instant) -> Result<Option<Vec<u8>>> {
        match self.read_chunk(deadline).await? {
            Some(chunk) => Ok(Some(chunk)),
            None if self.peer_closed => Err(ConnectionError::Closed.into()),
            None => Ok(None),
        }
    }

    /// Read one non-empty chunk of device text, or `None` at the deadline
    /// or at end of stream.
    async fn read_chunk(&mut self, deadline: Instant) -> Result<Option<Vec<u8>>> {
        if self.peer_closed {
            return Ok(None);
        }

        let mut buf = [0u8; READ_CHUNK];
        loop {
            let stream = self.stream_mut()?;
            let n = match tokio::time::timeout_at(deadline, stream.read(&mut buf)).await {
                Err(_) => return Ok(None),
                Ok(read) => read.map_err(ConnectionError::Io)?,
            };

            if n == 0 {
                debug!("Console closed the stream");
                self.peer_closed = true;
                return Ok(None);
            }

            let filtered = self.telnet.filter(&buf[..n]);
            if !filtered.replies.is_empty() {
                trace!("Refusing {} bytes of telnet negotiation", filtered.replies.len());
                let stream = self.stream_mut()?;
                stream
                    .write_all(&filtered.replies)
                    .await
                    .map_err(ConnectionError::Io)?;
            }

            // Pure negotiation carries no text; keep reading
            if !filtered.data.is_empty() {
                return Ok(Some(filtered.data.to_vec()));
            }
        }
    }

    /// Release the transport. Safe in any state and safe to repeat.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                warn!("Error shutting down console stream: {}", e);
            }
            debug!("Session closed");
        }
        self.state = SessionState::Closed;
    }

    fn stream_mut(&mut self) -> std::result::Result<&mut S, ConnectionError> {
        match self.state {
            SessionState::Connected => self.stream.as_mut().ok_or(ConnectionError::NotConnected),
            SessionState::Disconnected => Err(ConnectionError::NotConnected),
            SessionState::Closed => Err(ConnectionError::SessionClosed),
        }
    }
}

impl<S> Default for Session<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send,
{
    fn default() -> Self {
        Self::new()
    }
}
