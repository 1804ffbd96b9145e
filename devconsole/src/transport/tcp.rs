//! Connectors that open console streams.

use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::error::ConnectionError;

/// Opens the raw byte stream behind a console session.
///
/// The default is [`TcpConnector`]; tests plug in in-memory streams.
pub trait Connector: Send + Sync {
    /// Stream type produced by this connector.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Connect to `host:port`, giving up after `timeout`.
    fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> impl Future<Output = Result<Self::Stream, ConnectionError>> + Send;
}

/// Plain TCP connector for telnet console listeners.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<TcpStream, ConnectionError> {
        debug!("Connecting to console {}:{}", host, port);

        let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| ConnectionError::ConnectTimeout {
                host: host.to_string(),
                port,
                timeout,
            })?
            .map_err(|source| ConnectionError::ConnectFailed {
                host: host.to_string(),
                port,
                source,
            })?;

        // Console traffic is small interactive lines
        stream.set_nodelay(true)?;

        Ok(stream)
    }
}
