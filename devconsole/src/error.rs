//! Error types for devconsole.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for devconsole operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Console unreachable, refused, timed out, or the session is unusable.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// A command was sent but nothing came back in time.
    ///
    /// Whatever partial output arrived is discarded.
    #[error("No response to '{command}' within {waited:?}")]
    Timeout { command: String, waited: Duration },

    /// The device accepted the bytes but refused the configuration.
    #[error("Configuration line '{command}' rejected ({marker}): {output}")]
    ConfigRejected {
        command: String,
        marker: String,
        output: String,
    },

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Inventory loading and lookup errors
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

/// Transport and session lifecycle errors.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// The device is not present in the inventory snapshot.
    #[error("Device '{name}' not found in inventory")]
    UnknownDevice { name: String },

    /// Failed to connect to the console listener
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// The transport handshake did not complete in time
    #[error("Connection to {host}:{port} timed out after {timeout:?}")]
    ConnectTimeout {
        host: String,
        port: u16,
        timeout: Duration,
    },

    /// The console stopped answering while being prepared for commands
    #[error("Console for '{name}' stopped answering during setup ('{command}', waited {waited:?})")]
    Unresponsive {
        name: String,
        command: String,
        waited: Duration,
    },

    /// The console closed the connection
    #[error("Console closed the connection")]
    Closed,

    /// Session not connected
    #[error("Session not connected - call connect() first")]
    NotConnected,

    /// Session already connected
    #[error("Session already connected")]
    AlreadyConnected,

    /// Session was closed and cannot be reused
    #[error("Session already closed")]
    SessionClosed,

    /// I/O error on an established session
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Driver layer errors (dialect navigation, argument checks).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Operation not offered by this platform's dialect
    #[error("Operation '{operation}' is not supported on {platform}")]
    UnsupportedOperation {
        platform: &'static str,
        operation: &'static str,
    },

    /// Argument would inject extra input into the console
    #[error("Invalid {what}: '{value}'")]
    InvalidArgument { what: &'static str, value: String },

    /// The device asked for an enable password and none is configured
    #[error("Device requested an enable secret but none is configured")]
    EnableSecretRequired,

    /// Failed to reach the target CLI mode
    #[error("Failed to acquire CLI mode '{target}' (prompt: '{prompt}')")]
    ModeAcquisitionFailed { target: String, prompt: String },
}

/// Inventory snapshot errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Failed to read the inventory file
    #[error("Failed to read inventory {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Inventory document is not valid YAML for the expected shape
    #[error("Invalid inventory document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// No host with that name
    #[error("Device '{name}' not found in inventory")]
    NotFound { name: String },

    /// Host present but without a console port
    #[error("No console port defined for '{name}'")]
    MissingPort { name: String },
}

/// Result type alias using devconsole's Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error came from the transport rather than the device.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}
