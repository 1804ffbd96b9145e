//! Console connection configuration.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

/// Timing and credential settings shared by every console session.
///
/// Waits left as `None` fall back to the dialect default of the bound
/// platform.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Bound on the TCP handshake.
    pub connect_timeout: Duration,

    /// Extra time allowed for the first byte when nothing arrived during the
    /// command wait.
    pub read_timeout: Duration,

    /// Drain window after late output starts arriving.
    pub settle: Duration,

    /// Wait used for the blank line that wakes the console after connect.
    pub wake_wait: Duration,

    /// Override for the dialect's default command wait.
    pub command_wait: Option<Duration>,

    /// Override for the dialect's default ping wait.
    pub ping_wait: Option<Duration>,

    /// IOS enable secret, sent when `enable` prompts for a password.
    pub enable_secret: Option<Arc<SecretString>>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(5),
            settle: Duration::from_millis(250),
            wake_wait: Duration::from_secs(1),
            command_wait: None,
            ping_wait: None,
            enable_secret: None,
        }
    }
}
