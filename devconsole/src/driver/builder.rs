//! Builder for creating consoles.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use super::console::{Console, Target};
use crate::inventory::{Device, Inventory};
use crate::transport::{ConsoleConfig, Connector, TcpConnector};

/// Builder for constructing consoles with non-default settings.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use devconsole::{ConsoleBuilder, Inventory};
///
/// # async fn example() -> Result<(), devconsole::Error> {
/// let inventory = Arc::new(Inventory::load_default()?);
/// let mut console = ConsoleBuilder::from_inventory(inventory, "router")
///     .command_wait(Duration::from_secs(3))
///     .enable_secret("cisco")
///     .build();
///
/// console.connect().await?;
/// let interfaces = console.get_interfaces().await;
/// console.close().await;
/// println!("{:?}", interfaces?);
/// # Ok(())
/// # }
/// ```
pub struct ConsoleBuilder {
    target: Target,
    config: ConsoleConfig,
}

impl ConsoleBuilder {
    /// Builder for an already resolved device.
    pub fn for_device(device: Device) -> Self {
        Self {
            target: Target::Bound(device),
            config: ConsoleConfig::default(),
        }
    }

    /// Builder for a device resolved from `inventory` when connecting.
    pub fn from_inventory(inventory: Arc<Inventory>, name: impl Into<String>) -> Self {
        Self {
            target: Target::Unresolved {
                name: name.into(),
                inventory,
            },
            config: ConsoleConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ConsoleConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the TCP connect timeout (default: 10 seconds).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the first-byte timeout for silent commands (default: 5 seconds).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    pub fn settle(mut self, settle: Duration) -> Self {
        self.config.settle = settle;
        self
    }

    /// Set the wait for the wake-up line sent after connecting.
    pub fn wake_wait(mut self, wait: Duration) -> Self {
        self.config.wake_wait = wait;
        self
    }

    /// Override the platform's default command wait.
    pub fn command_wait(mut self, wait: Duration) -> Self {
        self.config.command_wait = Some(wait);
        self
    }

    /// Override the platform's default ping wait.
    pub fn ping_wait(mut self, wait: Duration) -> Self {
        self.config.ping_wait = Some(wait);
        self
    }

    /// Set the IOS enable secret.
    pub fn enable_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.enable_secret = Some(Arc::new(SecretString::from(secret.into())));
        self
    }

    /// Build a console that connects over TCP.
    pub fn build(self) -> Console<TcpConnector> {
        self.build_with(TcpConnector)
    }

    /// Build a console that opens its stream through `connector`.
    pub fn build_with<C: Connector>(self, connector: C) -> Console<C> {
        Console::from_parts(self.target, connector, self.config)
    }
}
