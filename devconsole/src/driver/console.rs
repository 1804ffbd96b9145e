//! Console façade: one session bound to one platform driver.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use super::response::{CommandResult, ConfigTranscript};
use crate::channel::Channel;
use crate::error::{ConnectionError, Error, InventoryError, Result};
use crate::inventory::{Device, Inventory};
use crate::platform::{InterfaceStatus, Platform, PlatformDriver};
use crate::transport::{ConsoleConfig, Connector, SessionState, TcpConnector};

/// What the console is pointed at.
#[derive(Debug, Clone)]
pub(crate) enum Target {
    /// Already resolved.
    Bound(Device),
    /// Resolved from the snapshot on `connect()`.
    Unresolved {
        name: String,
        inventory: Arc<Inventory>,
    },
}

/// Resolve `name` for connecting. An unknown name is a connection error
/// naming the device.
pub(crate) fn resolve_device(inventory: &Inventory, name: &str) -> Result<Device> {
    inventory.resolve(name).map_err(|e| match e {
        Error::Inventory(InventoryError::NotFound { name }) => {
            Error::Connection(ConnectionError::UnknownDevice { name })
        }
        other => other,
    })
}

/// The entry point for talking to one device console.
///
/// A console owns exactly one session for its lifetime:
/// `connect()`, any number of operations in call order, then `close()`.
/// The console listener accepts a single connection, so `close()` must run
/// on every exit path, including after errors.
///
/// # Example
///
/// ```rust,no_run
/// use devconsole::{Console, Device};
///
/// # async fn example() -> Result<(), devconsole::Error> {
/// let mut console = Console::new(Device::new("router", "localhost", 5001, ["cisco"]));
///
/// let result = async {
///     console.connect().await?;
///     console.configure_cisco("interface Fa0/0\n no shutdown\nexit").await
/// }
/// .await;
/// console.close().await;
///
/// println!("{}", result?);
/// # Ok(())
/// # }
/// ```
pub struct Console<C: Connector = TcpConnector> {
    target: Target,
    connector: C,
    config: ConsoleConfig,
    channel: Channel<C::Stream>,
    driver: Option<PlatformDriver>,
}

impl Console<TcpConnector> {
    /// Console for an already resolved device, over TCP.
    pub fn new(device: Device) -> Self {
        Self::from_parts(Target::Bound(device), TcpConnector, ConsoleConfig::default())
    }

    /// Console for a device resolved from `inventory` when connecting.
    pub fn from_inventory(inventory: Arc<Inventory>, name: impl Into<String>) -> Self {
        Self::from_parts(
            Target::Unresolved {
                name: name.into(),
                inventory,
            },
            TcpConnector,
            ConsoleConfig::default(),
        )
    }
}

impl<C: Connector> Console<C> {
    pub(crate) fn from_parts(target: Target, connector: C, config: ConsoleConfig) -> Self {
        Self {
            channel: Channel::new(&config),
            target,
            connector,
            config,
            driver: None,
        }
    }

    /// The bound device, once resolved.
    pub fn device(&self) -> Option<&Device> {
        match &self.target {
            Target::Bound(device) => Some(device),
            Target::Unresolved { .. } => None,
        }
    }

    /// Platform of the bound device, once resolved.
    pub fn platform(&self) -> Option<Platform> {
        self.device().map(Device::platform)
    }

    /// Name the console was created for.
    pub fn name(&self) -> &str {
        match &self.target {
            Target::Bound(device) => device.name(),
            Target::Unresolved { name, .. } => name,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Check if the session is open.
    pub fn is_open(&self) -> bool {
        self.channel.is_connected()
    }

    /// Resolve the target if needed. Unknown names fail without touching
    /// the network.
    fn bind(&mut self) -> Result<Device> {
        let device = match &self.target {
            Target::Bound(device) => return Ok(device.clone()),
            Target::Unresolved { name, inventory } => resolve_device(inventory, name)?,
        };
        debug!(
            "Resolved '{}' to {} ({})",
            device.name(),
            device.endpoint(),
            device.platform()
        );
        self.target = Target::Bound(device.clone());
        Ok(device)
    }

    /// Open the console session and prepare the device for commands.
    ///
    /// A console that answers the wake-up line but then goes quiet fails
    /// with [`ConnectionError::Unresponsive`], not a command timeout.
    /// If preparing the device fails the session is released before the
    /// error is returned.
    pub async fn connect(&mut self) -> Result<()> {
        match self.channel.state() {
            SessionState::Disconnected => {}
            SessionState::Connected => return Err(ConnectionError::AlreadyConnected.into()),
            SessionState::Closed => return Err(ConnectionError::SessionClosed.into()),
        }

        let device = self.bind()?;
        self.channel
            .connect(
                &self.connector,
                device.host(),
                device.port(),
                self.config.connect_timeout,
            )
            .await?;

        let mut driver = PlatformDriver::new(device.platform(), &self.config);
        let prepared = match &mut driver {
            PlatformDriver::Linux(d) => d.prepare(&mut self.channel).await,
            PlatformDriver::CiscoIos(d) => d.prepare(&mut self.channel).await,
        };
        self.driver = Some(driver);

        if let Err(e) = prepared {
            warn!("Preparing console for '{}' failed: {}", device.name(), e);
            self.close().await;
            return Err(match e {
                Error::Timeout { command, waited } => ConnectionError::Unresponsive {
                    name: device.name().to_string(),
                    command,
                    waited,
                }
                .into(),
                other => other,
            });
        }

        debug!("Console for '{}' ready", device.name());
        Ok(())
    }

    fn parts(&mut self) -> Result<(&mut PlatformDriver, &mut Channel<C::Stream>)> {
        match self.channel.state() {
            SessionState::Disconnected => return Err(ConnectionError::NotConnected.into()),
            SessionState::Closed => return Err(ConnectionError::SessionClosed.into()),
            SessionState::Connected if !self.channel.is_connected() => {
                return Err(ConnectionError::Closed.into());
            }
            SessionState::Connected => {}
        }
        let driver = self
            .driver
            .as_mut()
            .ok_or(ConnectionError::NotConnected)?;
        Ok((driver, &mut self.channel))
    }

    /// Send a raw command and capture its output.
    ///
    /// `wait` must cover the command's device-side run time; `None` uses the
    /// dialect default, tuned for short status commands. The call never
    /// returns before the wait has elapsed.
    pub async fn send_command(
        &mut self,
        command: &str,
        wait: Option<Duration>,
    ) -> Result<CommandResult> {
        let (driver, channel) = self.parts()?;
        match driver {
            PlatformDriver::Linux(d) => d.send_command(channel, command, wait).await,
            PlatformDriver::CiscoIos(d) => d.send_command(channel, command, wait).await,
        }
    }

    /// Run a block of shell commands, one send per line.
    pub async fn configure_linux(&mut self, commands: &str) -> Result<ConfigTranscript> {
        let (driver, channel) = self.parts()?;
        match driver {
            PlatformDriver::Linux(d) => d.configure(channel, commands).await,
            PlatformDriver::CiscoIos(_) => {
                Err(Platform::CiscoIos.unsupported("configure_linux").into())
            }
        }
    }

    /// Apply a block of IOS configuration lines.
    ///
    /// Fails with [`Error::ConfigRejected`] if IOS refuses a line. Success
    /// means the lines were delivered and syntactically accepted, not that
    /// they had the intended network effect.
    pub async fn configure_cisco(&mut self, commands: &str) -> Result<ConfigTranscript> {
        let (driver, channel) = self.parts()?;
        match driver {
            PlatformDriver::CiscoIos(d) => d.configure(channel, commands).await,
            PlatformDriver::Linux(_) => Err(Platform::Linux.unsupported("configure_cisco").into()),
        }
    }

    /// Apply a block with the bound platform's configure operation.
    pub async fn configure(&mut self, commands: &str) -> Result<ConfigTranscript> {
        let (driver, channel) = self.parts()?;
        match driver {
            PlatformDriver::Linux(d) => d.configure(channel, commands).await,
            PlatformDriver::CiscoIos(d) => d.configure(channel, commands).await,
        }
    }

    /// Interface status table.
    ///
    /// Empty when the status cannot be scraped (unparseable output, or a
    /// Linux host); callers should degrade, e.g. to a ping.
    pub async fn get_interfaces(&mut self) -> Result<Vec<InterfaceStatus>> {
        let (driver, channel) = self.parts()?;
        match driver {
            PlatformDriver::Linux(d) => Ok(d.get_interfaces()),
            PlatformDriver::CiscoIos(d) => d.get_interfaces(channel).await,
        }
    }

    /// Bounded ping from the device. Classify the output with
    /// [`heuristics::ping_succeeded`](crate::heuristics::ping_succeeded).
    pub async fn ping(&mut self, target: &str) -> Result<CommandResult> {
        let (driver, channel) = self.parts()?;
        match driver {
            PlatformDriver::Linux(d) => d.ping(channel, target).await,
            PlatformDriver::CiscoIos(d) => d.ping(channel, target).await,
        }
    }

    /// Release the session. Safe to call repeatedly and in any state.
    pub async fn close(&mut self) {
        if self.channel.state() != SessionState::Closed {
            debug!("Closing console for '{}'", self.name());
        }
        self.channel.close().await;
    }
}

impl<C: Connector> Drop for Console<C> {
    fn drop(&mut self) {
        if self.channel.state() == SessionState::Connected {
            warn!("Console for '{}' dropped without close()", self.name());
        }
    }
}
