//! Network checks and changes built on the console API.
//!
//! Each task resolves its device from an explicit inventory snapshot, opens
//! one console, and closes it again whatever the outcome. Nothing is kept
//! between calls.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::driver::{CommandResult, ConfigTranscript, Console, ConsoleBuilder, resolve_device};
use crate::error::{DriverError, Result};
use crate::heuristics;
use crate::inventory::{Device, Inventory};
use crate::platform::{InterfaceStatus, Platform, check_argument};
use crate::transport::{ConsoleConfig, Connector, TcpConnector};

/// Default iperf3 server port.
pub const DEFAULT_IPERF_PORT: u16 = 5201;

/// Default traffic test duration.
pub const DEFAULT_TEST_DURATION: Duration = Duration::from_secs(5);

/// Default iperf3 target bandwidth.
pub const DEFAULT_BANDWIDTH: &str = "10M";

/// Interface checked by [`TaskRunner::detect_link_failures`] when none is given.
pub const DEFAULT_MONITORED_INTERFACE: &str = "Ethernet0/0";

/// Role tag of devices swept for link failures.
pub const CISCO_TAG: &str = "cisco";

/// Grace added to the test duration so the iperf3 summary is captured.
const TRAFFIC_TEST_GRACE: Duration = Duration::from_secs(2);

/// Outcome of a ping from one device.
#[derive(Debug, Clone)]
pub struct Reachability {
    pub success: bool,
    pub output: String,
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.success { "SUCCESS" } else { "FAILURE" };
        write!(f, "{}: {}", verdict, self.output)
    }
}

/// Health of one named interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceHealth {
    Found(InterfaceStatus),
    /// No interface table could be obtained (Linux host, or unparseable output).
    Unavailable,
    /// The table was read but the interface is not in it.
    Missing { available: Vec<String> },
}

impl fmt::Display for InterfaceHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceHealth::Found(status) => {
                write!(
                    f,
                    "Interface {}: Status={}, Protocol={}",
                    status.name, status.status, status.protocol
                )?;
                match status.ip {
                    Some(ip) => write!(f, ", IP={}", ip),
                    None => write!(f, ", IP=unassigned"),
                }
            }
            InterfaceHealth::Unavailable => write!(f, "interface status unavailable"),
            InterfaceHealth::Missing { available } => {
                write!(f, "interface not found; available: {}", available.join(", "))
            }
        }
    }
}

/// A problem found by the link-failure sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkIssue {
    pub device: String,
    pub detail: String,
}

impl fmt::Display for LinkIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Issue on {}: {}", self.device, self.detail)
    }
}

/// What a configuration deployment did.
#[derive(Debug, Clone)]
pub enum Deployment {
    /// Nothing was sent.
    DryRun { device: String, config: String },
    /// The block was delivered and accepted.
    Applied {
        device: String,
        port: u16,
        transcript: ConfigTranscript,
    },
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deployment::DryRun { device, config } => {
                write!(f, "[DRY-RUN] Would push the following config to {}:\n{}", device, config)
            }
            Deployment::Applied {
                device,
                port,
                transcript,
            } => write!(
                f,
                "Config deployed to {} (port {}).\nOutput capture:\n{}",
                device, port, transcript
            ),
        }
    }
}

/// Runs tasks against devices from one inventory snapshot.
pub struct TaskRunner<C: Connector + Clone = TcpConnector> {
    inventory: Arc<Inventory>,
    connector: C,
    config: ConsoleConfig,
}

impl TaskRunner<TcpConnector> {
    pub fn new(inventory: Arc<Inventory>) -> Self {
        Self::with_connector(inventory, TcpConnector)
    }
}

impl<C: Connector + Clone> TaskRunner<C> {
    /// Runner whose consoles open their streams through `connector`.
    pub fn with_connector(inventory: Arc<Inventory>, connector: C) -> Self {
        Self {
            inventory,
            connector,
            config: ConsoleConfig::default(),
        }
    }

    /// Console settings used for every task.
    pub fn config(mut self, config: ConsoleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn console(&self, device: Device) -> Console<C> {
        ConsoleBuilder::for_device(device)
            .config(self.config.clone())
            .build_with(self.connector.clone())
    }

    fn linux_device(&self, name: &str, operation: &'static str) -> Result<Device> {
        let device = resolve_device(&self.inventory, name)?;
        match device.platform() {
            Platform::Linux => Ok(device),
            platform @ Platform::CiscoIos => Err(platform.unsupported(operation).into()),
        }
    }

    /// Ping `target` from `source` and classify the output.
    pub async fn check_reachability(&self, source: &str, target: &str) -> Result<Reachability> {
        let device = resolve_device(&self.inventory, source)?;
        let mut console = self.console(device);

        let result = async {
            console.connect().await?;
            console.ping(target).await
        }
        .await;
        console.close().await;

        let output = result?.output;
        let success = heuristics::ping_succeeded(&output);
        debug!("Ping {} -> {}: success={}", source, target, success);
        Ok(Reachability { success, output })
    }

    /// Look up one interface's status on `device`.
    pub async fn interface_health(&self, device: &str, interface: &str) -> Result<InterfaceHealth> {
        let device = resolve_device(&self.inventory, device)?;
        self.interface_health_on(device, interface).await
    }

    async fn interface_health_on(&self, device: Device, interface: &str) -> Result<InterfaceHealth> {
        // Linux status is not scraped; skip the console entirely
        if device.platform() == Platform::Linux {
            return Ok(InterfaceHealth::Unavailable);
        }

        let mut console = self.console(device);
        let result = async {
            console.connect().await?;
            console.get_interfaces().await
        }
        .await;
        console.close().await;

        let mut interfaces = result?;
        if interfaces.is_empty() {
            return Ok(InterfaceHealth::Unavailable);
        }

        match interfaces.iter().position(|i| i.name == interface) {
            Some(index) => Ok(InterfaceHealth::Found(interfaces.swap_remove(index))),
            None => Ok(InterfaceHealth::Missing {
                available: interfaces.into_iter().map(|i| i.name).collect(),
            }),
        }
    }

    /// Check `interface` on every device tagged `cisco`.
    ///
    /// An empty list means every swept device looked healthy.
    pub async fn detect_link_failures(&self, interface: &str) -> Vec<LinkIssue> {
        let mut issues = Vec::new();

        for device in self.inventory.devices().filter(|d| d.has_tag(CISCO_TAG)) {
            let name = device.name().to_string();
            let detail = match self.interface_health_on(device, interface).await {
                Ok(InterfaceHealth::Found(status)) => {
                    let down = status.status.to_lowercase().contains("down")
                        || status.protocol.to_lowercase().contains("down");
                    down.then(|| InterfaceHealth::Found(status).to_string())
                }
                Ok(InterfaceHealth::Missing { available }) => Some(format!(
                    "interface '{}' not found; available: {}",
                    interface,
                    available.join(", ")
                )),
                Ok(InterfaceHealth::Unavailable) => Some(format!(
                    "could not retrieve interface status for '{}'",
                    interface
                )),
                Err(e) => Some(e.to_string()),
            };

            if let Some(detail) = detail {
                warn!("Link issue on {}: {}", name, detail);
                issues.push(LinkIssue {
                    device: name,
                    detail,
                });
            }
        }

        issues
    }

    /// Push a configuration block with the device's configure operation.
    ///
    /// A dry run only reports what would be sent and touches nothing.
    pub async fn deploy_config(&self, device: &str, config: &str, dry_run: bool) -> Result<Deployment> {
        if dry_run {
            return Ok(Deployment::DryRun {
                device: device.to_string(),
                config: config.to_string(),
            });
        }

        let target = resolve_device(&self.inventory, device)?;
        let (name, port) = (target.name().to_string(), target.port());
        let mut console = self.console(target);

        let result = async {
            console.connect().await?;
            console.configure(config).await
        }
        .await;
        console.close().await;

        let transcript = result?;
        info!("Deployed {} lines to {}", transcript.len(), name);
        Ok(Deployment::Applied {
            device: name,
            port,
            transcript,
        })
    }

    /// Start an iperf3 server daemon on a Linux host.
    pub async fn start_traffic_server(&self, host: &str, port: u16) -> Result<CommandResult> {
        let device = self.linux_device(host, "start_traffic_server")?;
        let command = format!("iperf3 -s -p {port} -D");
        let mut console = self.console(device);

        let result = async {
            console.connect().await?;
            console.send_command(&command, None).await
        }
        .await;
        console.close().await;

        result
    }

    /// Run an iperf3 client test from a Linux host.
    ///
    /// The capture waits for the test duration plus a short grace so the
    /// summary is included.
    pub async fn run_traffic_test(
        &self,
        client: &str,
        server_ip: &str,
        duration: Duration,
        bandwidth: &str,
    ) -> Result<CommandResult> {
        check_argument("server address", server_ip)?;
        check_argument("bandwidth", bandwidth)?;
        let seconds = duration.as_secs();
        if seconds == 0 {
            return Err(DriverError::InvalidArgument {
                what: "duration",
                value: format!("{:?}", duration),
            }
            .into());
        }

        let device = self.linux_device(client, "run_traffic_test")?;
        let command = format!("iperf3 -c {server_ip} -t {seconds} -b {bandwidth}");
        let wait = Duration::from_secs(seconds) + TRAFFIC_TEST_GRACE;
        let mut console = self.console(device);

        let result = async {
            console.connect().await?;
            console.send_command(&command, Some(wait)).await
        }
        .await;
        console.close().await;

        result
    }
}
