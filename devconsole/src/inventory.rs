//! Read-only inventory snapshot and device resolution.
//!
//! The inventory is maintained elsewhere; this module only reads the fields
//! the console layer needs from a Nornir-style `hosts` document:
//!
//! ```yaml
//! hosts:
//!   router:
//!     hostname: localhost
//!     port: 5001
//!     groups: [cisco]
//!   pc1:
//!     port: 5002
//!     groups: [linux]
//! ```
//!
//! A snapshot is an explicit value. Callers decide when to reload it and pass
//! it into each operation; nothing here caches or watches the file.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use crate::error::{InventoryError, Result};
use crate::platform::Platform;

/// Environment variable naming the inventory file for [`Inventory::load_default`].
pub const INVENTORY_ENV: &str = "DEVCONSOLE_INVENTORY";

/// Inventory path used when [`INVENTORY_ENV`] is unset.
pub const DEFAULT_INVENTORY_PATH: &str = "inventory/hosts.yaml";

const DEFAULT_HOSTNAME: &str = "localhost";

/// One host entry as written in the inventory document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostEntry {
    /// Console endpoint host (defaults to `localhost`).
    #[serde(default)]
    pub hostname: Option<String>,

    /// Console endpoint port.
    #[serde(default)]
    pub port: Option<u16>,

    /// Role tags.
    #[serde(default)]
    pub groups: Vec<String>,
}

/// An immutable snapshot of the inventory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    hosts: IndexMap<String, HostEntry>,
}

/// A device resolved from the inventory.
///
/// The platform is derived from the tags when the device is built and
/// cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    name: String,
    host: String,
    port: u16,
    platform: Platform,
    tags: BTreeSet<String>,
}

impl Device {
    /// Build a device directly, classifying it from its tags.
    pub fn new<I, T>(name: impl Into<String>, host: impl Into<String>, port: u16, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        Self {
            name: name.into(),
            host: host.into(),
            port,
            platform: Platform::from_tags(&tags),
            tags,
        }
    }

    /// Inventory key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Console endpoint host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Console endpoint port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Dialect, fixed at resolution time.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Role tags.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Check role-tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// `host:port` of the console listener.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an inventory document.
    pub fn from_yaml_str(document: &str) -> Result<Self> {
        let inventory: Inventory = serde_yaml::from_str(document).map_err(InventoryError::from)?;
        Ok(inventory)
    }

    /// Read and parse an inventory file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Loaded inventory from {}", path.display());
        Self::from_yaml_str(&document)
    }

    /// Load from `$DEVCONSOLE_INVENTORY`, falling back to `inventory/hosts.yaml`.
    pub fn load_default() -> Result<Self> {
        let path = env::var(INVENTORY_ENV).unwrap_or_else(|_| DEFAULT_INVENTORY_PATH.to_string());
        Self::load(path)
    }

    /// Add or replace a host entry.
    pub fn with_host(mut self, name: impl Into<String>, entry: HostEntry) -> Self {
        self.hosts.insert(name.into(), entry);
        self
    }

    /// Number of hosts in the snapshot.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether the snapshot has no hosts.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Resolve a device by name.
    ///
    /// An exact key match wins; otherwise the first key equal ignoring ASCII
    /// case is used.
    pub fn resolve(&self, name: &str) -> Result<Device> {
        let (key, entry) = self
            .hosts
            .get_key_value(name)
            .or_else(|| {
                self.hosts
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| InventoryError::NotFound {
                name: name.to_string(),
            })?;

        Ok(Self::to_device(key, entry)?)
    }

    /// All devices with a console port, in document order.
    pub fn devices(&self) -> impl Iterator<Item = Device> + '_ {
        self.hosts
            .iter()
            .filter_map(|(key, entry)| Self::to_device(key, entry).ok())
    }

    fn to_device(key: &str, entry: &HostEntry) -> std::result::Result<Device, InventoryError> {
        let port = entry.port.ok_or_else(|| InventoryError::MissingPort {
            name: key.to_string(),
        })?;
        let host = entry
            .hostname
            .clone()
            .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string());
        Ok(Device::new(key, host, port, entry.groups.iter().cloned()))
    }
}
