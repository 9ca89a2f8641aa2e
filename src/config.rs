//! Optional on-disk startup configuration for the demo shell. The core
//! itself never touches a filesystem (`midi_router_core` has no `config`
//! module); this is purely the binary's own convenience, mirroring the
//! teacher's `Config::load_from_file`.

use std::path::Path;

use anyhow::{Context, Result};
use midi_router_core::router::filter::Filter;
use midi_router_core::router::transport::TransportId;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct RouterConfig {
    #[serde(default)]
    pub merge_inputs: bool,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    #[serde(default)]
    pub filters: Vec<FilterEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RouteEntry {
    pub source: TransportName,
    pub destination: TransportName,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct FilterEntry {
    pub transport: TransportName,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_channel_mask")]
    pub channel_mask: u16,
    #[serde(default)]
    pub block_active_sensing: bool,
    #[serde(default)]
    pub block_clock: bool,
}

impl FilterEntry {
    pub fn as_filter(&self) -> Filter {
        Filter {
            enabled: self.enabled,
            channel_mask: self.channel_mask,
            block_active_sensing: self.block_active_sensing,
            block_clock: self.block_clock,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_channel_mask() -> u16 {
    0xFFFF
}

/// A transport name as it appears in the config file, distinct from
/// `TransportId` so the on-disk format doesn't leak the enum's Rust spelling.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportName {
    Uart,
    Usb,
    Ethernet,
    Wifi,
}

impl From<TransportName> for TransportId {
    fn from(name: TransportName) -> Self {
        match name {
            TransportName::Uart => TransportId::Uart,
            TransportName::Usb => TransportId::Usb,
            TransportName::Ethernet => TransportId::Ethernet,
            TransportName::Wifi => TransportId::Wifi,
        }
    }
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<RouterConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}
