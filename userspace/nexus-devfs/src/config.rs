// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! TOML device-table loading.

use std::fs;
use std::path::Path;

use nexus_fifo::DEFAULT_CAPACITY;
use serde::Deserialize;

use crate::{Error, Result};

/// One device entry in the table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceConfig {
    /// Name the device registers under.
    pub name: String,
    /// Channel capacity in bytes.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl DeviceConfig {
    /// Creates an entry with an explicit capacity.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self { name: name.into(), capacity }
    }

    /// Checks the entry for values no device can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidConfig("device name is empty".to_string()));
        }
        if self.capacity == 0 {
            return Err(Error::InvalidConfig(format!(
                "device {}: capacity must be non-zero",
                self.name
            )));
        }
        Ok(())
    }
}

/// Device table parsed from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceTable {
    /// Device entries in declaration order.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

impl DeviceTable {
    /// Loads and validates a device table from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table: Self = toml::from_str(&data).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        for device in &table.devices {
            device.validate()?;
        }
        Ok(table)
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}
