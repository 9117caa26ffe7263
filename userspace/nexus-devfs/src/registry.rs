// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Named device table and open-session handles.

use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use nexus_fifo::{Readiness, Wait};
use parking_lot::Mutex;

use crate::{ChannelDevice, DeviceConfig, DeviceOps, Error, Result};

/// Explicitly owned registry standing in for the host's device table.
///
/// Devices are handed over at registration time and torn down at
/// unregistration time; there is no ambient global lookup. Requests reach a
/// device through the [`DeviceHandle`] sessions the registry issues.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: Mutex<HashMap<String, Arc<dyn DeviceOps>>>,
}

impl DeviceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `device` under `name` if the name is currently unknown.
    pub fn register(&self, name: impl Into<String>, device: Arc<dyn DeviceOps>) -> Result<()> {
        let name = name.into();
        let mut devices = self.devices.lock();
        if devices.contains_key(&name) {
            return Err(Error::Duplicate(name));
        }
        info!("registered device {name}");
        devices.insert(name, device);
        Ok(())
    }

    /// Builds a [`ChannelDevice`] from `config` and registers it.
    pub fn register_channel(&self, config: &DeviceConfig) -> Result<Arc<ChannelDevice>> {
        let device = Arc::new(ChannelDevice::from_config(config)?);
        self.register(config.name.as_str(), device.clone())?;
        Ok(device)
    }

    /// Removes the device and invokes its teardown hook.
    ///
    /// Sessions still blocked on the device drain with
    /// [`Interrupted`](nexus_fifo::Error::Interrupted).
    pub fn unregister(&self, name: &str) -> Result<()> {
        let device = self
            .devices
            .lock()
            .remove(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        device.shutdown();
        info!("unregistered device {name}");
        Ok(())
    }

    /// Opens a session on the named device.
    pub fn open(&self, name: &str) -> Result<DeviceHandle> {
        let device = self
            .devices
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        device.open();
        Ok(DeviceHandle { device })
    }

    /// Number of devices currently registered.
    pub fn device_count(&self) -> usize {
        self.devices.lock().len()
    }
}

/// One open session on a registered device.
///
/// Dropping the handle releases the session.
pub struct DeviceHandle {
    device: Arc<dyn DeviceOps>,
}

impl DeviceHandle {
    /// Transfers up to `buf.len()` bytes out of the device.
    pub fn read(&self, buf: &mut [u8], wait: Wait) -> Result<usize> {
        self.device.read(buf, wait)
    }

    /// Transfers up to `data.len()` bytes into the device.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        self.device.write(data)
    }

    /// Readiness query for multiplexed waits.
    pub fn poll(&self, interest: Readiness, wait: Wait) -> Result<Readiness> {
        self.device.poll(interest, wait)
    }

    /// Out-of-band control request writing its reply into `out`.
    pub fn control(&self, opcode: u32, out: &mut [u8]) -> Result<usize> {
        self.device.control(opcode, out)
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        self.device.release();
    }
}
