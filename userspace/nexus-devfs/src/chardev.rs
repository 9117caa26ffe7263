// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! The channel-backed character device.

use log::{debug, info};
use nexus_fifo::{Channel, Readiness, Wait};
use parking_lot::Mutex;

use crate::{DeviceConfig, DeviceOps, Error, Result, OCCUPANCY_BYTES, OPCODE_OCCUPANCY};

/// A shared [`Channel`] bound to the device operation slots.
///
/// All concurrent openers share the one channel instance; the device keeps
/// no per-session state beyond a running count of open sessions.
pub struct ChannelDevice {
    name: String,
    channel: Channel,
    sessions: Mutex<u32>,
}

impl ChannelDevice {
    /// Creates a device named `name` over a fresh channel of `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is zero; construct through
    /// [`from_config`](Self::from_config) to validate instead.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            channel: Channel::with_capacity(capacity),
            sessions: Mutex::new(0),
        }
    }

    /// Creates a device from a validated config entry.
    pub fn from_config(config: &DeviceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(&config.name, config.capacity))
    }

    /// Name the device registers under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of sessions currently open on this device.
    pub fn open_sessions(&self) -> u32 {
        *self.sessions.lock()
    }
}

impl DeviceOps for ChannelDevice {
    fn open(&self) {
        let mut sessions = self.sessions.lock();
        *sessions += 1;
        info!("{}: opened ({} open sessions)", self.name, *sessions);
    }

    fn release(&self) {
        let mut sessions = self.sessions.lock();
        *sessions = sessions.saturating_sub(1);
        debug!("{}: released ({} open sessions)", self.name, *sessions);
    }

    fn read(&self, buf: &mut [u8], wait: Wait) -> Result<usize> {
        Ok(self.channel.read(buf, wait)?)
    }

    fn write(&self, data: &[u8]) -> Result<usize> {
        Ok(self.channel.write(data)?)
    }

    fn poll(&self, interest: Readiness, wait: Wait) -> Result<Readiness> {
        Ok(self.channel.poll_wait(interest, wait)?)
    }

    fn control(&self, opcode: u32, out: &mut [u8]) -> Result<usize> {
        debug!("{}: control opcode {opcode:#x}", self.name);
        match opcode {
            OPCODE_OCCUPANCY => {
                // Output location is checked before the snapshot is taken.
                if out.len() < OCCUPANCY_BYTES {
                    return Err(Error::Fault);
                }
                let occupancy = self.channel.occupancy() as u64;
                out[..OCCUPANCY_BYTES].copy_from_slice(&occupancy.to_le_bytes());
                Ok(OCCUPANCY_BYTES)
            }
            other => Err(Error::Unsupported(other)),
        }
    }

    fn shutdown(&self) {
        info!("{}: shutting down", self.name);
        self.channel.shutdown();
    }
}
