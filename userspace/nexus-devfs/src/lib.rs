// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Character-device dispatch layer over bounded byte channels
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Unstable
//!
//! PUBLIC API:
//!   - DeviceOps trait: operation slots bound at registration time
//!   - ChannelDevice: nexus-fifo channel bound to the slots
//!   - DeviceRegistry / DeviceHandle: named device table and open sessions
//!   - DeviceConfig / DeviceTable: TOML device-table loading
//!   - Error: dispatch error types
//!
//! DEPENDENCIES:
//!   - nexus-fifo: channel core
//!   - parking_lot: device-table lock
//!   - serde + toml: device-table config

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

mod chardev;
mod config;
mod registry;

pub use chardev::ChannelDevice;
pub use config::{DeviceConfig, DeviceTable};
pub use nexus_fifo::{Readiness, Wait};
pub use registry::{DeviceHandle, DeviceRegistry};

/// Control opcode querying the current occupancy of a device.
pub const OPCODE_OCCUPANCY: u32 = 1;

/// Size of the occupancy control reply: a little-endian `u64`.
pub const OCCUPANCY_BYTES: usize = core::mem::size_of::<u64>();

/// Result alias for dispatch-layer operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by the dispatch layer.
#[derive(Debug, Error)]
pub enum Error {
    /// A device with the provided name already exists.
    #[error("device already registered: {0}")]
    Duplicate(String),
    /// The requested device does not exist.
    #[error("device not found: {0}")]
    NotFound(String),
    /// The caller-supplied control output location cannot hold the reply.
    #[error("control output location invalid")]
    Fault,
    /// The control opcode is not recognized by the device.
    #[error("unsupported control opcode {0:#x}")]
    Unsupported(u32),
    /// Failed to read a device-table file.
    #[error("failed to read device table {path}: {source}")]
    Read {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse a device-table file.
    #[error("failed to parse device table {path}: {source}")]
    Parse {
        /// Path of the malformed file.
        path: PathBuf,
        /// Underlying TOML failure.
        #[source]
        source: toml::de::Error,
    },
    /// A device entry fails validation.
    #[error("invalid device config: {0}")]
    InvalidConfig(String),
    /// The underlying channel rejected the operation.
    #[error(transparent)]
    Channel(#[from] nexus_fifo::Error),
}

/// Operation slots a device binds at registration time.
///
/// The slot set mirrors a character-device operations table: `open` and
/// `release` always succeed and default to no-ops, `poll` and `control`
/// default to [`Error::Unsupported`] for devices that leave those slots
/// unbound, and `shutdown` is the teardown hook the registry invokes when
/// the device is unregistered. There is no seek slot; these endpoints are
/// streams.
pub trait DeviceOps: Send + Sync {
    /// Attaches a new session. Always succeeds.
    fn open(&self) {}

    /// Detaches a session.
    fn release(&self) {}

    /// Transfers up to `buf.len()` bytes out of the device.
    fn read(&self, buf: &mut [u8], wait: Wait) -> Result<usize>;

    /// Transfers up to `data.len()` bytes into the device.
    fn write(&self, data: &[u8]) -> Result<usize>;

    /// Readiness query for multiplexed waits.
    fn poll(&self, interest: Readiness, wait: Wait) -> Result<Readiness> {
        let _ = (interest, wait);
        Err(Error::Unsupported(0))
    }

    /// Out-of-band control request writing its reply into `out`.
    fn control(&self, opcode: u32, out: &mut [u8]) -> Result<usize> {
        let _ = out;
        Err(Error::Unsupported(opcode))
    }

    /// Teardown hook invoked when the device is unregistered.
    fn shutdown(&self) {}
}
