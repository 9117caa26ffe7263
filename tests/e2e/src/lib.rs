// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::sync::Arc;

use nexus_devfs::{DeviceConfig, DeviceRegistry};

/// Name every scenario registers its demo device under.
pub const DEVICE_NAME: &str = "fifo0";

/// Creates a registry holding one channel device of `capacity` bytes.
pub fn registry_with_device(capacity: usize) -> Arc<DeviceRegistry> {
    let registry = DeviceRegistry::new();
    registry
        .register_channel(&DeviceConfig::new(DEVICE_NAME, capacity))
        .expect("register demo device");
    Arc::new(registry)
}
