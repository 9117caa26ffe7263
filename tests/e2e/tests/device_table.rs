// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::io::Write as _;

use nexus_devfs::{DeviceRegistry, DeviceTable, Wait};

#[test]
fn table_file_brings_up_every_device() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("devices.toml");
    let mut file = std::fs::File::create(&path).expect("create table");
    writeln!(file, "[[devices]]\nname = 'fifo0'\ncapacity = 64").expect("write");
    writeln!(file, "[[devices]]\nname = 'fifo1'").expect("write");

    let table = DeviceTable::load(&path).expect("load table");
    let registry = DeviceRegistry::new();
    for entry in &table.devices {
        registry.register_channel(entry).expect("register");
    }
    assert_eq!(registry.device_count(), 2);

    let small = registry.open("fifo0").expect("open fifo0");
    let large = registry.open("fifo1").expect("open fifo1");
    assert_eq!(small.write(&vec![1u8; 100]).expect("write"), 64);
    assert_eq!(large.write(&vec![1u8; 100]).expect("write"), 100);

    let mut buf = [0u8; 128];
    assert_eq!(small.read(&mut buf, Wait::NonBlocking).expect("read"), 64);
}

#[test]
fn malformed_table_is_rejected() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("devices.toml");
    let mut file = std::fs::File::create(&path).expect("create table");
    writeln!(file, "[[devices]]\ncapacity = 64").expect("write");

    assert!(matches!(
        DeviceTable::load(&path),
        Err(nexus_devfs::Error::Parse { .. })
    ));
}
