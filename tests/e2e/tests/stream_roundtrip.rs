// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

use chardev_e2e::{registry_with_device, DEVICE_NAME};
use nexus_devfs::{Readiness, Wait, OCCUPANCY_BYTES, OPCODE_OCCUPANCY};
use rand::Rng;

fn occupancy(handle: &nexus_devfs::DeviceHandle) -> u64 {
    let mut out = [0u8; OCCUPANCY_BYTES];
    handle
        .control(OPCODE_OCCUPANCY, &mut out)
        .expect("occupancy control");
    u64::from_le_bytes(out)
}

#[test]
fn interleaved_stream_preserves_submission_order() {
    let registry = registry_with_device(32);
    let handle = registry.open(DEVICE_NAME).expect("open");
    let mut rng = rand::thread_rng();
    let mut expected = Vec::new();
    let mut observed = Vec::new();

    for _ in 0..64 {
        let chunk: Vec<u8> = (0..rng.gen_range(1..8)).map(|_| rng.gen()).collect();
        let accepted = handle.write(&chunk).expect("write");
        expected.extend_from_slice(&chunk[..accepted]);

        let mut out = [0u8; 5];
        let drained = handle.read(&mut out, Wait::NonBlocking).expect("read");
        observed.extend_from_slice(&out[..drained]);
    }
    let mut rest = [0u8; 32];
    loop {
        let drained = handle.read(&mut rest, Wait::NonBlocking).expect("drain");
        if drained == 0 {
            break;
        }
        observed.extend_from_slice(&rest[..drained]);
    }

    assert_eq!(observed, expected);
}

#[test]
fn accounting_matches_accepted_transfers() {
    let registry = registry_with_device(16);
    let handle = registry.open(DEVICE_NAME).expect("open");
    let mut written = 0u64;
    let mut drained = 0u64;

    for round in 0..20 {
        written += handle.write(&vec![round as u8; 7]).expect("write") as u64;
        let mut out = [0u8; 3];
        drained += handle.read(&mut out, Wait::NonBlocking).expect("read") as u64;
        assert_eq!(occupancy(&handle), written - drained);
        assert!(occupancy(&handle) <= 16);
    }
}

#[test]
fn capacity_scenario_round_trips_through_the_mask() {
    let registry = registry_with_device(4096);
    let handle = registry.open(DEVICE_NAME).expect("open");

    let data = vec![0xAAu8; 4096];
    assert_eq!(handle.write(&data).expect("fill"), 4096);

    // One more byte finds the device full: zero accepted, not an error.
    assert_eq!(handle.write(&[0xAA]).expect("overfill"), 0);
    assert_eq!(occupancy(&handle), 4096);
    assert_eq!(
        handle.poll(Readiness::READABLE, Wait::NonBlocking).expect("poll"),
        Readiness::READABLE
    );

    let mut out = vec![0u8; 4096];
    assert_eq!(handle.read(&mut out, Wait::NonBlocking).expect("drain"), 4096);
    assert!(out.iter().all(|byte| *byte == 0xAA));
    assert_eq!(occupancy(&handle), 0);
}

#[test]
fn readiness_is_idempotent_between_transfers() {
    let registry = registry_with_device(8);
    let handle = registry.open(DEVICE_NAME).expect("open");
    handle.write(b"ab").expect("write");

    let first = handle.poll(Readiness::all(), Wait::NonBlocking).expect("poll");
    let second = handle.poll(Readiness::all(), Wait::NonBlocking).expect("poll");
    assert_eq!(first, second);
    assert_eq!(first, Readiness::READABLE | Readiness::WRITABLE);
}

#[test]
fn control_surface_rejects_bad_requests() {
    let registry = registry_with_device(8);
    let handle = registry.open(DEVICE_NAME).expect("open");

    let mut short = [0u8; OCCUPANCY_BYTES - 1];
    assert!(matches!(
        handle.control(OPCODE_OCCUPANCY, &mut short),
        Err(nexus_devfs::Error::Fault)
    ));

    let mut out = [0u8; OCCUPANCY_BYTES];
    assert!(matches!(
        handle.control(0x7f, &mut out),
        Err(nexus_devfs::Error::Unsupported(0x7f))
    ));
}
