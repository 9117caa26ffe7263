// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Sample client exercising a registered byte-stream device
//!
//! Demonstrates the device surface end to end: bounded writer and reader
//! runs, a poller that sleeps until data arrives, the occupancy control
//! query, and a threaded writer/reader exchange sharing one device.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::info;
use nexus_devfs::{
    DeviceConfig, DeviceRegistry, Readiness, Wait, OCCUPANCY_BYTES, OPCODE_OCCUPANCY,
};
use rand::{distributions::Alphanumeric, Rng};

const DEVICE_NAME: &str = "fifo0";
const PAYLOAD_LEN: usize = 36;
const PAYLOAD_COUNT: usize = 8;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = args.first().map(String::as_str).unwrap_or("help");
    if let Err(err) = run(mode) {
        eprintln!("devio: {err}");
        std::process::exit(1);
    }
}

fn run(mode: &str) -> nexus_devfs::Result<()> {
    match mode {
        "write" => run_writer(),
        "read" => run_reader(),
        "poll" => run_poller(),
        "stat" => run_stat(),
        "demo" => run_demo(),
        _ => {
            println!("{}", help());
            Ok(())
        }
    }
}

fn help() -> &'static str {
    "devio exercises a registered byte-stream device.\n\
     Usage: devio [write|read|poll|stat|demo]"
}

fn demo_registry() -> nexus_devfs::Result<DeviceRegistry> {
    let registry = DeviceRegistry::new();
    registry.register_channel(&DeviceConfig::new(DEVICE_NAME, 4096))?;
    Ok(registry)
}

fn payload() -> Vec<u8> {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PAYLOAD_LEN)
        .collect()
}

fn occupancy(handle: &nexus_devfs::DeviceHandle) -> nexus_devfs::Result<u64> {
    let mut out = [0u8; OCCUPANCY_BYTES];
    handle.control(OPCODE_OCCUPANCY, &mut out)?;
    Ok(u64::from_le_bytes(out))
}

fn run_writer() -> nexus_devfs::Result<()> {
    let registry = demo_registry()?;
    let handle = registry.open(DEVICE_NAME)?;
    for _ in 0..PAYLOAD_COUNT {
        let data = payload();
        let accepted = handle.write(&data)?;
        if accepted == 0 {
            println!("device full, nothing accepted");
        } else {
            println!("wrote {accepted} bytes: {}", String::from_utf8_lossy(&data));
        }
    }
    println!("occupancy now {}", occupancy(&handle)?);
    Ok(())
}

fn run_reader() -> nexus_devfs::Result<()> {
    let registry = demo_registry()?;
    let handle = registry.open(DEVICE_NAME)?;
    let mut buf = [0u8; 4096];
    let count = handle.read(&mut buf, Wait::NonBlocking)?;
    if count == 0 {
        println!("there is no data now");
    } else {
        println!("read {count} bytes: {}", String::from_utf8_lossy(&buf[..count]));
    }
    Ok(())
}

fn run_poller() -> nexus_devfs::Result<()> {
    let registry = Arc::new(demo_registry()?);
    let writer_registry = registry.clone();
    let writer = thread::spawn(move || -> nexus_devfs::Result<usize> {
        thread::sleep(Duration::from_millis(200));
        let handle = writer_registry.open(DEVICE_NAME)?;
        handle.write(&payload())
    });

    let handle = registry.open(DEVICE_NAME)?;
    println!("waiting for the device to become readable");
    let ready = handle.poll(Readiness::READABLE, Wait::Blocking)?;
    info!("poll returned {ready:?}");
    let mut buf = [0u8; 4096];
    let count = handle.read(&mut buf, Wait::NonBlocking)?;
    println!("woke up, read {count} bytes: {}", String::from_utf8_lossy(&buf[..count]));
    writer.join().expect("writer thread")?;
    Ok(())
}

fn run_stat() -> nexus_devfs::Result<()> {
    let registry = demo_registry()?;
    let handle = registry.open(DEVICE_NAME)?;
    handle.write(&payload())?;
    handle.write(&payload())?;
    println!("current occupancy is {}", occupancy(&handle)?);
    Ok(())
}

fn run_demo() -> nexus_devfs::Result<()> {
    let registry = Arc::new(demo_registry()?);
    let expected = PAYLOAD_LEN * PAYLOAD_COUNT;

    let writer_registry = registry.clone();
    let writer = thread::spawn(move || -> nexus_devfs::Result<()> {
        let handle = writer_registry.open(DEVICE_NAME)?;
        for _ in 0..PAYLOAD_COUNT {
            let data = payload();
            let accepted = handle.write(&data)?;
            println!("writer: pushed {accepted} bytes");
            thread::sleep(Duration::from_millis(10));
        }
        Ok(())
    });

    let reader_registry = registry.clone();
    let reader = thread::spawn(move || -> nexus_devfs::Result<usize> {
        let handle = reader_registry.open(DEVICE_NAME)?;
        let mut received = 0;
        let mut buf = [0u8; 4096];
        while received < expected {
            let count = handle.read(&mut buf, Wait::Blocking)?;
            println!("reader: drained {count} bytes: {}", String::from_utf8_lossy(&buf[..count]));
            received += count;
        }
        Ok(received)
    });

    writer.join().expect("writer thread")?;
    let received = reader.join().expect("reader thread")?;
    println!("demo complete, {received} bytes end to end");
    registry.unregister(DEVICE_NAME)?;
    Ok(())
}
