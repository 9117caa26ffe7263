// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared channel state and the blocking/wakeup protocol around the ring.

use std::time::Instant;

use log::{debug, info};
use parking_lot::{Condvar, Mutex};

use crate::ring::RingBuffer;
use crate::{Error, Readiness, Result, Wait};

/// Capacity of the canonical device channel, in bytes.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Mask applied to every byte at rest inside the ring.
const STORE_MASK: u8 = 0x55;

struct Shared {
    ring: RingBuffer,
    shutdown: bool,
}

impl Shared {
    fn readiness(&self) -> Readiness {
        let mut ready = Readiness::empty();
        if !self.ring.is_empty() {
            ready |= Readiness::READABLE;
        }
        if !self.ring.is_full() {
            ready |= Readiness::WRITABLE;
        }
        ready
    }
}

/// Fixed-capacity byte-stream endpoint shared by every opener of a device.
///
/// A single lock serializes the whole mutation body of [`read`](Self::read)
/// and [`write`](Self::write), including the byte copies. Sleeping waits
/// happen on a separate waiter queue and never hold the data lock while
/// suspended; [`shutdown`](Self::shutdown) wakes every sleeper with a typed
/// [`Error::Interrupted`] outcome.
pub struct Channel {
    shared: Mutex<Shared>,
    waiters: Condvar,
}

impl Channel {
    /// Creates a channel with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a channel holding at most `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shared: Mutex::new(Shared {
                ring: RingBuffer::with_capacity(capacity),
                shutdown: false,
            }),
            waiters: Condvar::new(),
        }
    }

    /// Appends as much of `data` as fits, masking each byte on the way in.
    ///
    /// A full ring accepts nothing and reports `Ok(0)`; waiters are woken in
    /// every case so pending pollers re-evaluate the state they sleep on.
    /// Returns [`Error::Interrupted`] once the channel is shut down.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let mut shared = self.shared.lock();
        if shared.shutdown {
            return Err(Error::Interrupted);
        }
        let wanted = data.len().min(shared.ring.available());
        let mut staged = data[..wanted].to_vec();
        for byte in &mut staged {
            *byte ^= STORE_MASK;
        }
        let accepted = shared.ring.push_slice(&staged);
        debug!("channel write: requested {}, accepted {accepted}", data.len());
        drop(shared);
        self.waiters.notify_all();
        Ok(accepted)
    }

    /// Removes up to `buf.len()` bytes into `buf`, reversing the store mask.
    ///
    /// On an empty ring the outcome follows `wait`: `NonBlocking` reports
    /// `Ok(0)`, `Blocking` sleeps until a writer supplies data, and
    /// `Timeout` sleeps at most that long before [`Error::TimedOut`].
    /// A shutdown wakes the sleep with [`Error::Interrupted`] and nothing
    /// consumed.
    pub fn read(&self, buf: &mut [u8], wait: Wait) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let deadline = wait.timeout().map(|timeout| Instant::now() + timeout);
        let mut shared = self.shared.lock();
        loop {
            if shared.shutdown {
                return Err(Error::Interrupted);
            }
            if !shared.ring.is_empty() {
                break;
            }
            if wait.is_non_blocking() {
                return Ok(0);
            }
            match deadline {
                Some(at) => {
                    if self.waiters.wait_until(&mut shared, at).timed_out()
                        && shared.ring.is_empty()
                        && !shared.shutdown
                    {
                        return Err(Error::TimedOut);
                    }
                }
                None => self.waiters.wait(&mut shared),
            }
        }
        let count = shared.ring.pop_slice(buf);
        for byte in &mut buf[..count] {
            *byte ^= STORE_MASK;
        }
        debug!("channel read: requested {}, drained {count}", buf.len());
        drop(shared);
        self.waiters.notify_all();
        Ok(count)
    }

    /// Non-suspending readiness snapshot.
    ///
    /// Idempotent: repeated calls with no intervening transfer agree.
    pub fn readiness(&self) -> Readiness {
        self.shared.lock().readiness()
    }

    /// Waits until the current readiness intersects `interest`.
    ///
    /// `NonBlocking` returns the current snapshot immediately whether or not
    /// the interest is satisfied, which is what a multiplexed-wait caller
    /// uses to register and sample in one step.
    pub fn poll_wait(&self, interest: Readiness, wait: Wait) -> Result<Readiness> {
        let deadline = wait.timeout().map(|timeout| Instant::now() + timeout);
        let mut shared = self.shared.lock();
        loop {
            if shared.shutdown {
                return Err(Error::Interrupted);
            }
            let current = shared.readiness();
            if wait.is_non_blocking() || current.intersects(interest) {
                return Ok(current);
            }
            match deadline {
                Some(at) => {
                    if self.waiters.wait_until(&mut shared, at).timed_out()
                        && !shared.readiness().intersects(interest)
                        && !shared.shutdown
                    {
                        return Err(Error::TimedOut);
                    }
                }
                None => self.waiters.wait(&mut shared),
            }
        }
    }

    /// Occupancy snapshot taken under the data lock.
    pub fn occupancy(&self) -> usize {
        self.shared.lock().ring.len()
    }

    /// Total byte capacity of the channel.
    pub fn capacity(&self) -> usize {
        self.shared.lock().ring.capacity()
    }

    /// Marks the channel down and wakes every sleeping reader and poller.
    ///
    /// Called at device-unregistration time; subsequent writes and sleeping
    /// waits report [`Error::Interrupted`]. Idempotent.
    pub fn shutdown(&self) {
        let mut shared = self.shared.lock();
        if !shared.shutdown {
            shared.shutdown = true;
            info!("channel shut down with {} unread bytes", shared.ring.len());
        }
        drop(shared);
        self.waiters.notify_all();
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}
