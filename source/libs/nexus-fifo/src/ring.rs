// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Circular byte buffer with explicit occupancy tracking.

/// Fixed-capacity circular byte buffer.
///
/// The write cursor (`head`) and read cursor (`tail`) wrap modulo the
/// capacity; `occupied` counts the valid unread bytes between them, so a
/// full buffer and an empty buffer are distinguishable even though both
/// have `head == tail`.
#[derive(Debug)]
pub struct RingBuffer {
    storage: Box<[u8]>,
    head: usize,
    tail: usize,
    occupied: usize,
}

impl RingBuffer {
    /// Creates a buffer holding at most `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is zero; a zero-capacity ring can never make
    /// progress in either direction.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            occupied: 0,
        }
    }

    /// Total number of bytes the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of valid unread bytes currently stored.
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns `true` when no unread bytes are stored.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Returns `true` when no free capacity remains.
    pub fn is_full(&self) -> bool {
        self.occupied == self.capacity()
    }

    /// Number of bytes that can still be appended.
    pub fn available(&self) -> usize {
        self.capacity() - self.occupied
    }

    /// Appends as much of `data` as fits, returning the accepted count.
    ///
    /// The copy wraps at the end of storage, so an append may land as two
    /// segments: `[head..capacity)` then `[0..remainder)`.
    pub fn push_slice(&mut self, data: &[u8]) -> usize {
        let accepted = data.len().min(self.available());
        if accepted == 0 {
            return 0;
        }
        let first = accepted.min(self.capacity() - self.head);
        self.storage[self.head..self.head + first].copy_from_slice(&data[..first]);
        self.storage[..accepted - first].copy_from_slice(&data[first..accepted]);
        self.head = (self.head + accepted) % self.capacity();
        self.occupied += accepted;
        accepted
    }

    /// Removes up to `out.len()` bytes into `out`, returning the count.
    ///
    /// Mirrors [`push_slice`](Self::push_slice): the copy out of storage may
    /// span the wrap point and land as two segments.
    pub fn pop_slice(&mut self, out: &mut [u8]) -> usize {
        let count = out.len().min(self.occupied);
        if count == 0 {
            return 0;
        }
        let first = count.min(self.capacity() - self.tail);
        out[..first].copy_from_slice(&self.storage[self.tail..self.tail + first]);
        out[first..count].copy_from_slice(&self.storage[..count - first]);
        self.tail = (self.tail + count) % self.capacity();
        self.occupied -= count;
        count
    }
}
