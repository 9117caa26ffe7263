// Copyright 2025 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bounded byte-stream channel shared by character-device endpoints.
//!
//! One [`Channel`] backs one device node: every opener reads from and writes
//! into the same fixed-capacity ring, producers wake sleeping consumers, and
//! pollers observe readiness without consuming data. Stored bytes carry a
//! reversible XOR mask so the at-rest form never matches the submitted form;
//! the mask is reversed on the way out and callers always get their bytes
//! back unchanged.

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]

use core::fmt;
use core::time::Duration;

use bitflags::bitflags;

mod chan;
mod ring;

pub use chan::{Channel, DEFAULT_CAPACITY};
pub use ring::RingBuffer;

/// Result type returned by channel operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Behaviour of a call that may have to sleep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wait {
    /// Sleep until the operation can make progress.
    Blocking,
    /// Return immediately when no progress can be made.
    NonBlocking,
    /// Sleep until progress is possible or the timeout expires.
    Timeout(Duration),
}

impl Wait {
    /// Returns `true` when the caller requested a non-blocking attempt.
    pub const fn is_non_blocking(self) -> bool {
        matches!(self, Self::NonBlocking)
    }

    /// Converts a [`Wait::Timeout`] variant into its [`Duration`].
    pub const fn timeout(self) -> Option<Duration> {
        match self {
            Self::Timeout(duration) => Some(duration),
            Self::Blocking | Self::NonBlocking => None,
        }
    }
}

bitflags! {
    /// Readiness of a channel endpoint, as reported to pollers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Readiness: u8 {
        /// Unread bytes are stored and a read would make progress.
        const READABLE = 0x1;
        /// Free capacity remains and a write would make progress.
        const WRITABLE = 0x2;
    }
}

/// Errors produced by channel operations.
///
/// A zero-length transfer is not an error: a full buffer on write and an
/// empty buffer on a non-blocking read both report `Ok(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A sleeping wait was aborted because the channel was shut down.
    Interrupted,
    /// A bounded wait expired before the operation could make progress.
    TimedOut,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted => f.write_str("wait interrupted by shutdown"),
            Self::TimedOut => f.write_str("wait timed out"),
        }
    }
}

impl std::error::Error for Error {}
