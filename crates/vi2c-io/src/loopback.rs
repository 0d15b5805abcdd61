//! In-memory stand-in for the virtual I2C device.
//!
//! Reproduces what a process observes through `/dev/vI2C`: one fixed-size,
//! zero-initialised buffer shared by every open, and a per-open position that
//! starts at zero. Reads hand out the buffer up to its end regardless of how
//! much was written; writes past the end fail with `ENOSPC`.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;

use crate::device::{DeviceHandle, OpenMode};

/// Size of the virtual device's buffer.
pub const LOOPBACK_CAPACITY: usize = 1024;

/// Shared buffer with the virtual device's read/write semantics.
#[derive(Clone, Debug)]
pub struct Loopback {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Loopback {
    /// A zeroed buffer of [`LOOPBACK_CAPACITY`] bytes.
    pub fn new() -> Self {
        Self::with_capacity(LOOPBACK_CAPACITY)
    }

    /// A zeroed buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(vec![0; capacity])),
        }
    }

    /// Open a new handle positioned at the start of the buffer.
    pub fn open(&self, mode: OpenMode) -> DeviceHandle {
        DeviceHandle::from_loopback(
            LoopbackHandle {
                buffer: Arc::clone(&self.buffer),
                pos: 0,
            },
            mode,
        )
    }

    /// Buffer size in bytes.
    pub fn capacity(&self) -> usize {
        lock(&self.buffer).len()
    }

    /// Copy of the current buffer contents.
    pub fn snapshot(&self) -> Vec<u8> {
        lock(&self.buffer).clone()
    }
}

impl Default for Loopback {
    fn default() -> Self {
        Self::new()
    }
}

/// One open of a [`Loopback`]; carries its own position.
pub(crate) struct LoopbackHandle {
    buffer: Arc<Mutex<Vec<u8>>>,
    pos: usize,
}

impl io::Read for LoopbackHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let inner = lock(&self.buffer);
        let count = buf.len().min(inner.len().saturating_sub(self.pos));
        if count == 0 {
            return Ok(0);
        }
        buf[..count].copy_from_slice(&inner[self.pos..self.pos + count]);
        trace!(pos = self.pos, count, "loopback read");
        self.pos += count;
        Ok(count)
    }
}

impl io::Write for LoopbackHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = lock(&self.buffer);
        let count = buf.len().min(inner.len().saturating_sub(self.pos));
        if count == 0 {
            return Err(no_space());
        }
        inner[self.pos..self.pos + count].copy_from_slice(&buf[..count]);
        trace!(pos = self.pos, count, "loopback write");
        self.pos += count;
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// A poisoned lock still holds a consistent byte buffer.
fn lock(buffer: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(unix)]
fn no_space() -> io::Error {
    io::Error::from_raw_os_error(libc::ENOSPC)
}

#[cfg(not(unix))]
fn no_space() -> io::Error {
    io::Error::new(io::ErrorKind::StorageFull, "no space left on device")
}
