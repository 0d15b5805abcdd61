use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use tracing::{debug, info};

use crate::device::{DeviceHandle, OpenMode};
use crate::error::{DeviceError, Result};
use crate::loopback::Loopback;
use crate::pattern::Pattern;

/// How many times the pattern is written by default.
pub const DEFAULT_REPEAT: usize = 2;
/// Upper bound on bytes collected by the read phase by default.
pub const DEFAULT_READ_LEN: usize = 1024;

const READ_CHUNK: usize = 4 * 1024;

/// Parameters for one write-then-read exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Bytes written on each write call.
    pub pattern: Pattern,
    /// Number of separate writes of `pattern`.
    pub repeat: usize,
    /// Maximum number of bytes to read back.
    pub read_len: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            pattern: Pattern::default(),
            repeat: DEFAULT_REPEAT,
            read_len: DEFAULT_READ_LEN,
        }
    }
}

/// What one exchange wrote and what the device returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeReport {
    pub path: PathBuf,
    /// Total bytes accepted during the write phase.
    pub written: usize,
    /// The byte stream that was written.
    pub sent: Bytes,
    /// Everything the read phase collected.
    pub received: Bytes,
}

impl ExchangeReport {
    /// Whether the read-back starts with exactly what was written.
    pub fn echoed(&self) -> bool {
        self.received.starts_with(&self.sent)
    }

    /// Bytes read after the echoed prefix; empty when nothing was echoed.
    pub fn trailing(&self) -> &[u8] {
        if self.echoed() {
            &self.received[self.sent.len()..]
        } else {
            &[]
        }
    }
}

/// Write `pattern` to `handle` as `repeat` separate writes.
///
/// Each write runs to completion; a short write resumes where it stopped.
/// Returns the number of bytes written.
pub fn write_phase<W: Write>(
    handle: &mut W,
    path: &Path,
    pattern: &Pattern,
    repeat: usize,
) -> Result<usize> {
    let mut total = 0usize;
    for _ in 0..repeat {
        let mut offset = 0usize;
        let bytes = pattern.as_bytes();
        while offset < bytes.len() {
            match handle.write(&bytes[offset..]) {
                Ok(0) => {
                    return Err(DeviceError::WriteZero {
                        path: path.to_path_buf(),
                        written: total + offset,
                    })
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(DeviceError::Write {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            }
        }
        total += offset;
    }

    loop {
        match handle.flush() {
            Ok(()) => break,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(DeviceError::Write {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    debug!(?path, total, repeat, "write phase complete");
    Ok(total)
}

/// Read from `handle` until `read_len` bytes are collected or it reports end
/// of data.
pub fn read_phase<R: Read>(handle: &mut R, path: &Path, read_len: usize) -> Result<Bytes> {
    let mut buf = BytesMut::zeroed(read_len);
    let mut filled = 0usize;
    while filled < read_len {
        let end = read_len.min(filled + READ_CHUNK);
        match handle.read(&mut buf[filled..end]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(DeviceError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
    buf.truncate(filled);
    debug!(?path, filled, read_len, "read phase complete");
    Ok(buf.freeze())
}

/// The write-then-read sequence.
///
/// Each phase opens its own handle and drops it before the next phase
/// starts. Failures propagate; nothing is retried.
pub struct Exchange;

impl Exchange {
    /// Run against a device path.
    pub fn run(path: impl AsRef<Path>, config: &ExchangeConfig) -> Result<ExchangeReport> {
        let path = path.as_ref();

        let written = {
            let mut handle = DeviceHandle::open_for_write(path)?;
            write_phase(&mut handle, path, &config.pattern, config.repeat)?
        };

        let received = {
            let mut handle = DeviceHandle::open_for_read(path)?;
            read_phase(&mut handle, path, config.read_len)?
        };

        Ok(Self::report(path, config, written, received))
    }

    /// Run against an in-memory [`Loopback`].
    pub fn run_loopback(loopback: &Loopback, config: &ExchangeConfig) -> Result<ExchangeReport> {
        let written = {
            let mut handle = loopback.open(OpenMode::Write);
            let path = handle.path().to_path_buf();
            write_phase(&mut handle, &path, &config.pattern, config.repeat)?
        };

        let mut handle = loopback.open(OpenMode::Read);
        let path = handle.path().to_path_buf();
        let received = read_phase(&mut handle, &path, config.read_len)?;
        drop(handle);

        Ok(Self::report(&path, config, written, received))
    }

    fn report(
        path: &Path,
        config: &ExchangeConfig,
        written: usize,
        received: Bytes,
    ) -> ExchangeReport {
        let report = ExchangeReport {
            path: path.to_path_buf(),
            written,
            sent: Bytes::from(config.pattern.repeated(config.repeat)),
            received,
        };
        info!(
            path = ?report.path,
            written = report.written,
            received = report.received.len(),
            echoed = report.echoed(),
            "exchange complete"
        );
        report
    }
}
