use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DeviceError, Result};
use crate::loopback::LoopbackHandle;

/// Device node the virtual I2C module registers.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/vI2C";

/// Direction a handle was opened for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenMode::Read => f.write_str("read"),
            OpenMode::Write => f.write_str("write"),
        }
    }
}

/// A scoped, open handle on a device node.
///
/// Implements `Read + Write`. The descriptor is released when the handle is
/// dropped, so each phase of an exchange owns exactly one handle.
pub struct DeviceHandle {
    inner: HandleInner,
    path: PathBuf,
    mode: OpenMode,
}

enum HandleInner {
    File { file: File, char_device: bool },
    Loopback(LoopbackHandle),
}

impl DeviceHandle {
    /// Open `path` for writing.
    ///
    /// Creates and truncates like a binary write-mode open. Both are no-ops on
    /// a character device; they matter when a regular file stands in for one.
    pub fn open_for_write(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|source| DeviceError::Open {
                path: path.to_path_buf(),
                mode: OpenMode::Write,
                source,
            })?;
        Ok(Self::from_file(file, path, OpenMode::Write))
    }

    /// Open `path` for reading.
    pub fn open_for_read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|source| DeviceError::Open {
                path: path.to_path_buf(),
                mode: OpenMode::Read,
                source,
            })?;
        Ok(Self::from_file(file, path, OpenMode::Read))
    }

    fn from_file(file: File, path: &Path, mode: OpenMode) -> Self {
        let char_device = is_char_device(&file);
        debug!(?path, %mode, char_device, "opened device");
        Self {
            inner: HandleInner::File { file, char_device },
            path: path.to_path_buf(),
            mode,
        }
    }

    pub(crate) fn from_loopback(handle: LoopbackHandle, mode: OpenMode) -> Self {
        let path = PathBuf::from("loopback");
        debug!(?path, %mode, "opened device");
        Self {
            inner: HandleInner::Loopback(handle),
            path,
            mode,
        }
    }

    /// The path this handle was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Direction this handle was opened for.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Backend name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match &self.inner {
            HandleInner::File {
                char_device: true, ..
            } => "char-device",
            HandleInner::File { .. } => "file",
            HandleInner::Loopback(_) => "loopback",
        }
    }
}

impl Read for DeviceHandle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            HandleInner::File { file, .. } => file.read(buf),
            HandleInner::Loopback(handle) => handle.read(buf),
        }
    }
}

impl Write for DeviceHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            HandleInner::File { file, .. } => file.write(buf),
            HandleInner::Loopback(handle) => handle.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            HandleInner::File { file, .. } => file.flush(),
            HandleInner::Loopback(_) => Ok(()),
        }
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        debug!(path = ?self.path, mode = %self.mode, "closed device");
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("kind", &self.kind())
            .finish()
    }
}

#[cfg(unix)]
fn is_char_device(file: &File) -> bool {
    use std::os::unix::fs::FileTypeExt;

    file.metadata()
        .map(|m| m.file_type().is_char_device())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_char_device(_file: &File) -> bool {
    false
}

/// What the filesystem says about a device path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub path: PathBuf,
    pub exists: bool,
    pub char_device: bool,
    /// `(major, minor)` for character devices (Linux only).
    pub device_number: Option<(u32, u32)>,
    pub readable: bool,
    pub writable: bool,
}

/// Stat `path` without opening it.
pub fn describe(path: impl AsRef<Path>) -> DeviceInfo {
    let path = path.as_ref();
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) => {
            debug!(?path, %err, "device path not accessible");
            return DeviceInfo {
                path: path.to_path_buf(),
                exists: false,
                char_device: false,
                device_number: None,
                readable: false,
                writable: false,
            };
        }
    };

    let (char_device, device_number) = node_identity(&metadata);

    DeviceInfo {
        path: path.to_path_buf(),
        exists: true,
        char_device,
        device_number,
        readable: accessible(path, OpenMode::Read),
        writable: accessible(path, OpenMode::Write),
    }
}

#[cfg(unix)]
fn node_identity(metadata: &std::fs::Metadata) -> (bool, Option<(u32, u32)>) {
    use std::os::unix::fs::FileTypeExt;

    let char_device = metadata.file_type().is_char_device();
    if !char_device {
        return (false, None);
    }
    (true, device_number(metadata))
}

#[cfg(target_os = "linux")]
fn device_number(metadata: &std::fs::Metadata) -> Option<(u32, u32)> {
    use std::os::unix::fs::MetadataExt;

    let rdev = metadata.rdev() as libc::dev_t;
    Some((libc::major(rdev), libc::minor(rdev)))
}

#[cfg(all(unix, not(target_os = "linux")))]
fn device_number(_metadata: &std::fs::Metadata) -> Option<(u32, u32)> {
    None
}

#[cfg(not(unix))]
fn node_identity(_metadata: &std::fs::Metadata) -> (bool, Option<(u32, u32)>) {
    (false, None)
}

#[cfg(unix)]
fn accessible(path: &Path, mode: OpenMode) -> bool {
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = std::ffi::CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    let flag = match mode {
        OpenMode::Read => libc::R_OK,
        OpenMode::Write => libc::W_OK,
    };
    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    unsafe { libc::access(c_path.as_ptr(), flag) == 0 }
}

#[cfg(not(unix))]
fn accessible(path: &Path, mode: OpenMode) -> bool {
    match mode {
        OpenMode::Read => File::open(path).is_ok(),
        OpenMode::Write => OpenOptions::new().write(true).open(path).is_ok(),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn unique_temp_path(tag: &str) -> PathBuf {
        PathBuf::from(format!(
            "/tmp/vi2c-device-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ))
    }

    #[test]
    fn write_then_read_regular_file() {
        let path = unique_temp_path("rw");
        {
            let mut handle = DeviceHandle::open_for_write(&path).expect("open for write");
            assert_eq!(handle.kind(), "file");
            assert_eq!(handle.mode(), OpenMode::Write);
            handle.write_all(&[1, 2, 3]).expect("write");
        }
        let mut handle = DeviceHandle::open_for_read(&path).expect("open for read");
        let mut data = Vec::new();
        handle.read_to_end(&mut data).expect("read");
        assert_eq!(data, vec![1, 2, 3]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn open_for_write_truncates() {
        let path = unique_temp_path("trunc");
        std::fs::write(&path, b"previous contents").expect("seed file");
        drop(DeviceHandle::open_for_write(&path).expect("open for write"));
        assert_eq!(std::fs::read(&path).expect("read back").len(), 0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn open_missing_path_for_read_reports_open_error() {
        let path = unique_temp_path("missing");
        let err = DeviceHandle::open_for_read(&path).expect_err("missing path should fail");
        match err {
            DeviceError::Open { mode, source, .. } => {
                assert_eq!(mode, OpenMode::Read);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn describe_dev_null_is_char_device() {
        let info = describe("/dev/null");
        assert!(info.exists);
        assert!(info.char_device);
        #[cfg(target_os = "linux")]
        assert_eq!(info.device_number, Some((1, 3)));
        assert!(info.readable);
        assert!(info.writable);
    }

    #[test]
    fn describe_missing_path() {
        let info = describe(unique_temp_path("absent"));
        assert!(!info.exists);
        assert!(!info.char_device);
        assert!(!info.readable);
    }

    #[test]
    fn describe_regular_file_is_not_char_device() {
        let path = unique_temp_path("regular");
        std::fs::write(&path, b"x").expect("seed file");
        let info = describe(&path);
        assert!(info.exists);
        assert!(!info.char_device);
        assert_eq!(info.device_number, None);
        let _ = std::fs::remove_file(&path);
    }
}
