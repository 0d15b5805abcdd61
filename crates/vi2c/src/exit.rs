use std::fmt;
use std::io;

use vi2c_io::DeviceError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DEVICE_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const USAGE: i32 = 64;
pub const NO_SPACE: i32 = 74;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::StorageFull => NO_SPACE,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        _ => DEVICE_ERROR,
    }
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(&err), format!("{context}: {err}"))
}

pub fn device_error(context: &str, err: DeviceError) -> CliError {
    let code = match &err {
        DeviceError::InvalidPattern(_) => USAGE,
        DeviceError::WriteZero { .. } => DEVICE_ERROR,
        other => other.io_source().map(io_code).unwrap_or(INTERNAL),
    };
    CliError::new(code, format!("{context}: {err}"))
}
