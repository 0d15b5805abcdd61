//! Probe a virtual I2C device node.
//!
//! Writes a raw byte pattern to a device path, reopens it, and reads back
//! whatever the device returns. See [`vi2c_io`] for the building blocks; the
//! `vi2c` binary (feature `cli`) wraps them in a command-line tool.

pub use vi2c_io::{
    describe, read_phase, write_phase, DeviceError, DeviceHandle, DeviceInfo, Exchange,
    ExchangeConfig, ExchangeReport, Loopback, OpenMode, Pattern, Result, DEFAULT_DEVICE_PATH,
    DEFAULT_READ_LEN, DEFAULT_REPEAT, LOOPBACK_CAPACITY,
};
