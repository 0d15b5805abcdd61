//! Scoped write/read exchanges against a virtual I2C character device.
//!
//! The exchange is deliberately plain: open the device node for writing, push
//! a byte pattern a few times with no framing, close; reopen for reading,
//! pull back whatever the device hands out, close. What comes back is defined
//! by the device, not by this crate.
//!
//! - [`device`]: scoped handles over a device path (or a [`Loopback`])
//! - [`pattern`]: the raw byte pattern and its hex notation
//! - [`exchange`]: the write phase, the read phase, and the report
//! - [`loopback`]: in-memory stand-in with the virtual device's semantics

pub mod device;
pub mod error;
pub mod exchange;
pub mod loopback;
pub mod pattern;

pub use device::{describe, DeviceHandle, DeviceInfo, OpenMode, DEFAULT_DEVICE_PATH};
pub use error::{DeviceError, Result};
pub use exchange::{
    read_phase, write_phase, Exchange, ExchangeConfig, ExchangeReport, DEFAULT_READ_LEN,
    DEFAULT_REPEAT,
};
pub use loopback::{Loopback, LOOPBACK_CAPACITY};
pub use pattern::Pattern;
