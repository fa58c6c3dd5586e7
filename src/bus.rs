// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Raw byte transport to a single device address.

use crate::error::{Result, Scd30Error};
use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;
use std::io;
use std::path::Path;

/// Well known I2C address of the SCD30
pub const DEFAULT_ADDRESS: u8 = 0x61;
/// Bus the sensor is usually wired to on a Raspberry Pi
pub const DEFAULT_PATH: &str = "/dev/i2c-1";

/// Exclusive byte pipe to one device.
///
/// Implementations neither buffer nor retry: `write` sends all of `bytes`
/// in one bus transfer and `read` fills all of `buf` or fails.
pub trait Transport {
    /// Sends all of `bytes` to the device.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
    /// Fills `buf` from the device.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<()>;
}

impl Transport for LinuxI2CDevice {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        I2CDevice::write(self, bytes).map_err(io::Error::other)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<()> {
        I2CDevice::read(self, buf).map_err(io::Error::other)
    }
}

/// Opens the bus device node at `path` and binds it to `address`.
///
/// Either both steps succeed or `OpenFailed` is returned, a half
/// configured handle is never handed out.
pub fn open<P: AsRef<Path>>(path: P, address: u8) -> Result<LinuxI2CDevice> {
    let path = path.as_ref();
    LinuxI2CDevice::new(path, u16::from(address)).map_err(|e| Scd30Error::OpenFailed {
        path: path.to_path_buf(),
        address,
        source: io::Error::other(e),
    })
}

/// Writes a whole frame, mapping any failure to `WriteFailed`.
pub(crate) fn write_frame<T: Transport + ?Sized>(transport: &mut T, bytes: &[u8]) -> Result<()> {
    log::trace!("-> {:02x?}", bytes);
    transport.write(bytes).map_err(Scd30Error::WriteFailed)
}

/// Reads exactly `N` bytes, mapping any failure to `ReadFailed`.
pub(crate) fn read_exact<T: Transport + ?Sized, const N: usize>(transport: &mut T) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    transport.read(&mut buf).map_err(Scd30Error::ReadFailed)?;
    log::trace!("<- {:02x?}", buf);
    Ok(buf)
}
