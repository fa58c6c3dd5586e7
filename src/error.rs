// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

///
///SCD30 error enum. Transport failures carry the
///underlying io error, protocol failures describe
///what the device sent back.
///
#[derive(Debug, Error)]
pub enum Scd30Error {
    /// The bus device node could not be opened or the address could not be bound
    #[error("failed to open {} for address {address:#04x}: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        address: u8,
        #[source]
        source: io::Error,
    },
    /// A command frame could not be written
    #[error("write to device failed: {0}")]
    WriteFailed(#[source] io::Error),
    /// A response could not be read
    #[error("read from device failed: {0}")]
    ReadFailed(#[source] io::Error),
    /// A response word failed its CRC-8 check
    #[error("checksum mismatch on response word {word}: expected {expected:#04x}, received {received:#04x}")]
    ChecksumInvalid { word: usize, expected: u8, received: u8 },
    /// A setter read back a different value than it wrote
    #[error("device did not accept the value: wrote {written}, read back {read_back}")]
    VerificationMismatch { written: u16, read_back: u16 },
    /// An argument was rejected before any bus traffic
    #[error("{name} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: u16,
        min: u16,
        max: u16,
    },
    /// The device did not report data ready in time
    #[error("no measurement ready after {0:?}")]
    Timeout(Duration),
    /// A configuration value could not be parsed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Scd30Error>;
