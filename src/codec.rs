// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Command framing and response words.
//!
//! A request is the 16 bit command, big endian, optionally followed by a
//! 16 bit argument and the CRC-8 of the argument bytes. A reply is a run
//! of 3 byte words, two data bytes followed by their CRC-8.

use crate::bus::{self, Transport};
use crate::crc::{compute_checksum, validate};
use crate::error::{Result, Scd30Error};

/// SCD30 command set.
///
/// Several getters are the bare form of the setter command, e.g. sending
/// `SetMeasurementInterval` without argument reads the interval back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Command {
    /// Argument: ambient pressure in mbar, 0 disables compensation
    StartContinuousMeasurement = 0x0010,
    StopContinuousMeasurement = 0x0104,
    /// Argument: seconds between measurements, 2 to 1800
    SetMeasurementInterval = 0x4600,
    GetDataReadyStatus = 0x0202,
    ReadMeasurement = 0x0300,
    /// Argument: 1 enables, 0 disables
    SetAutomaticSelfCalibration = 0x5306,
    /// Argument: reference CO2 concentration in ppm
    SetForcedRecalibrationValue = 0x5204,
    /// Argument: offset in ticks of 0.01 Celsius
    SetTemperatureOffset = 0x5403,
    /// Argument: meters above sea level
    SetAltitudeCompensation = 0x5102,
    ReadFirmwareVersion = 0xD100,
    SoftReset = 0xD304,
}

impl Command {
    /// Command code as sent on the wire.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Two byte frame of a bare command.
    pub fn encode(self) -> [u8; 2] {
        self.code().to_be_bytes()
    }

    /// Five byte frame of a command with argument. The checksum covers
    /// the argument only.
    pub fn encode_with_arg(self, arg: u16) -> [u8; 5] {
        let cmd = self.encode();
        let arg = arg.to_be_bytes();
        [cmd[0], cmd[1], arg[0], arg[1], compute_checksum(&arg)]
    }
}

/// One response word as received: two data bytes and their checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
    pub data: [u8; 2],
    pub checksum: u8,
}

impl Word {
    pub const LEN: usize = 3;

    /// Splits a received 3 byte word into data and checksum.
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Word {
            data: [bytes[0], bytes[1]],
            checksum: bytes[2],
        }
    }

    /// True if the checksum matches the data bytes.
    pub fn is_valid(&self) -> bool {
        validate(&self.data, self.checksum)
    }

    /// Data bytes as a big endian u16.
    pub fn value(&self) -> u16 {
        u16::from_be_bytes(self.data)
    }

    /// Returns the word if its checksum holds, `index` names it in the error.
    pub fn checked(self, index: usize) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(Scd30Error::ChecksumInvalid {
                word: index,
                expected: compute_checksum(&self.data),
                received: self.checksum,
            })
        }
    }
}

/// Writes a bare command.
pub fn send_command<T: Transport + ?Sized>(transport: &mut T, cmd: Command) -> Result<()> {
    bus::write_frame(transport, &cmd.encode())
}

/// Writes a command, its argument and the argument checksum in one transfer.
pub fn send_command_with_arg<T: Transport + ?Sized>(transport: &mut T, cmd: Command, arg: u16) -> Result<()> {
    bus::write_frame(transport, &cmd.encode_with_arg(arg))
}

/// Reads a single response word. Checksum validity is reported, not enforced.
pub fn read_word<T: Transport + ?Sized>(transport: &mut T) -> Result<Word> {
    let bytes: [u8; Word::LEN] = bus::read_exact(transport)?;
    Ok(Word::from_bytes(bytes))
}

/// Reads six consecutive words in a single bus read.
pub fn read_six_words<T: Transport + ?Sized>(transport: &mut T) -> Result<[Word; 6]> {
    let bytes: [u8; 6 * Word::LEN] = bus::read_exact(transport)?;
    let mut words = [Word { data: [0; 2], checksum: 0 }; 6];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(Word::LEN)) {
        *word = Word::from_bytes([chunk[0], chunk[1], chunk[2]]);
    }
    Ok(words)
}
