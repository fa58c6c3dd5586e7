// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! In-memory SCD30 used by the unit tests.

use crate::bus::Transport;
use crate::codec::Command;
use crate::crc::{compute_checksum, validate};
use crate::measurement::Measurement;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

pub(crate) struct SimState {
    /// Every frame written, in order
    pub writes: Vec<Vec<u8>>,
    /// Bytes queued by the last command, drained by reads
    pub pending: Vec<u8>,
    /// Values stored by argument commands, keyed by command code
    pub registers: HashMap<u16, u16>,
    /// Getter replies that ignore the stored register
    pub echo_override: HashMap<u16, u16>,
    pub measurement: Measurement,
    pub data_ready: bool,
    /// Number of data-ready polls answered with "not ready" first
    pub polls_until_ready: usize,
    /// Raw data-ready reply, replaces the 0/1 derived from `data_ready`
    pub status_word: Option<u16>,
    pub firmware: [u8; 2],
    /// Flip the checksum of this word in the next reply
    pub corrupt_word: Option<usize>,
    pub fail_write: bool,
    pub fail_read: bool,
    pub measuring: bool,
    /// Set when a command arrives while a previous reply is still unread
    pub interleaved: bool,
}

#[derive(Clone)]
pub(crate) struct SimulatedScd30(Arc<Mutex<SimState>>);

impl SimulatedScd30 {
    pub fn new() -> Self {
        let mut registers = HashMap::new();
        registers.insert(Command::SetMeasurementInterval.code(), 2);
        registers.insert(Command::SetForcedRecalibrationValue.code(), 400);
        registers.insert(Command::SetAutomaticSelfCalibration.code(), 0);
        registers.insert(Command::SetTemperatureOffset.code(), 0);
        registers.insert(Command::SetAltitudeCompensation.code(), 0);

        SimulatedScd30(Arc::new(Mutex::new(SimState {
            writes: Vec::new(),
            pending: Vec::new(),
            registers,
            echo_override: HashMap::new(),
            measurement: Measurement {
                co2: 850.5,
                temperature: 23.75,
                humidity: 41.0,
            },
            data_ready: true,
            polls_until_ready: 0,
            status_word: None,
            firmware: [3, 66],
            corrupt_word: None,
            fail_write: false,
            fail_read: false,
            measuring: false,
            interleaved: false,
        })))
    }

    pub fn state(&self) -> MutexGuard<'_, SimState> {
        self.0.lock().unwrap()
    }
}

impl SimState {
    fn reply(&mut self, words: &[u16]) {
        let mut bytes = Vec::with_capacity(words.len() * 3);
        for (index, word) in words.iter().enumerate() {
            let data = word.to_be_bytes();
            let mut checksum = compute_checksum(&data);
            if self.corrupt_word == Some(index) {
                checksum ^= 0x01;
            }
            bytes.extend_from_slice(&[data[0], data[1], checksum]);
        }
        self.corrupt_word = None;
        self.pending = bytes;
    }

    fn bare(&mut self, code: u16) {
        let float_words = |value: f32| {
            let bits = value.to_bits();
            [(bits >> 16) as u16, bits as u16]
        };

        match code {
            c if c == Command::GetDataReadyStatus.code() => {
                let ready = if self.polls_until_ready > 0 {
                    self.polls_until_ready -= 1;
                    false
                } else {
                    self.data_ready
                };
                let word = self.status_word.unwrap_or(u16::from(ready));
                self.reply(&[word]);
            }
            c if c == Command::ReadMeasurement.code() => {
                let [c0, c1] = float_words(self.measurement.co2);
                let [t0, t1] = float_words(self.measurement.temperature);
                let [h0, h1] = float_words(self.measurement.humidity);
                self.reply(&[c0, c1, t0, t1, h0, h1]);
            }
            c if c == Command::ReadFirmwareVersion.code() => {
                self.reply(&[u16::from_be_bytes(self.firmware)]);
            }
            c if c == Command::StopContinuousMeasurement.code() => self.measuring = false,
            c if c == Command::SoftReset.code() => {
                self.measuring = false;
                self.pending.clear();
            }
            c => {
                let value = self
                    .echo_override
                    .get(&c)
                    .or_else(|| self.registers.get(&c))
                    .copied()
                    .unwrap_or_else(|| panic!("unknown bare command {:#06x}", c));
                self.reply(&[value]);
            }
        }
    }

    fn with_arg(&mut self, code: u16, arg: u16) {
        if code == Command::StartContinuousMeasurement.code() {
            self.measuring = true;
        } else {
            self.registers.insert(code, arg);
        }
    }
}

impl Transport for SimulatedScd30 {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_write {
            return Err(io::Error::new(io::ErrorKind::Other, "simulated write failure"));
        }
        if !state.pending.is_empty() {
            state.interleaved = true;
        }
        state.writes.push(bytes.to_vec());

        let code = u16::from_be_bytes([bytes[0], bytes[1]]);
        match bytes.len() {
            2 => state.bare(code),
            5 => {
                assert!(validate(&bytes[2..4], bytes[4]), "bad argument checksum in {:02x?}", bytes);
                state.with_arg(code, u16::from_be_bytes([bytes[2], bytes[3]]));
            }
            n => panic!("unexpected frame length {}", n),
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_read {
            return Err(io::Error::new(io::ErrorKind::Other, "simulated read failure"));
        }
        if state.pending.len() < buf.len() {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
        }
        let rest = state.pending.split_off(buf.len());
        buf.copy_from_slice(&state.pending);
        state.pending = rest;
        Ok(())
    }
}
