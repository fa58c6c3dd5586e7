// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

use crate::bus::{self, Transport};
use crate::codec::{self, Command, Word};
use crate::config::Config;
use crate::error::{Result, Scd30Error};
use crate::measurement::{decode_float, Measurement};
use i2cdev::linux::LinuxI2CDevice;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use std::thread;

/// Allowed continuous measurement interval, in seconds
pub const MEASUREMENT_INTERVAL_RANGE: (u16, u16) = (2, 1800);

/// Driver side view of the sensor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementState {
    Stopped,
    Measuring,
}

struct Bus<T> {
    transport: T,
    state: MeasurementState,
}

/// SCD30 Struct, owns the bus handle bound to the sensor
/// and implements the SCD30 operations.
///
/// Every operation runs as one transaction: the bus is locked for the
/// whole write, delay, read and validate sequence, so a `&Scd30` can be
/// shared between threads without two exchanges interleaving on the wire.
pub struct Scd30<T = LinuxI2CDevice> {
    bus: Mutex<Bus<T>>,
    command_delay: Duration,
}

/// Exclusive access to the bus for one request/response exchange.
///
/// The device matches replies to requests purely by order, so nothing else
/// may touch the bus until the guard is dropped.
struct Transaction<'a, T> {
    bus: MutexGuard<'a, Bus<T>>,
    delay: Duration,
}

impl<T: Transport> Transaction<'_, T> {
    fn pause(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }

    fn command(&mut self, cmd: Command) -> Result<()> {
        codec::send_command(&mut self.bus.transport, cmd)?;
        self.pause();
        Ok(())
    }

    fn command_with_arg(&mut self, cmd: Command, arg: u16) -> Result<()> {
        codec::send_command_with_arg(&mut self.bus.transport, cmd, arg)?;
        self.pause();
        Ok(())
    }

    fn read_word(&mut self) -> Result<Word> {
        codec::read_word(&mut self.bus.transport)
    }

    /// Bare command answered by one checksummed word.
    fn query(&mut self, cmd: Command) -> Result<u16> {
        self.command(cmd)?;
        Ok(self.read_word()?.checked(0)?.value())
    }

    /// Writes `value` then reads it back with the bare form of `cmd`.
    fn write_verified(&mut self, cmd: Command, value: u16) -> Result<()> {
        self.command_with_arg(cmd, value)?;
        let read_back = self.query(cmd)?;
        if read_back != value {
            return Err(Scd30Error::VerificationMismatch {
                written: value,
                read_back,
            });
        }
        Ok(())
    }

    fn set_state(&mut self, state: MeasurementState) {
        if self.bus.state != state {
            log::debug!("SCD30 {:?} -> {:?}", self.bus.state, state);
        }
        self.bus.state = state;
    }
}

impl Scd30<LinuxI2CDevice> {
    /// Create a new SCD30 Struct
    ///
    /// Opens `/dev/i2c-1` on standard address 0x61.
    ///
    pub fn new() -> Result<Self> {
        Self::with_config(&Config::default())
    }

    /// Opens the sensor on `path` at `address` with default timings.
    pub fn open<P: AsRef<Path>>(path: P, address: u8) -> Result<Self> {
        Self::with_config(
            &Config::default()
                .with_path(path.as_ref())
                .with_address(address),
        )
    }

    /// Opens the sensor with the path, address and timings of `config`.
    pub fn with_config(config: &Config) -> Result<Self> {
        let device = bus::open(&config.path, config.address)?;
        Ok(Self::from_transport(device, config))
    }
}

impl<T: Transport> Scd30<T> {
    /// Wraps an already bound transport. The driver starts out `Stopped`.
    pub fn from_transport(transport: T, config: &Config) -> Self {
        Scd30 {
            bus: Mutex::new(Bus {
                transport,
                state: MeasurementState::Stopped,
            }),
            command_delay: config.command_delay,
        }
    }

    fn transaction(&self) -> Transaction<'_, T> {
        Transaction {
            // recover the bus from a panicked holder
            bus: self.bus.lock().unwrap_or_else(PoisonError::into_inner),
            delay: self.command_delay,
        }
    }

    /// Mode the driver last put the sensor in.
    pub fn state(&self) -> MeasurementState {
        self.transaction().bus.state
    }

    /// Releases the underlying transport.
    pub fn into_inner(self) -> T {
        self.bus
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .transport
    }

    /// Trigger the continuous measurements for SCD30 device.
    ///
    /// `pressure` is the ambient pressure in mbar used for compensation,
    /// 0 disables it. Setting a pressure overrides altitude compensation.
    pub fn start_continuous_measurement(&self, pressure: u16) -> Result<()> {
        let mut tx = self.transaction();
        tx.command_with_arg(Command::StartContinuousMeasurement, pressure)?;
        tx.set_state(MeasurementState::Measuring);
        Ok(())
    }

    /// Stops the continuous measurements for SCD30 device.
    pub fn stop_continuous_measurement(&self) -> Result<()> {
        let mut tx = self.transaction();
        tx.command(Command::StopContinuousMeasurement)?;
        tx.set_state(MeasurementState::Stopped);
        Ok(())
    }

    /// Gets if the device has a measurement ready to be read.
    ///
    /// Only meaningful while measuring. A corrupted reply reads as not
    /// ready rather than an error, polling again recovers from it.
    pub fn data_ready(&self) -> Result<bool> {
        let mut tx = self.transaction();
        tx.command(Command::GetDataReadyStatus)?;
        let word = tx.read_word()?;
        if !word.is_valid() {
            log::trace!("data-ready word {:02x?} failed its checksum", word);
            return Ok(false);
        }
        Ok(word.data[1] & 0x01 == 0x01)
    }

    /// Polls [`Scd30::data_ready`] every `poll_interval` until it reports
    /// true. With a `timeout`, gives up with `Timeout` once it has elapsed.
    pub fn wait_for_data_ready(&self, poll_interval: Duration, timeout: Option<Duration>) -> Result<()> {
        let never = AtomicBool::new(false);
        self.wait_for_data_ready_unless(poll_interval, timeout, &never)
            .map(drop)
    }

    /// Same as [`Scd30::wait_for_data_ready`], but also checks `stop` between
    /// polls. Returns `Ok(false)` if `stop` was set before data became ready.
    pub fn wait_for_data_ready_unless(
        &self,
        poll_interval: Duration,
        timeout: Option<Duration>,
        stop: &AtomicBool,
    ) -> Result<bool> {
        let started = Instant::now();
        loop {
            if self.data_ready()? {
                return Ok(true);
            }
            if stop.load(Ordering::Relaxed) {
                return Ok(false);
            }
            let nap = match timeout {
                Some(limit) => {
                    let elapsed = started.elapsed();
                    if elapsed >= limit {
                        return Err(Scd30Error::Timeout(limit));
                    }
                    poll_interval.min(limit - elapsed)
                }
                None => poll_interval,
            };
            thread::sleep(nap);
        }
    }

    /// Get CO2, Temperature and Humidity.
    ///
    /// Call once [`Scd30::data_ready`] returned true. All six words must
    /// pass their checksum, otherwise nothing is returned.
    pub fn read_measurement(&self) -> Result<Measurement> {
        let mut tx = self.transaction();
        tx.command(Command::ReadMeasurement)?;
        let words = codec::read_six_words(&mut tx.bus.transport)?;
        for (index, word) in words.iter().enumerate() {
            word.checked(index)?;
        }
        drop(tx);

        Ok(Measurement {
            co2: decode_float(words[0].data, words[1].data),
            temperature: decode_float(words[2].data, words[3].data),
            humidity: decode_float(words[4].data, words[5].data),
        })
    }

    /// Soft reset the sensor device.
    ///
    /// The sensor restarts as after power up and reloads its non-volatile
    /// settings (temperature offset, altitude compensation, self
    /// calibration). Continuous measurement is no longer running afterwards.
    pub fn soft_reset(&self) -> Result<()> {
        let mut tx = self.transaction();
        tx.command(Command::SoftReset)?;
        tx.set_state(MeasurementState::Stopped);
        Ok(())
    }

    /// Sets the measurement interval in seconds, between 2 and 1800.
    pub fn set_measurement_interval(&self, seconds: u16) -> Result<()> {
        let (min, max) = MEASUREMENT_INTERVAL_RANGE;
        if !(min..=max).contains(&seconds) {
            return Err(Scd30Error::OutOfRange {
                name: "measurement interval",
                value: seconds,
                min,
                max,
            });
        }
        self.transaction()
            .write_verified(Command::SetMeasurementInterval, seconds)
    }

    /// Measurement interval in seconds.
    pub fn get_measurement_interval(&self) -> Result<u16> {
        self.transaction().query(Command::SetMeasurementInterval)
    }

    /// Sets the temperature offset.
    /// Offset is in ticks of 0.01 Celsius and kept in non-volatile memory.
    pub fn set_temperature_offset(&self, offset: u16) -> Result<()> {
        self.transaction()
            .write_verified(Command::SetTemperatureOffset, offset)
    }

    /// Temperature offset in ticks of 0.01 Celsius.
    pub fn get_temperature_offset(&self) -> Result<u16> {
        self.transaction().query(Command::SetTemperatureOffset)
    }

    /// Sets the altitude in meters above sea level.
    /// Ignored by the sensor while a pressure compensation is active.
    pub fn set_altitude_compensation(&self, altitude: u16) -> Result<()> {
        self.transaction()
            .write_verified(Command::SetAltitudeCompensation, altitude)
    }

    /// Altitude compensation in meters above sea level.
    pub fn get_altitude_compensation(&self) -> Result<u16> {
        self.transaction().query(Command::SetAltitudeCompensation)
    }

    /// (De-)Activate Automatic Self-Calibration (ASC)
    pub fn set_automatic_self_calibration(&self, enabled: bool) -> Result<()> {
        self.transaction()
            .write_verified(Command::SetAutomaticSelfCalibration, u16::from(enabled))
    }

    /// True if Automatic Self-Calibration (ASC) is active.
    pub fn get_automatic_self_calibration(&self) -> Result<bool> {
        Ok(self.transaction().query(Command::SetAutomaticSelfCalibration)? != 0)
    }

    /// Sets a forced recalibration reference in ppm.
    ///
    /// The sensor offers no way to confirm the recalibration itself, so
    /// the value is not read back.
    pub fn set_forced_recalibration_value(&self, ppm: u16) -> Result<()> {
        self.transaction()
            .command_with_arg(Command::SetForcedRecalibrationValue, ppm)
    }

    /// Last forced recalibration reference in ppm, 400 after power up.
    pub fn get_forced_recalibration_value(&self) -> Result<u16> {
        self.transaction().query(Command::SetForcedRecalibrationValue)
    }

    /// Firmware version as (major, minor).
    pub fn read_firmware_version(&self) -> Result<(u8, u8)> {
        let [major, minor] = self
            .transaction()
            .query(Command::ReadFirmwareVersion)?
            .to_be_bytes();
        Ok((major, minor))
    }
}
