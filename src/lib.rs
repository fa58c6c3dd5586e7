// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Linux I2C driver for the Sensirion SCD30 CO2, temperature and humidity sensor
//!
//! Operations taken from [interface description](https://sensirion.com/media/documents/D7CEEF4A/6165372F/Sensirion_CO2_Sensors_SCD30_Interface_Description.pdf)
//!
//! Every operation is one bus transaction (write, wait, read, validate)
//! performed under an exclusive lock, so a single [`Scd30`] can be shared
//! between threads. Errors are returned, never logged, by the driver itself.
//!
//! Checksum policy differs on purpose: a corrupted data-ready reply reads as
//! "not ready", while a corrupted measurement or getter reply is an error.
//!
//! ## Basic Example
//!
//! Obtaining measurements, co2, temperature and humidity
//!
//!```no_run
//!use scd30_driver::Scd30;
//!use std::thread;
//!use std::time::Duration;
//!
//!fn main() -> Result<(), scd30_driver::Scd30Error> {
//!    // Open /dev/i2c-1, address 0x61
//!    let scd = Scd30::new()?;
//!    scd.set_measurement_interval(2)?;
//!    scd.start_continuous_measurement(0)?;
//!
//!    loop {
//!        scd.wait_for_data_ready(Duration::from_secs(2), Some(Duration::from_secs(30)))?;
//!        match scd.read_measurement() {
//!            Ok(m) => println!("Co2: {} ppm Temp: {} C RH: {} %", m.co2, m.temperature, m.humidity),
//!            Err(e) => {
//!                println!("Error obtaining measurements. More details: {}", e);
//!                thread::sleep(Duration::from_secs(10));
//!            }
//!        }
//!    }
//!}
//!```
//!

pub mod bus;
pub mod codec;
pub mod config;
pub mod crc;
pub mod error;
pub mod measurement;
pub mod monitor;
/// SCD30 device operations
pub mod scd30;

#[cfg(test)]
mod sim;

pub use bus::{open, Transport, DEFAULT_ADDRESS, DEFAULT_PATH};
pub use codec::{Command, Word};
pub use config::Config;
pub use crc::{compute_checksum, validate};
pub use error::{Result, Scd30Error};
pub use measurement::{decode_float, Measurement};
pub use monitor::{LatestReading, Monitor};
pub use scd30::{MeasurementState, Scd30};
