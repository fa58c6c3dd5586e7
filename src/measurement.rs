// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

/// One CO2, temperature and relative humidity sample as delivered by the sensor.
///
/// Values are passed through unscaled, the sensor performs all scaling
/// before transmission.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    /// CO2 concentration in ppm
    pub co2: f32,
    /// Temperature in degrees Celsius
    pub temperature: f32,
    /// Relative humidity in %
    pub humidity: f32,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Co2: {} ppm Temp: {} C RH: {} %",
            self.co2, self.temperature, self.humidity
        )
    }
}

/// Rebuilds an IEEE-754 single precision value from the data bytes of two
/// consecutive response words, first word holding the most significant half.
///
/// The bit pattern is reinterpreted, not converted. Only call this once both
/// words passed checksum validation.
pub fn decode_float(high: [u8; 2], low: [u8; 2]) -> f32 {
    f32::from_be_bytes([high[0], high[1], low[0], low[1]])
}
