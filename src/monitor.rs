// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Poll loop that keeps the latest reading available to other threads.
//!
//! The cache has its own lock. It is only taken after a bus transaction has
//! finished, so readers never wait on the sensor.

use crate::bus::Transport;
use crate::config::Config;
use crate::error::Result;
use crate::measurement::Measurement;
use crate::scd30::Scd30;
use i2cdev::linux::LinuxI2CDevice;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::Duration;

/// Shared handle to the most recent measurement.
#[derive(Debug, Clone, Default)]
pub struct LatestReading {
    inner: Arc<RwLock<Option<Measurement>>>,
}

impl LatestReading {
    /// Empty cache, nothing published yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the first successful read.
    pub fn get(&self) -> Option<Measurement> {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, measurement: Measurement) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(measurement);
    }
}

/// Owns the sensor and publishes each new measurement to a [`LatestReading`].
pub struct Monitor<T = LinuxI2CDevice> {
    sensor: Scd30<T>,
    latest: LatestReading,
    poll_interval: Duration,
    ready_timeout: Option<Duration>,
}

impl<T: Transport> Monitor<T> {
    /// Takes ownership of the sensor. Measurement must already be started.
    pub fn new(sensor: Scd30<T>, config: &Config) -> Self {
        Monitor {
            sensor,
            latest: LatestReading::new(),
            poll_interval: config.poll_interval,
            ready_timeout: config.ready_timeout,
        }
    }

    /// Handle to the published reading, cheap to clone into other threads.
    pub fn latest(&self) -> LatestReading {
        self.latest.clone()
    }

    /// The driver, for configuration calls between polls.
    pub fn sensor(&self) -> &Scd30<T> {
        &self.sensor
    }

    /// Waits for the next measurement, reads it and publishes it.
    pub fn poll_once(&self) -> Result<Measurement> {
        self.sensor
            .wait_for_data_ready(self.poll_interval, self.ready_timeout)?;
        self.read_and_publish()
    }

    /// Polls until `stop` is set. Failed cycles are logged and retried after
    /// one poll interval, the last good reading stays published.
    ///
    /// `stop` is also checked between data-ready polls, so a sensor that
    /// never becomes ready does not keep the loop alive.
    pub fn run(&self, stop: &AtomicBool) {
        while !stop.load(Ordering::Relaxed) {
            let cycle = self
                .sensor
                .wait_for_data_ready_unless(self.poll_interval, self.ready_timeout, stop)
                .and_then(|ready| {
                    if ready {
                        self.read_and_publish().map(Some)
                    } else {
                        Ok(None)
                    }
                });
            match cycle {
                Ok(Some(measurement)) => log::info!("{}", measurement),
                Ok(None) => break,
                Err(e) => {
                    log::warn!("Error obtaining measurements: {}", e);
                    thread::sleep(self.poll_interval);
                }
            }
        }
    }

    fn read_and_publish(&self) -> Result<Measurement> {
        let measurement = self.sensor.read_measurement()?;
        self.latest.publish(measurement);
        Ok(measurement)
    }
}
