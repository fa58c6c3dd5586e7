// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Starts continuous measurement and logs every reading.
//!
//! Settings come from the `SCD30_*` environment variables, log level from
//! `RUST_LOG` (e.g. `RUST_LOG=info`).

use scd30_driver::{Config, Monitor, Scd30};
use std::error::Error;
use std::sync::atomic::AtomicBool;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = Config::from_env()?;
    let scd = Scd30::with_config(&config)?;
    let (major, minor) = scd.read_firmware_version()?;
    log::info!(
        "SCD30 firmware {}.{} on {} at {:#04x}",
        major,
        minor,
        config.path.display(),
        config.address
    );

    scd.start_continuous_measurement(0)?;

    let monitor = Monitor::new(scd, &config);
    monitor.run(&AtomicBool::new(false));
    Ok(())
}
