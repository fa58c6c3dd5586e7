// Copyright 2024, F. Stan
//
// Licensed under the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>,
// This file may not be copied, modified, or distributed
// except according to those terms.

use crate::bus::{DEFAULT_ADDRESS, DEFAULT_PATH};
use crate::error::{Result, Scd30Error};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Driver settings. `Config::default()` matches a sensor on `/dev/i2c-1`
/// at its factory address.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub path: PathBuf,
    pub address: u8,
    /// Pause after each command write and before reading its response
    pub command_delay: Duration,
    /// Sleep between data-ready polls
    pub poll_interval: Duration,
    /// Upper bound on the data-ready wait, `None` waits forever
    pub ready_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            path: PathBuf::from(DEFAULT_PATH),
            address: DEFAULT_ADDRESS,
            command_delay: Duration::from_millis(10),
            poll_interval: Duration::from_secs(2),
            ready_timeout: None,
        }
    }
}

impl Config {
    /// Defaults overridden by `SCD30_I2C_PATH`, `SCD30_ADDRESS`,
    /// `SCD30_POLL_INTERVAL_SECS` and `SCD30_READY_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(path) = lookup("SCD30_I2C_PATH") {
            config.path = PathBuf::from(path);
        }
        if let Some(address) = lookup("SCD30_ADDRESS") {
            config.address = parse_address(&address)?;
        }
        if let Some(secs) = lookup("SCD30_POLL_INTERVAL_SECS") {
            config.poll_interval = Duration::from_secs(parse_secs("SCD30_POLL_INTERVAL_SECS", &secs)?);
        }
        if let Some(secs) = lookup("SCD30_READY_TIMEOUT_SECS") {
            config.ready_timeout = Some(Duration::from_secs(parse_secs("SCD30_READY_TIMEOUT_SECS", &secs)?));
        }
        Ok(config)
    }

    pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_command_delay(mut self, delay: Duration) -> Self {
        self.command_delay = delay;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.ready_timeout = timeout;
        self
    }
}

fn parse_address(raw: &str) -> Result<u8> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse::<u8>(),
    };
    match parsed {
        Ok(address) if address <= 0x7F => Ok(address),
        _ => Err(Scd30Error::InvalidConfig(format!(
            "SCD30_ADDRESS must be a 7 bit address, got {:?}",
            raw
        ))),
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| Scd30Error::InvalidConfig(format!("{} must be whole seconds, got {:?}: {}", key, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.path, PathBuf::from("/dev/i2c-1"));
        assert_eq!(config.address, 0x61);
        assert_eq!(config.ready_timeout, None);
    }

    #[test]
    fn environment_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SCD30_I2C_PATH", "/dev/i2c-3"),
            ("SCD30_ADDRESS", "0x62"),
            ("SCD30_POLL_INTERVAL_SECS", "30"),
            ("SCD30_READY_TIMEOUT_SECS", "120"),
        ]))
        .unwrap();
        assert_eq!(config.path, PathBuf::from("/dev/i2c-3"));
        assert_eq!(config.address, 0x62);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.ready_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn decimal_address() {
        let config = Config::from_lookup(lookup(&[("SCD30_ADDRESS", "97")])).unwrap();
        assert_eq!(config.address, 0x61);
    }

    #[test]
    fn rejects_bad_values() {
        for vars in [
            [("SCD30_ADDRESS", "0x80")],
            [("SCD30_ADDRESS", "sixty")],
            [("SCD30_POLL_INTERVAL_SECS", "-1")],
            [("SCD30_READY_TIMEOUT_SECS", "2.5")],
        ] {
            let err = Config::from_lookup(lookup(&vars)).unwrap_err();
            assert!(matches!(err, Scd30Error::InvalidConfig(_)), "{:?}", vars);
        }
    }

    #[test]
    fn builder_methods() {
        let config = Config::default()
            .with_path("/dev/i2c-0")
            .with_address(0x10)
            .with_command_delay(Duration::ZERO)
            .with_poll_interval(Duration::from_millis(5))
            .with_ready_timeout(Some(Duration::from_secs(1)));
        assert_eq!(config.path, PathBuf::from("/dev/i2c-0"));
        assert_eq!(config.address, 0x10);
        assert_eq!(config.command_delay, Duration::ZERO);
        assert_eq!(config.poll_interval, Duration::from_millis(5));
        assert_eq!(config.ready_timeout, Some(Duration::from_secs(1)));
    }
}
