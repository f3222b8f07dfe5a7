//! setting config file
//! `config_{ENV}.toml` in the working directory, ENV defaults to "dev"

use std::{fs::File, io::Read};
use lazy_static::lazy_static;
use serde_derive::Deserialize;
use std::env;

use super::error::DriverError;

#[derive(Debug, Deserialize)]
pub struct Env {
    pub debug: bool,
    pub env: String,
    pub log_level: String,
}

impl Default for Env {
    fn default() -> Self {
        Env {
            debug: false,
            env: String::from("dev"),
            log_level: String::from("info"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Serial {
    pub device: String,
    pub io_address: u8,
}

impl Default for Serial {
    fn default() -> Self {
        Serial {
            device: String::from("/dev/ttyS0"),
            io_address: 144,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Timing {
    // settle interval around every payload and inside the ready handshake
    pub settle_ms: u64,
    pub status_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub max_ready_polls: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            settle_ms: 20,
            status_timeout_ms: 1000,
            read_timeout_ms: 30000,
            max_ready_polls: 500,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub env: Env,
    #[serde(default)]
    pub serial: Serial,
    #[serde(default)]
    pub timing: Timing,
}

impl Settings {
    pub fn get<'a>() -> &'a Self {
        lazy_static! {
            static ref CACHE: Settings = Settings::load_or_default();
        }
        &CACHE
    }

    /// read `config_{ENV}.toml`, built-in defaults when the file is absent
    fn load_or_default() -> Self {
        let env = match env::var("ENV") {
            Ok(e) => e,
            Err(_) => String::from("dev"),
        };
        let file_path = format!("config_{}.toml", env);

        match Settings::load(file_path.as_str()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("cannot load {}, using defaults: {}", file_path, e);
                Settings::default()
            }
        }
    }

    pub fn load(file_path: &str) -> Result<Self, DriverError> {
        let mut file = File::open(file_path)
            .map_err(|e| DriverError::configuration(format!("no such file {}: {}", file_path, e)))?;

        let mut str_val = String::new();
        file.read_to_string(&mut str_val)
            .map_err(|e| DriverError::configuration(format!("cannot read config file {}: {}", file_path, e)))?;

        Settings::parse(str_val.as_str())
    }

    pub fn parse(content: &str) -> Result<Self, DriverError> {
        toml::from_str(content)
            .map_err(|e| DriverError::configuration(format!("config file format invalid: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let settings = Settings::parse(
            r#"
            [env]
            debug = true
            env = "test"
            log_level = "debug"

            [serial]
            device = "/dev/ttyUSB0"
            io_address = 146

            [timing]
            settle_ms = 5
            status_timeout_ms = 200
            read_timeout_ms = 1000
            max_ready_polls = 10
            "#,
        )
        .unwrap();
        assert_eq!(settings.env.log_level, "debug");
        assert_eq!(settings.serial.device, "/dev/ttyUSB0");
        assert_eq!(settings.serial.io_address, 146);
        assert_eq!(settings.timing.max_ready_polls, 10);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let settings = Settings::parse("[serial]\ndevice = \"COM1\"\nio_address = 150\n").unwrap();
        assert_eq!(settings.serial.io_address, 150);
        assert_eq!(settings.timing.settle_ms, 20);
        assert_eq!(settings.timing.read_timeout_ms, 30000);
        assert_eq!(settings.env.log_level, "info");
    }

    #[test]
    fn test_invalid_file_is_configuration_error() {
        let err = Settings::parse("[serial]\nio_address = \"x\"").unwrap_err();
        assert_eq!(err.code, crate::common::error::ErrorCode::ConfigurationError);
    }
}
