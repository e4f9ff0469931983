/*
 * @file config.rs
 * @brief Runtime configuration for the serial LED controller
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Configuration surface: which serial device to open, and at what speed.
//!
//! The device path deliberately has no baked-in default. Serial device names
//! are host-specific (`/dev/ttyACM0`, `/dev/cu.usbmodem*`, `COM3`), so the
//! path must come from the `BLINKCTL_SERIAL_PORT` environment variable or
//! from `config.json`; startup fails with instructions when neither is set.

use std::{env, fs};

use anyhow::Result;
use serde::Deserialize;

/// Path to the JSON configuration file that holds runtime defaults.
const CONFIG_PATH: &str = "config.json";

/// Environment variable naming the serial device to open.
const SERIAL_PORT_ENV: &str = "BLINKCTL_SERIAL_PORT";

/// Environment variable overriding the baud rate.
const SERIAL_BAUD_ENV: &str = "BLINKCTL_SERIAL_BAUD";

/// Baud rate used when no override is present; matches the board firmware.
const DEFAULT_SERIAL_BAUD: u32 = 115_200;

/// Strongly typed representation of `config.json`.
#[derive(Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Serial device to use when `BLINKCTL_SERIAL_PORT` is unset.
    #[serde(default)]
    default_serial_port: Option<String>,
}

/// Loads configuration from `config.json`, falling back to an empty config.
///
/// # Details
/// A missing file is the normal case and is silent; a file that exists but
/// fails to parse is reported to stderr before the empty fallback is used,
/// so a typo in the JSON does not silently discard the configured port.
///
/// # Returns
/// * `AppConfig` - The loaded or empty configuration.
pub fn load_app_config() -> AppConfig {
    match fs::read_to_string(CONFIG_PATH) {
        Ok(raw) => parse_app_config(&raw).unwrap_or_else(|err| {
            eprintln!("Config parse error ({}): {}", CONFIG_PATH, err);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

/// Parses the raw JSON contents of the configuration file.
fn parse_app_config(raw: &str) -> Result<AppConfig> {
    Ok(serde_json::from_str(raw)?)
}

/// Determines the serial port path from environment variable or configuration.
///
/// # Details
/// Checks the `BLINKCTL_SERIAL_PORT` environment variable first, then falls
/// back to the `default_serial_port` value from the configuration file.
/// There is no hardcoded device path.
///
/// # Arguments
/// * `config` - The loaded application configuration.
///
/// # Returns
/// * `Ok(String)` - The serial device path to open.
///
/// # Errors
/// Returns an error naming both configuration sources when neither provides
/// a device path.
pub fn serial_port_path(config: &AppConfig) -> Result<String> {
    resolve_port_path(env::var(SERIAL_PORT_ENV).ok(), config)
}

/// Resolves the device path from an optional override and the config file.
fn resolve_port_path(env_override: Option<String>, config: &AppConfig) -> Result<String> {
    if let Some(path) = env_override.filter(|path| !path.is_empty()) {
        return Ok(path);
    }
    if let Some(path) = config.default_serial_port.clone() {
        return Ok(path);
    }
    anyhow::bail!(
        "No serial port configured. Set {} or add \"default_serial_port\" to {}",
        SERIAL_PORT_ENV,
        CONFIG_PATH
    )
}

/// Determines the serial baud rate from environment variable or default.
///
/// # Details
/// Checks the `BLINKCTL_SERIAL_BAUD` environment variable and parses it as a
/// u32. Falls back to 115200 if not set or invalid.
///
/// # Returns
/// * `u32` - The baud rate to use for serial communication.
pub fn serial_baud_rate() -> u32 {
    env::var(SERIAL_BAUD_ENV)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_SERIAL_BAUD)
}
