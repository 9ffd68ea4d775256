//! Configuration system for Sluice.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $SLUICE_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/sluice/config.toml
//!   3. ~/.config/sluice/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SluiceConfig {
    pub device: DeviceConfig,
    pub transport: TransportConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// UIO node for the stream FIFO register window.
    pub fifo_uio: PathBuf,
    /// UIO node for the AXI timer register window.
    pub timer_uio: PathBuf,
    /// Timer input clock in Hz. Used only for tick→time conversion.
    pub timer_clock_hz: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Receive-occupancy poll countdown. Exhaustion fails the run.
    pub rx_occupancy_polls: u32,
    /// Vacancy poll budget per transmitted word.
    pub tx_vacancy_polls: u32,
    /// Transmit-complete poll budget.
    pub tx_done_polls: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub width: u32,
    pub height: u32,
    /// Plane count of the input buffer. The preprocessor needs 3.
    pub channels: u32,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for SluiceConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            transport: TransportConfig::default(),
            input: InputConfig::default(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            fifo_uio: PathBuf::from("/dev/uio0"),
            timer_uio: PathBuf::from("/dev/uio1"),
            timer_clock_hz: 100_000_000,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            rx_occupancy_polls: 1 << 20,
            tx_vacancy_polls: 1 << 20,
            tx_done_polls: 1 << 20,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            channels: 3,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("sluice")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl SluiceConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            SluiceConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("SLUICE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&SluiceConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text)
                .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply SLUICE_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SLUICE_DEVICE__FIFO_UIO") {
            self.device.fifo_uio = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SLUICE_DEVICE__TIMER_UIO") {
            self.device.timer_uio = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SLUICE_DEVICE__TIMER_CLOCK_HZ") {
            if let Ok(hz) = v.parse() {
                self.device.timer_clock_hz = hz;
            }
        }
        if let Ok(v) = std::env::var("SLUICE_TRANSPORT__RX_OCCUPANCY_POLLS") {
            if let Ok(n) = v.parse() {
                self.transport.rx_occupancy_polls = n;
            }
        }
        if let Ok(v) = std::env::var("SLUICE_INPUT__WIDTH") {
            if let Ok(n) = v.parse() {
                self.input.width = n;
            }
        }
        if let Ok(v) = std::env::var("SLUICE_INPUT__HEIGHT") {
            if let Ok(n) = v.parse() {
                self.input.height = n;
            }
        }
    }
}
