#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and validation for the adaptive-brightness pipeline.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Conversions into the `lumen_core` config structs live here so hosts
//!   can go straight from a file to a built pipeline.

use serde::Deserialize;

/// One row of the lux → brightness table.
///
/// Example:
/// ```toml
/// [[buckets]]
/// min_lux = 0.0
/// max_lux = 20.0
/// brightness = 0.15
/// ```
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct BucketRow {
    pub min_lux: f64,
    pub max_lux: f64,
    pub brightness: f64,
}

impl From<BucketRow> for lumen_core::Bucket {
    fn from(r: BucketRow) -> Self {
        lumen_core::Bucket {
            min_lux: r.min_lux,
            max_lux: r.max_lux,
            brightness: r.brightness,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BiasCfg {
    /// Perceptual-linear exponent
    pub gamma: f64,
    pub min_ratio: f64,
    pub max_ratio: f64,
    /// Minimum visible output while a bias is active
    pub floor: f64,
}

impl Default for BiasCfg {
    fn default() -> Self {
        let d = lumen_core::BiasCfg::default();
        Self {
            gamma: d.gamma,
            min_ratio: d.min_ratio,
            max_ratio: d.max_ratio,
            floor: d.floor,
        }
    }
}

impl From<&BiasCfg> for lumen_core::BiasCfg {
    fn from(c: &BiasCfg) -> Self {
        lumen_core::BiasCfg {
            gamma: c.gamma,
            min_ratio: c.min_ratio,
            max_ratio: c.max_ratio,
            floor: c.floor,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StabilizerCfg {
    /// Minimum spacing between emissions (ms)
    pub throttle_ms: u64,
    pub watchdog_min_ms: u64,
    pub watchdog_backoff_step_ms: u64,
    pub watchdog_max_ms: u64,
    /// Max time to wait for one sensor read before treating it as failed
    pub sensor_read_timeout_ms: u64,
    /// Sensor pump pacing in Hz
    pub sample_rate_hz: u32,
}

impl Default for StabilizerCfg {
    fn default() -> Self {
        let d = lumen_core::StabilizerCfg::default();
        Self {
            throttle_ms: d.throttle_ms,
            watchdog_min_ms: d.watchdog_min_ms,
            watchdog_backoff_step_ms: d.watchdog_backoff_step_ms,
            watchdog_max_ms: d.watchdog_max_ms,
            sensor_read_timeout_ms: 150,
            sample_rate_hz: 10,
        }
    }
}

impl From<&StabilizerCfg> for lumen_core::StabilizerCfg {
    fn from(c: &StabilizerCfg) -> Self {
        lumen_core::StabilizerCfg {
            throttle_ms: c.throttle_ms,
            watchdog_min_ms: c.watchdog_min_ms,
            watchdog_backoff_step_ms: c.watchdog_backoff_step_ms,
            watchdog_max_ms: c.watchdog_max_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RampCfg {
    pub step_size: f64,
    pub min_steps: u32,
    pub max_steps: u32,
}

impl Default for RampCfg {
    fn default() -> Self {
        let d = lumen_core::RampCfg::default();
        Self {
            step_size: d.step_size,
            min_steps: d.min_steps,
            max_steps: d.max_steps,
        }
    }
}

impl From<&RampCfg> for lumen_core::RampCfg {
    fn from(c: &RampCfg) -> Self {
        lumen_core::RampCfg {
            step_size: c.step_size,
            min_steps: c.min_steps,
            max_steps: c.max_steps,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub buckets: Vec<BucketRow>,
    #[serde(default)]
    pub bias: BiasCfg,
    #[serde(default)]
    pub stabilizer: StabilizerCfg,
    #[serde(default)]
    pub ramp: RampCfg,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    /// Validate all sections; errors carry a human-readable reason.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.buckets.is_empty() {
            eyre::bail!("bucket table must not be empty");
        }
        for (i, b) in self.buckets.iter().enumerate() {
            if !b.min_lux.is_finite() || !b.max_lux.is_finite() {
                eyre::bail!("bucket {i}: lux bounds must be finite");
            }
            if b.min_lux < 0.0 {
                eyre::bail!("bucket {i}: min_lux must be >= 0");
            }
            if b.min_lux > b.max_lux {
                eyre::bail!("bucket {i}: min_lux must be <= max_lux");
            }
            if !b.brightness.is_finite() || !(0.0..=1.0).contains(&b.brightness) {
                eyre::bail!("bucket {i}: brightness must be within [0, 1]");
            }
        }
        if !self.bias.gamma.is_finite() || self.bias.gamma <= 0.0 {
            eyre::bail!("gamma must be > 0");
        }
        if !self.bias.min_ratio.is_finite() || self.bias.min_ratio <= 0.0 {
            eyre::bail!("min_ratio must be > 0");
        }
        if !self.bias.max_ratio.is_finite() || self.bias.max_ratio < self.bias.min_ratio {
            eyre::bail!("max_ratio must be >= min_ratio");
        }
        if !self.bias.floor.is_finite() || !(0.0..=1.0).contains(&self.bias.floor) {
            eyre::bail!("floor must be within [0, 1]");
        }
        if self.stabilizer.throttle_ms == 0 {
            eyre::bail!("throttle_ms must be >= 1");
        }
        if self.stabilizer.watchdog_min_ms == 0 {
            eyre::bail!("watchdog_min_ms must be >= 1");
        }
        if self.stabilizer.watchdog_max_ms < self.stabilizer.watchdog_min_ms {
            eyre::bail!("watchdog_max_ms must be >= watchdog_min_ms");
        }
        if self.stabilizer.sensor_read_timeout_ms == 0 {
            eyre::bail!("sensor_read_timeout_ms must be >= 1");
        }
        if self.stabilizer.sample_rate_hz == 0 {
            eyre::bail!("sample_rate_hz must be > 0");
        }
        if !self.ramp.step_size.is_finite() || self.ramp.step_size <= 0.0 {
            eyre::bail!("step_size must be > 0");
        }
        if self.ramp.max_steps == 0 {
            eyre::bail!("max_steps must be >= 1");
        }
        if self.ramp.min_steps > self.ramp.max_steps {
            eyre::bail!("min_steps must be <= max_steps");
        }
        Ok(())
    }

    /// Bucket table converted to core types.
    pub fn core_buckets(&self) -> Vec<lumen_core::Bucket> {
        self.buckets.iter().copied().map(Into::into).collect()
    }
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file.
pub fn load_path(path: &std::path::Path) -> eyre::Result<Config> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("reading {}: {e}", path.display()))?;
    Ok(load_toml(&raw)?)
}
