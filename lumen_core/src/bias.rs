//! Preference bias learning.
//!
//! Learns a single scalar correction from the gap between the automatic
//! brightness choice and a user's manual override, and re-applies it to
//! future automatic choices in a perceptually linear domain. The gamma
//! round trip makes the same multiplicative ratio feel like the same
//! relative adjustment at low and high brightness, which flat linear
//! scaling does not.

use crate::error::{ConfigError, Report, Result};

/// Gamma and clamp configuration for the bias learner.
#[derive(Debug, Clone)]
pub struct BiasCfg {
    /// Exponent for the perceptual-linear transform. Default: 2.2.
    pub gamma: f64,
    /// Lower clamp for the learned ratio. Default: 0.2.
    pub min_ratio: f64,
    /// Upper clamp for the learned ratio. Default: 2.0.
    pub max_ratio: f64,
    /// Minimum visible output once a bias is active; a biased result of
    /// exactly zero would make the display go dark. Default: 0.01.
    pub floor: f64,
}

impl Default for BiasCfg {
    fn default() -> Self {
        Self {
            gamma: 2.2,
            min_ratio: 0.2,
            max_ratio: 2.0,
            floor: 0.01,
        }
    }
}

impl BiasCfg {
    pub(crate) fn validate(&self) -> Result<()> {
        let reason = if !self.gamma.is_finite() || self.gamma <= 0.0 {
            Some("gamma must be finite and > 0")
        } else if !self.min_ratio.is_finite() || self.min_ratio <= 0.0 {
            Some("min_ratio must be finite and > 0")
        } else if !self.max_ratio.is_finite() || self.max_ratio < self.min_ratio {
            Some("max_ratio must be finite and >= min_ratio")
        } else if !self.floor.is_finite() || !(0.0..=1.0).contains(&self.floor) {
            Some("floor must be within [0, 1]")
        } else {
            None
        };
        match reason {
            Some(r) => Err(Report::new(ConfigError::Invalid(r))),
            None => Ok(()),
        }
    }
}

/// Scalar learner holding the current ratio. Never persisted here; storing
/// the ratio across sessions is the host's concern.
#[derive(Debug)]
pub struct BiasLearner {
    cfg: BiasCfg,
    ratio: f64,
}

impl BiasLearner {
    pub fn new(cfg: BiasCfg) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg, ratio: 1.0 })
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Learn from a manual override made against an automatic choice.
    ///
    /// Returns the new clamped ratio, or `None` when `automatic <= 0`
    /// (division undefined; the stored ratio is left untouched so callers
    /// can skip notifying the user).
    pub fn update(&mut self, manual: f64, automatic: f64) -> Option<f64> {
        if !automatic.is_finite() || automatic <= 0.0 || !manual.is_finite() {
            return None;
        }
        let ratio = (manual / automatic).clamp(self.cfg.min_ratio, self.cfg.max_ratio);
        tracing::debug!(manual, automatic, ratio, "bias ratio updated");
        self.ratio = ratio;
        Some(ratio)
    }

    /// Scale a normalized brightness by the learned ratio in the
    /// perceptual-linear domain: `(b^gamma * ratio)^(1/gamma)`, clamped into
    /// `[floor, 1]`. A ratio of exactly 1.0 is the identity; the floor only
    /// applies while a bias is active.
    pub fn apply(&self, brightness: f64) -> f64 {
        let b = brightness.clamp(0.0, 1.0);
        if self.ratio == 1.0 {
            return b;
        }
        let linear = b.powf(self.cfg.gamma) * self.ratio;
        linear
            .powf(self.cfg.gamma.recip())
            .clamp(self.cfg.floor, 1.0)
    }

    /// Forget the learned preference.
    pub fn reset(&mut self) {
        self.ratio = 1.0;
    }
}
