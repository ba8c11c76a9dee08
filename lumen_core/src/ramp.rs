//! Stepwise brightness transitions.
//!
//! A [`BrightnessRamp`] is a finite, pull-based iterator of brightness
//! values moving from a current level to a target, always terminating on
//! the exact target. It holds no resources and performs no I/O; pacing and
//! cancellation belong to the caller (stop pulling to cancel).

use crate::error::{ConfigError, Report, Result};

/// Interpolation parameters for brightness transitions.
#[derive(Debug, Clone)]
pub struct RampCfg {
    /// Nominal distance between successive values, on the normalized
    /// brightness scale.
    pub step_size: f64,
    /// Transitions of this many steps or fewer jump straight to the target
    /// (a single micro-step is visually pointless).
    pub min_steps: u32,
    /// Upper bound on the number of steps; the step size is enlarged when a
    /// transition would exceed it, bounding total animation length.
    pub max_steps: u32,
}

impl Default for RampCfg {
    fn default() -> Self {
        Self {
            step_size: 0.02,
            min_steps: 1,
            max_steps: 30,
        }
    }
}

impl RampCfg {
    pub(crate) fn validate(&self) -> Result<()> {
        let reason = if !self.step_size.is_finite() || self.step_size <= 0.0 {
            Some("step_size must be finite and > 0")
        } else if self.max_steps == 0 {
            Some("max_steps must be >= 1")
        } else if self.min_steps > self.max_steps {
            Some("min_steps must be <= max_steps")
        } else {
            None
        };
        match reason {
            Some(r) => Err(Report::new(ConfigError::Invalid(r))),
            None => Ok(()),
        }
    }
}

/// Finite interpolation sequence ending exactly at the target.
///
/// Values are computed from the start point by index (`start + k * step`)
/// rather than by repeated accumulation, so floating-point drift cannot
/// move the final value off target; the last element is the target itself.
#[derive(Debug, Clone)]
pub struct BrightnessRamp {
    start: f64,
    target: f64,
    /// Signed step toward the target; 0.0 for single-element ramps.
    step: f64,
    /// Total number of values this ramp yields, including the final target.
    total: u32,
    next_idx: u32,
}

impl BrightnessRamp {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(current: Option<f64>, target: f64, cfg: &RampCfg) -> Self {
        let Some(current) = current else {
            return Self::single(target);
        };
        if current == target || !current.is_finite() {
            return Self::single(target);
        }
        let span = (target - current).abs();
        let mut step = cfg.step_size;
        // Saturating cast: an absurdly small step over a large span still
        // lands in the max_steps branch below.
        let mut steps = (span / step).ceil() as u32;
        if steps > cfg.max_steps {
            step = span / f64::from(cfg.max_steps);
            steps = cfg.max_steps;
        }
        if steps <= cfg.min_steps {
            return Self::single(target);
        }
        Self {
            start: current,
            target,
            step: if target > current { step } else { -step },
            total: steps,
            next_idx: 1,
        }
    }

    fn single(target: f64) -> Self {
        Self {
            start: target,
            target,
            step: 0.0,
            total: 1,
            next_idx: 1,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Iterator for BrightnessRamp {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.next_idx > self.total {
            return None;
        }
        let idx = self.next_idx;
        self.next_idx += 1;
        if idx == self.total {
            return Some(self.target);
        }
        let v = self.start + self.step * f64::from(idx);
        // Intermediate values never overshoot the target.
        Some(if self.step > 0.0 {
            v.min(self.target)
        } else {
            v.max(self.target)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total.saturating_sub(self.next_idx - 1) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BrightnessRamp {}
