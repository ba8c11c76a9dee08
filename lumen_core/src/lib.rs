#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core adaptive-brightness logic (hardware-agnostic).
//!
//! This crate maps ambient light to display brightness. All hardware
//! interactions go through the `lumen_traits::LightSensor` and
//! `lumen_traits::BrightnessSink` traits.
//!
//! ## Architecture
//!
//! - **Stabilization**: throttle, last-value-wins coalescing, and a backoff
//!   watchdog over raw lux readings (`stabilizer` module)
//! - **Resolution**: hysteresis mapping of lux to a bucket of the brightness
//!   table (`buckets` module)
//! - **Bias**: gamma-correct learned correction from manual overrides
//!   (`bias` module)
//! - **Transitions**: finite, exactly-terminating brightness ramps
//!   (`ramp` module)
//! - **Pumping**: a background thread feeding the stabilizer from a real
//!   sensor (`pump` module)
//!
//! The [`Pipeline`] ties resolution, bias, and ramp generation together
//! behind one stateful value; hosts drive it with stabilized [`LuxEvent`]s
//! and consume the returned ramps at their own tick cadence.

// Module declarations
pub mod bias;
pub mod buckets;
pub mod error;
pub mod mocks;
pub mod pump;
pub mod ramp;
pub mod stabilizer;
pub mod util;

use std::marker::PhantomData;

use crate::error::{BuildError, Report, Result};

pub use crate::bias::{BiasCfg, BiasLearner};
pub use crate::buckets::{Bucket, BucketResolver, CrossingPolicy};
pub use crate::ramp::{BrightnessRamp, RampCfg};
pub use crate::stabilizer::{LuxEvent, Stabilizer, StabilizerCfg};

/// Outcome of feeding one stabilized reading through the pipeline.
#[derive(Debug)]
pub struct BrightnessPlan {
    /// Index of the resolved bucket in the configured table.
    pub bucket_index: usize,
    /// The bucket's brightness before bias.
    pub bucket_brightness: f64,
    /// Bias-adjusted brightness the sink should move to.
    pub target: f64,
    /// Whether this reading left the previously active bucket's range;
    /// lets callers gate expensive side effects without re-deriving the
    /// mapping.
    pub crossed_boundary: bool,
    /// Interpolation from the last committed brightness to `target`.
    pub ramp: BrightnessRamp,
}

/// Stateful resolver → bias → ramp pipeline.
///
/// Not synchronized: the resolver's sticky index and the learned ratio are
/// mutated by these calls, so a multi-threaded host must serialize access.
/// Starting to consume a new plan supersedes any in-flight ramp; the host
/// stops pulling the old one before pulling the new (cooperative, checked
/// between values).
#[derive(Debug)]
pub struct Pipeline {
    resolver: BucketResolver,
    bias: BiasLearner,
    ramp: RampCfg,
    last_lux: Option<f64>,
    last_auto_target: Option<f64>,
    /// Last brightness actually applied at the sink, committed by the host.
    applied: Option<f64>,
}

impl Pipeline {
    /// Start building a Pipeline.
    pub fn builder() -> PipelineBuilder<Missing> {
        PipelineBuilder::default()
    }

    /// Feed one stabilized event. `Unavailable` holds all state and returns
    /// `None`; the next crossing check is then computed conservatively.
    pub fn on_lux_event(&mut self, event: LuxEvent) -> Option<BrightnessPlan> {
        let lux = match event {
            LuxEvent::Reading(lux) => lux,
            LuxEvent::Unavailable => {
                tracing::trace!("lux unavailable; holding last state");
                self.last_lux = None;
                return None;
            }
        };
        let crossed_boundary = self.resolver.crossed_boundary(self.last_lux, Some(lux));
        let bucket_index = self.resolver.resolve(lux, true);
        let bucket_brightness = self.resolver.brightness_at(bucket_index);
        let target = self.bias.apply(bucket_brightness);
        self.last_lux = Some(lux);
        self.last_auto_target = Some(target);
        let ramp = BrightnessRamp::new(self.applied, target, &self.ramp);
        tracing::debug!(
            lux,
            bucket_index,
            target,
            crossed_boundary,
            "brightness plan"
        );
        Some(BrightnessPlan {
            bucket_index,
            bucket_brightness,
            target,
            crossed_boundary,
            ramp,
        })
    }

    /// Record the brightness the host actually applied; subsequent ramps
    /// start from here.
    pub fn commit_brightness(&mut self, level: f64) {
        self.applied = Some(level);
    }

    /// Learn from a manual override. Returns the new bias ratio, or `None`
    /// when no automatic choice exists yet or the division is undefined.
    pub fn on_manual_brightness(&mut self, manual: f64) -> Option<f64> {
        self.applied = Some(manual);
        let automatic = self.last_auto_target?;
        self.bias.update(manual, automatic)
    }

    /// Forget the learned preference.
    pub fn reset_bias(&mut self) {
        self.bias.reset();
    }

    pub fn bias_ratio(&self) -> f64 {
        self.bias.ratio()
    }

    pub fn current_bucket(&self) -> Option<usize> {
        self.resolver.current_index()
    }

    pub fn resolver(&self) -> &BucketResolver {
        &self.resolver
    }
}

// Type-state markers for the builder
pub struct Missing;
pub struct Set;

/// Builder for `Pipeline`. The bucket table is mandatory; everything else
/// defaults. All fields are validated on `build()`.
pub struct PipelineBuilder<B> {
    buckets: Option<Vec<Bucket>>,
    crossing: CrossingPolicy,
    bias: Option<BiasCfg>,
    ramp: Option<RampCfg>,
    _b: PhantomData<B>,
}

impl Default for PipelineBuilder<Missing> {
    fn default() -> Self {
        Self {
            buckets: None,
            crossing: CrossingPolicy::default(),
            bias: None,
            ramp: None,
            _b: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state
impl<B> PipelineBuilder<B> {
    pub fn with_bias(mut self, bias: BiasCfg) -> Self {
        self.bias = Some(bias);
        self
    }
    pub fn with_ramp(mut self, ramp: RampCfg) -> Self {
        self.ramp = Some(ramp);
        self
    }
    pub fn with_crossing_policy(mut self, crossing: CrossingPolicy) -> Self {
        self.crossing = crossing;
        self
    }

    /// Fallible build available in any type-state; returns a detailed
    /// BuildError for missing pieces.
    pub fn try_build(self) -> Result<Pipeline> {
        let PipelineBuilder {
            buckets,
            crossing,
            bias,
            ramp,
            _b: _,
        } = self;

        let buckets = buckets.ok_or_else(|| Report::new(BuildError::MissingBuckets))?;
        let resolver = BucketResolver::with_policy(buckets, crossing)
            .map_err(|e| e.wrap_err(BuildError::InvalidConfig("buckets")))?;
        let bias = BiasLearner::new(bias.unwrap_or_default())
            .map_err(|e| e.wrap_err(BuildError::InvalidConfig("bias")))?;
        let ramp = ramp.unwrap_or_default();
        ramp.validate()
            .map_err(|e| e.wrap_err(BuildError::InvalidConfig("ramp")))?;

        Ok(Pipeline {
            resolver,
            bias,
            ramp,
            last_lux: None,
            last_auto_target: None,
            applied: None,
        })
    }
}

// Setter that advances type-state when providing the mandatory table
impl PipelineBuilder<Missing> {
    pub fn with_buckets(self, buckets: Vec<Bucket>) -> PipelineBuilder<Set> {
        let PipelineBuilder {
            buckets: _,
            crossing,
            bias,
            ramp,
            _b: _,
        } = self;
        PipelineBuilder {
            buckets: Some(buckets),
            crossing,
            bias,
            ramp,
            _b: PhantomData,
        }
    }
}

impl PipelineBuilder<Set> {
    /// Validate and build the Pipeline. Only available once buckets are set.
    pub fn build(self) -> Result<Pipeline> {
        self.try_build()
    }
}
