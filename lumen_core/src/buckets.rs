//! Hysteresis bucket resolution.
//!
//! Maps a lux value to exactly one entry of an ordered bucket table,
//! preferring the currently active bucket when the value still lies inside
//! its range. Adjacent ranges may overlap by design; the overlap zones are
//! what provide hysteresis near boundaries.

use crate::error::{ConfigError, Report, Result};

/// One entry of the lux → brightness table. Ranges are inclusive on both
/// ends and may overlap their neighbors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub min_lux: f64,
    pub max_lux: f64,
    /// Target brightness fraction in [0, 1].
    pub brightness: f64,
}

impl Bucket {
    #[inline]
    pub fn contains(&self, lux: f64) -> bool {
        lux >= self.min_lux && lux <= self.max_lux
    }

    /// Distance from `lux` to the nearest boundary; 0 when inside the range.
    #[inline]
    fn boundary_distance(&self, lux: f64) -> f64 {
        if lux < self.min_lux {
            self.min_lux - lux
        } else if lux > self.max_lux {
            lux - self.max_lux
        } else {
            0.0
        }
    }
}

/// How `crossed_boundary` behaves when no bucket is currently active.
///
/// - `Conservative`: unknown state counts as crossed, so callers gating an
///   expensive side effect always get notified.
/// - `FreshResolve`: the previous lux value is resolved statelessly and the
///   current value is tested against that bucket's range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CrossingPolicy {
    #[default]
    Conservative,
    FreshResolve,
}

/// Stateful resolver owning the bucket table and the sticky current index.
///
/// Replacing the bucket table requires constructing a fresh resolver; the
/// sticky index is only ever valid against the table it was resolved from.
#[derive(Debug)]
pub struct BucketResolver {
    buckets: Vec<Bucket>,
    current: Option<usize>,
    crossing: CrossingPolicy,
}

impl BucketResolver {
    pub fn new(buckets: Vec<Bucket>) -> Result<Self> {
        Self::with_policy(buckets, CrossingPolicy::default())
    }

    pub fn with_policy(buckets: Vec<Bucket>, crossing: CrossingPolicy) -> Result<Self> {
        validate_buckets(&buckets)?;
        Ok(Self {
            buckets,
            current: None,
            crossing,
        })
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Index of the bucket resolved by the most recent `resolve` call.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn brightness_at(&self, index: usize) -> f64 {
        self.buckets[index].brightness
    }

    /// Map `lux` to a bucket index and record it as the current bucket.
    ///
    /// With `with_hysteresis` set, the current bucket wins whenever the value
    /// still lies inside its (inclusive) range, even if an overlapping
    /// neighbor also contains it. Without it, the resolution is stateless in
    /// its inputs ("what would automatic choose") but still updates the
    /// sticky index.
    pub fn resolve(&mut self, lux: f64, with_hysteresis: bool) -> usize {
        let index = if with_hysteresis
            && let Some(cur) = self.current
            && self.buckets[cur].contains(lux)
        {
            cur
        } else {
            self.lookup(lux)
        };
        tracing::trace!(
            lux,
            index,
            with_hysteresis,
            brightness = self.buckets[index].brightness,
            "bucket resolve"
        );
        self.current = Some(index);
        index
    }

    /// Stateless bucket lookup: first containing bucket in table order, else
    /// the nearest bucket by boundary distance (ties to the lower index).
    /// A value below the first bucket's minimum always maps to bucket 0;
    /// there is no lower bucket to compare against.
    pub fn lookup(&self, lux: f64) -> usize {
        if lux < self.buckets[0].min_lux {
            return 0;
        }
        for (i, b) in self.buckets.iter().enumerate() {
            if b.contains(lux) {
                return i;
            }
        }
        // Configuration gap: fall back to the nearest boundary.
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, b) in self.buckets.iter().enumerate() {
            let d = b.boundary_distance(lux);
            if d < best_dist {
                best = i;
                best_dist = d;
            }
        }
        best
    }

    /// Whether moving from `prev` to `curr` leaves the currently active
    /// bucket's range. `None` on either side reports crossed; state is
    /// unknown, so callers are always notified. Behavior with no active
    /// bucket follows the configured [`CrossingPolicy`].
    pub fn crossed_boundary(&self, prev: Option<f64>, curr: Option<f64>) -> bool {
        let (Some(prev), Some(curr)) = (prev, curr) else {
            return true;
        };
        let index = match self.current {
            Some(i) => i,
            None => match self.crossing {
                CrossingPolicy::Conservative => return true,
                CrossingPolicy::FreshResolve => self.lookup(prev),
            },
        };
        !self.buckets[index].contains(curr)
    }
}

fn validate_buckets(buckets: &[Bucket]) -> Result<()> {
    if buckets.is_empty() {
        return Err(Report::new(ConfigError::EmptyBuckets));
    }
    for (index, b) in buckets.iter().enumerate() {
        let reason = if !b.min_lux.is_finite() || !b.max_lux.is_finite() {
            Some("lux bounds must be finite")
        } else if b.min_lux < 0.0 {
            Some("min_lux must be >= 0")
        } else if b.min_lux > b.max_lux {
            Some("min_lux must be <= max_lux")
        } else if !b.brightness.is_finite() || !(0.0..=1.0).contains(&b.brightness) {
            Some("brightness must be within [0, 1]")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(Report::new(ConfigError::InvalidBucket { index, reason }));
        }
    }
    Ok(())
}
