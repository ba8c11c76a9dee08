//! Signal stabilization for noisy ambient-light streams.
//!
//! Converts a bursty stream of raw lux readings into a rate-bounded stream
//! of stable readings: emissions are throttled to one per window, readings
//! arriving inside the window are coalesced last-value-wins, and a backoff
//! watchdog re-offers the latest raw value when no organic event has
//! occurred for too long (sensors routinely fail to signal slow ambient
//! drops).
//!
//! The stabilizer is a deadline state machine over caller-supplied
//! monotonic milliseconds; it owns no timers and no threads. A host feeds
//! `handle_reading` as readings arrive, calls `poll` when `next_deadline`
//! comes due, and reacts to the returned [`LuxEvent`]s.
//! [`crate::pump::SensorPump`] wraps this with a real sensor and clock.

use crate::error::{ConfigError, Report, Result};

/// Stabilized output of the pipeline's front stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LuxEvent {
    Reading(f64),
    /// The sensor could not produce a reading. Downstream components hold
    /// their last known state on this.
    Unavailable,
}

/// Throttle and watchdog parameters.
#[derive(Debug, Clone)]
pub struct StabilizerCfg {
    /// Minimum spacing between candidate emissions (ms).
    pub throttle_ms: u64,
    /// Initial and post-emission watchdog poll interval (ms).
    pub watchdog_min_ms: u64,
    /// Amount the poll interval grows by on each non-eventful poll (ms).
    pub watchdog_backoff_step_ms: u64,
    /// Upper bound for the poll interval under backoff (ms).
    pub watchdog_max_ms: u64,
}

impl Default for StabilizerCfg {
    fn default() -> Self {
        Self {
            throttle_ms: 500,
            watchdog_min_ms: 5_000,
            watchdog_backoff_step_ms: 5_000,
            watchdog_max_ms: 60_000,
        }
    }
}

impl StabilizerCfg {
    pub(crate) fn validate(&self) -> Result<()> {
        let reason = if self.throttle_ms == 0 {
            Some("throttle_ms must be >= 1")
        } else if self.watchdog_min_ms == 0 {
            Some("watchdog_min_ms must be >= 1")
        } else if self.watchdog_max_ms < self.watchdog_min_ms {
            Some("watchdog_max_ms must be >= watchdog_min_ms")
        } else {
            None
        };
        match reason {
            Some(r) => Err(Report::new(ConfigError::Invalid(r))),
            None => Ok(()),
        }
    }
}

/// Gate deciding whether a candidate emission is forwarded downstream.
/// Receives the raw value seen before the candidate (`None` on the very
/// first reading, which always passes) and the candidate itself. The
/// previous value tracks raw reality, not the last forwarded emission, so
/// jump detection is never computed against stale output.
pub type FilterFn = Box<dyn Fn(Option<f64>, f64) -> bool + Send>;

/// Debounce + coalesce + watchdog state machine.
///
/// All times are monotonic milliseconds measured from one epoch chosen by
/// the caller (construction time is 0). At most one coalescing deadline is
/// pending at any time; scheduling replaces it wholesale, so there is no
/// orphaned callback to cancel.
pub struct Stabilizer {
    cfg: StabilizerCfg,
    filter: Option<FilterFn>,
    /// Latest raw value seen, forwarded or not.
    last_raw: Option<f64>,
    /// The raw value that preceded `last_raw`; comparison point for the
    /// filter when a coalesced or watchdog emission fires.
    prev_raw: Option<f64>,
    last_emit_ms: Option<u64>,
    /// Pending coalescing deadline; the latest raw value is emitted when it
    /// fires.
    pending_ms: Option<u64>,
    watchdog_at_ms: u64,
    poll_interval_ms: u64,
}

impl core::fmt::Debug for Stabilizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stabilizer")
            .field("last_raw", &self.last_raw)
            .field("pending_ms", &self.pending_ms)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}

impl Stabilizer {
    pub fn new(cfg: StabilizerCfg) -> Result<Self> {
        cfg.validate()?;
        let poll_interval_ms = cfg.watchdog_min_ms;
        Ok(Self {
            watchdog_at_ms: poll_interval_ms,
            poll_interval_ms,
            cfg,
            filter: None,
            last_raw: None,
            prev_raw: None,
            last_emit_ms: None,
            pending_ms: None,
        })
    }

    /// Install an emission gate. `None` as the previous value always passes.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(Option<f64>, f64) -> bool + Send + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Latest raw value seen, whether or not it was forwarded.
    pub fn last_raw(&self) -> Option<f64> {
        self.last_raw
    }

    /// Current watchdog poll interval (grows under backoff).
    pub fn poll_interval_ms(&self) -> u64 {
        self.poll_interval_ms
    }

    /// Nearest pending deadline, for hosts that sleep between events.
    pub fn next_deadline(&self) -> u64 {
        match self.pending_ms {
            Some(p) => p.min(self.watchdog_at_ms),
            None => self.watchdog_at_ms,
        }
    }

    /// Feed one raw reading. `None` (sensor failure) is logged and passed
    /// through untouched by throttle or filter; raw-value state is not
    /// disturbed.
    pub fn handle_reading(&mut self, reading: Option<f64>, now_ms: u64) -> Option<LuxEvent> {
        let Some(lux) = reading else {
            tracing::warn!("ambient light reading unavailable");
            return Some(LuxEvent::Unavailable);
        };
        self.prev_raw = self.last_raw;
        self.last_raw = Some(lux);
        match self.last_emit_ms {
            // Inside the throttle window: coalesce. The pending deadline is
            // replaced as a whole; when it fires the latest raw value wins.
            Some(t) if now_ms.saturating_sub(t) < self.cfg.throttle_ms => {
                self.pending_ms = Some(t.saturating_add(self.cfg.throttle_ms));
                None
            }
            _ => self.emit(lux, now_ms, false),
        }
    }

    /// Bypass throttle and filter and emit the latest known raw value, for
    /// external staleness signals such as resume-from-suspend. No-op when
    /// nothing has ever been read.
    pub fn force_update(&mut self, now_ms: u64) -> Option<LuxEvent> {
        let lux = self.last_raw?;
        tracing::debug!(lux, "forced re-emission");
        self.emit(lux, now_ms, true)
    }

    /// Service due deadlines: a due coalescing deadline emits the latest raw
    /// value; a due watchdog re-offers it through the filter, growing the
    /// poll interval when nothing gets forwarded.
    pub fn poll(&mut self, now_ms: u64) -> Option<LuxEvent> {
        if let Some(due) = self.pending_ms
            && now_ms >= due
            && let Some(lux) = self.last_raw
        {
            return self.emit(lux, now_ms, false);
        }
        if now_ms >= self.watchdog_at_ms {
            let fired = match self.last_raw {
                Some(lux) => self.emit(lux, now_ms, false),
                None => None,
            };
            if fired.is_none() {
                // Non-eventful poll: back off.
                self.poll_interval_ms = self
                    .poll_interval_ms
                    .saturating_add(self.cfg.watchdog_backoff_step_ms)
                    .min(self.cfg.watchdog_max_ms);
                self.watchdog_at_ms = now_ms.saturating_add(self.poll_interval_ms);
                tracing::debug!(
                    interval_ms = self.poll_interval_ms,
                    "watchdog poll uneventful, interval grown"
                );
            }
            return fired;
        }
        None
    }

    /// Produce a candidate emission. A filtered-out candidate still consumes
    /// the throttle slot (the timestamp advances) but leaves the watchdog
    /// backoff alone; only forwarded emissions reset it to the minimum.
    fn emit(&mut self, lux: f64, now_ms: u64, bypass_filter: bool) -> Option<LuxEvent> {
        self.pending_ms = None;
        self.last_emit_ms = Some(now_ms);
        if !bypass_filter
            && let Some(filter) = &self.filter
            && self.prev_raw.is_some()
            && !filter(self.prev_raw, lux)
        {
            tracing::trace!(lux, "candidate emission suppressed by filter");
            return None;
        }
        self.poll_interval_ms = self.cfg.watchdog_min_ms;
        self.watchdog_at_ms = now_ms.saturating_add(self.poll_interval_ms);
        tracing::debug!(lux, "stable lux emission");
        Some(LuxEvent::Reading(lux))
    }
}
