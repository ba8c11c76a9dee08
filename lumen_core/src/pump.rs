//! Background sensor pumping.
//!
//! Spawns a thread that owns the `LightSensor`, feeds its readings through
//! a [`Stabilizer`](crate::stabilizer::Stabilizer), and pushes forwarded
//! [`LuxEvent`]s over a bounded channel. Read failures are logged and fed
//! to the stabilizer as "no reading".
//!
//! Safety: each `SensorPump` spawns exactly one thread that is shut down
//! when the pump is dropped, preventing thread leaks.

use crossbeam_channel as xch;
use lumen_traits::LightSensor;
use lumen_traits::clock::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::stabilizer::{LuxEvent, Stabilizer};

/// Non-blocking push so a stalled consumer can never wedge the pump thread
/// (Drop joins it). Returns false once the consumer is gone.
fn push_event(tx: &xch::Sender<LuxEvent>, ev: LuxEvent) -> bool {
    match tx.try_send(ev) {
        Ok(()) => true,
        Err(xch::TrySendError::Full(ev)) => {
            tracing::trace!(?ev, "event channel full, dropping event");
            true
        }
        Err(xch::TrySendError::Disconnected(_)) => {
            tracing::debug!("SensorPump consumer disconnected, exiting thread");
            false
        }
    }
}

pub struct SensorPump {
    rx: xch::Receiver<LuxEvent>,
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Set by `request_force_update`; consumed by the pump thread.
    force: Arc<AtomicBool>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl SensorPump {
    /// Spawn the pump thread. `hz` paces sensor reads; `timeout` bounds a
    /// single blocking read. The stabilizer's deadlines are serviced on the
    /// same cadence, so its effective resolution is one read period.
    pub fn spawn<S, C>(
        mut sensor: S,
        mut stabilizer: Stabilizer,
        hz: u32,
        timeout: Duration,
        clock: C,
    ) -> Self
    where
        S: LightSensor + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let (tx, rx) = xch::bounded(8);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let force = Arc::new(AtomicBool::new(false));
        let force_clone = force.clone();
        let period = Duration::from_micros(crate::util::period_us(hz));

        let join_handle = std::thread::spawn(move || {
            let epoch = clock.now();
            // Report a failure once per consecutive-failure streak instead
            // of flooding downstream with Unavailable on every timeout.
            let mut failing = false;
            loop {
                // Immediate shutdown check (lock-free atomic)
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("SensorPump thread received shutdown signal");
                    break;
                }

                let reading = match sensor.read_lux(timeout) {
                    Ok(v) if v.is_finite() && v >= 0.0 => {
                        failing = false;
                        Some(Some(v))
                    }
                    Ok(v) => {
                        tracing::warn!(lux = v, "discarding non-finite or negative lux reading");
                        None
                    }
                    Err(e) => {
                        if failing {
                            None
                        } else {
                            tracing::warn!(error = %e, "light sensor read failed");
                            failing = true;
                            Some(None)
                        }
                    }
                };

                let now = clock.ms_since(epoch);
                if force_clone.swap(false, Ordering::Relaxed)
                    && let Some(ev) = stabilizer.force_update(now)
                    && !push_event(&tx, ev)
                {
                    break;
                }
                if let Some(reading) = reading
                    && let Some(ev) = stabilizer.handle_reading(reading, now)
                    && !push_event(&tx, ev)
                {
                    break;
                }
                if now >= stabilizer.next_deadline()
                    && let Some(ev) = stabilizer.poll(now)
                    && !push_event(&tx, ev)
                {
                    break;
                }

                // Check shutdown before sleep to avoid unnecessary delay
                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                clock.sleep(period);
            }
            tracing::trace!("SensorPump thread exiting cleanly");
        });

        Self {
            rx,
            shutdown,
            force,
            join_handle: Some(join_handle),
        }
    }

    /// Channel of forwarded stabilizer events.
    pub fn events(&self) -> &xch::Receiver<LuxEvent> {
        &self.rx
    }

    /// Drain the channel and return the most recent event, if any.
    pub fn latest(&self) -> Option<LuxEvent> {
        self.rx.try_iter().last()
    }

    /// Ask the pump to re-emit the latest raw value, bypassing throttle and
    /// filter. Used when the organic stream may be stale, e.g. after a
    /// resume from suspend.
    pub fn request_force_update(&self) {
        self.force.store(true, Ordering::Relaxed);
    }
}

impl Drop for SensorPump {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits once the current blocking read completes (bounded
        // by the per-read timeout) or immediately if it is between reads.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("SensorPump thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "SensorPump thread panicked during shutdown");
                }
            }
        }
    }
}
