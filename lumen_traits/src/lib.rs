pub mod clock;

pub use clock::{Clock, MonotonicClock, TestClock};

/// Ambient light sensor seam. Implementations block until a reading is
/// available or the timeout expires. Readings are illuminance in lux and
/// must be non-negative.
pub trait LightSensor {
    fn read_lux(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Brightness output seam (backlight, DDC, D-Bus proxy, ...).
/// `level` is a fraction in `[0.0, 1.0]`.
pub trait BrightnessSink {
    fn set_brightness(
        &mut self,
        level: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
