//! Test and helper mocks for lumen_core

use std::sync::{Arc, Mutex};

/// A sensor that always errors on read; useful when driving the stabilizer
/// with externally supplied readings via `Stabilizer::handle_reading`.
pub struct NoopSensor;

impl lumen_traits::LightSensor for NoopSensor {
    fn read_lux(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("noop sensor")))
    }
}

/// A sensor that replays a fixed sequence of lux values, then repeats the
/// last one indefinitely.
pub struct ScriptedSensor {
    values: Vec<f64>,
    idx: usize,
}

impl ScriptedSensor {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, idx: 0 }
    }
}

impl lumen_traits::LightSensor for ScriptedSensor {
    fn read_lux(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        if self.values.is_empty() {
            return Err(Box::new(std::io::Error::other("no scripted values")));
        }
        let i = self.idx.min(self.values.len() - 1);
        self.idx = self.idx.saturating_add(1);
        Ok(self.values[i])
    }
}

/// A brightness sink that records every commanded level.
#[derive(Default, Clone)]
pub struct RecordingSink {
    pub levels: Arc<Mutex<Vec<f64>>>,
}

impl lumen_traits::BrightnessSink for RecordingSink {
    fn set_brightness(
        &mut self,
        level: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut v) = self.levels.lock() {
            v.push(level);
        }
        Ok(())
    }
}
