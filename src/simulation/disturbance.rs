use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::grid::GridTopology;
use super::simulator::WaveSimulator;
use crate::config::{
    DISTURB_INTERVAL, DISTURB_MAGNITUDE_MAX, DISTURB_MAGNITUDE_MIN, DISTURB_MARGIN,
    MIN_DISTURB_MARGIN,
};
use crate::error::{Result, WaveError};

/// One applied disturbance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disturbance {
    pub row: usize,
    pub col: usize,
    pub magnitude: f32,
}

/// Fires a random disturbance every `interval` seconds of reported time.
#[derive(Debug)]
pub struct RandomDisturber {
    rng: StdRng,
    margin: usize,
    interval: f32,
    magnitude: (f32, f32),
    accumulator: f32,
}

impl Default for RandomDisturber {
    fn default() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl RandomDisturber {
    fn new(rng: StdRng) -> Self {
        Self {
            rng,
            margin: DISTURB_MARGIN,
            interval: DISTURB_INTERVAL,
            magnitude: (DISTURB_MAGNITUDE_MIN, DISTURB_MAGNITUDE_MAX),
            accumulator: 0.0,
        }
    }

    /// Deterministic disturber for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Distance from every edge to keep clear. Values below 2 are raised to 2.
    pub fn with_margin(mut self, margin: usize) -> Self {
        self.margin = margin.max(MIN_DISTURB_MARGIN);
        self
    }

    /// Seconds between disturbances; 0 fires on every tick.
    pub fn with_interval(mut self, interval: f32) -> Result<Self> {
        if !interval.is_finite() || interval < 0.0 {
            return Err(WaveError::InvalidParameter {
                name: "interval",
                value: interval,
            });
        }
        self.interval = interval;
        Ok(self)
    }

    /// Magnitude range `[min, max)`
    pub fn with_magnitude(mut self, min: f32, max: f32) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(WaveError::InvalidParameter {
                name: "magnitude",
                value: max - min,
            });
        }
        self.magnitude = (min, max);
        Ok(self)
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Margin actually usable on `topology`, or `None` if the grid is too
    /// small for even the minimum margin.
    fn effective_margin(&self, topology: &GridTopology) -> Option<usize> {
        let fits = |m: usize| topology.rows() > 2 * m && topology.columns() > 2 * m;
        if fits(self.margin) {
            Some(self.margin)
        } else if fits(MIN_DISTURB_MARGIN) {
            Some(MIN_DISTURB_MARGIN)
        } else {
            None
        }
    }

    /// Draw a position and magnitude without applying it.
    pub fn pick(&mut self, topology: &GridTopology) -> Option<Disturbance> {
        let margin = self.effective_margin(topology)?;
        let row = margin + self.rng.gen_range(0..topology.rows() - 2 * margin);
        let col = margin + self.rng.gen_range(0..topology.columns() - 2 * margin);
        let magnitude = self.rng.gen_range(self.magnitude.0..self.magnitude.1);
        Some(Disturbance {
            row,
            col,
            magnitude,
        })
    }

    /// Report `elapsed` seconds; once the interval has passed, disturb the
    /// simulator at a random position and return what was applied.
    pub fn tick(&mut self, elapsed: f32, simulator: &mut WaveSimulator) -> Result<Option<Disturbance>> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(WaveError::InvalidParameter {
                name: "elapsed",
                value: elapsed,
            });
        }

        self.accumulator += elapsed;
        if self.accumulator < self.interval {
            return Ok(None);
        }
        self.accumulator = 0.0;

        let Some(disturbance) = self.pick(simulator.field().topology()) else {
            log::warn!("grid too small for random disturbances");
            return Ok(None);
        };
        simulator.disturb(disturbance.row, disturbance.col, disturbance.magnitude)?;
        Ok(Some(disturbance))
    }
}
