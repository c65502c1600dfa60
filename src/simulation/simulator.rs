use super::backend::{BackendKind, StepBackend};
use super::field::WaveField;
use super::params::WaveParams;
use crate::config::MIN_DISTURB_MARGIN;
use crate::error::{Result, WaveError};

/// Advances a wave field at a fixed internal rate.
///
/// Callers report elapsed time with [`step`](Self::step) as often as they
/// like; one discrete update happens each time the accumulated time reaches
/// the field's time step. All mutation goes through `&mut self`, so a step
/// and a disturbance can never overlap.
pub struct WaveSimulator {
    field: WaveField,
    backend: Box<dyn StepBackend>,
    accumulator: f32,
    steps: u64,
}

impl WaveSimulator {
    /// Wrap an initialized field with the given backend.
    pub fn new(field: WaveField, backend: Box<dyn StepBackend>) -> Result<Self> {
        if !field.is_initialized() {
            return Err(WaveError::NotInitialized);
        }
        log::info!(
            "Simulator ready: {}x{} grid on {} backend",
            field.topology().rows(),
            field.topology().columns(),
            backend.name()
        );
        Ok(Self {
            field,
            backend,
            accumulator: 0.0,
            steps: 0,
        })
    }

    /// Initialize a field from `params` and build the requested backend.
    pub fn with_backend(params: WaveParams, kind: BackendKind) -> Result<Self> {
        let field = WaveField::new(params)?;
        Self::new(field, kind.build()?)
    }

    /// Re-initialize the owned field. Counters reset only on success.
    pub fn reinit(&mut self, params: WaveParams) -> Result<()> {
        self.field.init(params)?;
        self.accumulator = 0.0;
        self.steps = 0;
        Ok(())
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Discrete updates performed since construction or the last reinit
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Simulated time covered by the discrete updates so far
    pub fn simulated_time(&self) -> f64 {
        self.steps as f64 * self.field.params().time_step as f64
    }

    /// Accumulate `elapsed` seconds and perform one discrete update once a
    /// full time step has built up. Returns whether an update happened.
    pub fn step(&mut self, elapsed: f32) -> Result<bool> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(WaveError::InvalidParameter {
                name: "elapsed",
                value: elapsed,
            });
        }

        self.accumulator += elapsed;
        if self.accumulator < self.field.params().time_step {
            return Ok(false);
        }

        self.advance()?;
        self.accumulator = 0.0;
        Ok(true)
    }

    /// Perform exactly one discrete update regardless of accumulated time.
    pub fn advance(&mut self) -> Result<()> {
        let grid = *self.field.topology();
        let coefficients = *self.field.coefficients();

        let (current, previous) = self.field.solutions_mut();
        self.backend.advance(&grid, &coefficients, current, previous)?;

        self.field.swap();

        let (current, normals, tangents) = self.field.shading_mut();
        self.backend.derive_shading(&grid, current, normals, tangents)?;

        self.steps += 1;
        log::trace!("step {} complete", self.steps);
        Ok(())
    }

    /// Add a local impulse to the current solution: `magnitude` at
    /// (row, col) and half of it on each orthogonal neighbour.
    ///
    /// (row, col) must be at least two cells from every edge.
    pub fn disturb(&mut self, row: usize, col: usize, magnitude: f32) -> Result<()> {
        if !magnitude.is_finite() {
            return Err(WaveError::InvalidParameter {
                name: "magnitude",
                value: magnitude,
            });
        }

        let grid = *self.field.topology();
        let (rows, columns) = (grid.rows(), grid.columns());
        let in_range = |i: usize, len: usize| {
            i >= MIN_DISTURB_MARGIN && i + MIN_DISTURB_MARGIN < len
        };
        if !in_range(row, rows) || !in_range(col, columns) {
            return Err(WaveError::DisturbOutOfRange {
                row,
                col,
                rows,
                columns,
            });
        }

        let n = columns;
        let center = grid.index(row, col);
        let half = 0.5 * magnitude;

        let current = self.field.current_mut();
        current[center].y += magnitude;
        current[center + 1].y += half;
        current[center - 1].y += half;
        current[center + n].y += half;
        current[center - n].y += half;

        log::debug!("disturb ({}, {}) by {:.3}", row, col, magnitude);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{Coefficients, SequentialBackend};

    fn reference_params(rows: usize, columns: usize) -> WaveParams {
        WaveParams {
            rows,
            columns,
            spatial_step: 1.0,
            time_step: 0.03,
            wave_speed: 3.25,
            damping: 0.4,
        }
    }

    fn simulator(rows: usize, columns: usize) -> WaveSimulator {
        WaveSimulator::with_backend(reference_params(rows, columns), BackendKind::Sequential).unwrap()
    }

    #[test]
    fn test_uninitialized_field_rejected() {
        let result = WaveSimulator::new(WaveField::default(), Box::new(SequentialBackend));
        assert!(matches!(result, Err(WaveError::NotInitialized)));
    }

    #[test]
    fn test_disturb_touches_five_cells() {
        let mut sim = simulator(10, 10);
        sim.disturb(5, 5, 2.0).unwrap();

        let field = sim.field();
        let grid = field.topology();
        let mut changed = 0;
        for row in 0..10 {
            for col in 0..10 {
                let h = field.height(row, col).unwrap();
                let expected = match (row, col) {
                    (5, 5) => 2.0,
                    (4, 5) | (6, 5) | (5, 4) | (5, 6) => 1.0,
                    _ => 0.0,
                };
                assert_eq!(h, expected, "height at ({}, {})", row, col);
                if h != 0.0 {
                    changed += 1;
                }
            }
        }
        assert_eq!(changed, 5);
        assert_eq!(grid.vertex_count(), 100);
        // Previous buffer untouched
        assert!(field.previous_positions().iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn test_disturb_margin() {
        let mut sim = simulator(10, 10);
        let before = sim.field().snapshot();

        for (row, col) in [(1, 5), (5, 1), (8, 5), (5, 8), (0, 0), (42, 3)] {
            let result = sim.disturb(row, col, 1.0);
            assert!(
                matches!(result, Err(WaveError::DisturbOutOfRange { .. })),
                "({}, {}) should be rejected",
                row,
                col
            );
        }
        assert_eq!(sim.field().snapshot(), before);

        // Tightest legal positions
        sim.disturb(2, 2, 1.0).unwrap();
        sim.disturb(7, 7, 1.0).unwrap();
    }

    #[test]
    fn test_disturb_rejects_nan() {
        let mut sim = simulator(10, 10);
        assert!(sim.disturb(5, 5, f32::NAN).is_err());
    }

    #[test]
    fn test_single_disturb_then_step() {
        let mut sim = simulator(10, 10);
        let k = *sim.field().coefficients();
        sim.disturb(5, 5, 2.0).unwrap();

        assert!(sim.step(0.03).unwrap());
        // Each neighbour holds magnitude / 2 = 1.0; the k1 term sees a zero previous
        let expected = k.k2 * 2.0 + k.k3 * (1.0 + 1.0 + 1.0 + 1.0);
        let h = sim.field().height(5, 5).unwrap();
        assert!((h - expected).abs() < 1e-6, "expected {}, got {}", expected, h);
        // Old current (the disturbed state) is now previous
        let grid = sim.field().topology();
        assert_eq!(sim.field().previous_positions()[grid.vertex_index(5, 5).unwrap()].y, 2.0);
        assert_eq!(sim.step_count(), 1);
    }

    #[test]
    fn test_accumulates_until_time_step() {
        let mut sim = simulator(10, 10);
        sim.disturb(5, 5, 1.0).unwrap();

        assert!(!sim.step(0.01).unwrap());
        assert!(!sim.step(0.01).unwrap());
        assert_eq!(sim.step_count(), 0);
        assert_eq!(sim.field().height(5, 5).unwrap(), 1.0);

        assert!(sim.step(0.015).unwrap());
        assert_eq!(sim.step_count(), 1);

        // Accumulator was reset; a small tick does nothing
        assert!(!sim.step(0.001).unwrap());
        // A single huge tick still performs exactly one update
        assert!(sim.step(10.0).unwrap());
        assert_eq!(sim.step_count(), 2);
    }

    #[test]
    fn test_step_rejects_bad_elapsed() {
        let mut sim = simulator(10, 10);
        assert!(sim.step(-0.1).is_err());
        assert!(sim.step(f32::INFINITY).is_err());
        assert_eq!(sim.step_count(), 0);
    }

    #[test]
    fn test_normals_follow_heights() {
        let mut sim = simulator(12, 12);
        sim.disturb(6, 6, 2.0).unwrap();
        sim.advance().unwrap();

        let field = sim.field();
        let grid = field.topology();
        // Left of the peak the surface rises toward +x, so the normal leans to -x
        let left = grid.vertex_index(6, 5).unwrap();
        assert!(field.normals()[left].x < 0.0);
        assert!(field.tangents()[left].y > 0.0);
        for n in field.normals() {
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
        // Boundary shading never recomputed
        assert_eq!(field.normals()[0], glam::Vec3::Y);
    }

    #[test]
    fn test_reinit_resets_counters() {
        let mut sim = simulator(10, 10);
        sim.disturb(5, 5, 1.0).unwrap();
        sim.advance().unwrap();
        sim.step(0.02).unwrap();

        assert!(sim.reinit(reference_params(2, 2)).is_err());
        assert_eq!(sim.step_count(), 1);

        sim.reinit(reference_params(16, 12)).unwrap();
        assert_eq!(sim.step_count(), 0);
        assert_eq!(sim.field().positions().len(), 192);
        // Accumulator cleared: 0.02 alone is below the time step
        assert!(!sim.step(0.02).unwrap());
        assert_eq!(
            *sim.field().coefficients(),
            Coefficients::from_params(&reference_params(16, 12)).unwrap()
        );
    }

    #[test]
    fn test_simulated_time() {
        let mut sim = simulator(10, 10);
        for _ in 0..10 {
            sim.advance().unwrap();
        }
        assert!((sim.simulated_time() - 0.3).abs() < 1e-6);
        assert_eq!(sim.backend_name(), "sequential");
    }
}
