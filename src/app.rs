use std::time::Instant;

use crate::config::{FRAME_DT, GRID_COLUMNS, GRID_ROWS};
use crate::error::Result;
use crate::simulation::{BackendKind, MeshConnectivity, RandomDisturber, WaveParams, WaveSimulator};

/// Totals reported at the end of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub steps: u64,
    pub disturbances: u64,
    /// Largest absolute height in the final field
    pub peak_height: f32,
}

/// Headless driver: ticks the simulator at a fixed frame rate and drops
/// random disturbances on the surface.
pub struct App {
    simulator: WaveSimulator,
    disturber: RandomDisturber,
    mesh: MeshConnectivity,
    frame_dt: f32,
    step_counter: StepCounter,
}

impl App {
    /// Default-sized field on the requested backend
    pub fn new(kind: BackendKind) -> Result<Self> {
        log::info!("Initializing wave field...");
        log::info!("Grid size: {}x{}", GRID_ROWS, GRID_COLUMNS);

        let params = WaveParams::default();
        log::info!(
            "Courant number {:.3} ({})",
            params.courant_number(),
            if params.is_stable() { "stable" } else { "unstable" }
        );

        let simulator = WaveSimulator::with_backend(params, kind)?;
        Ok(Self::with_parts(simulator, RandomDisturber::default()))
    }

    pub fn with_parts(simulator: WaveSimulator, disturber: RandomDisturber) -> Self {
        let mesh = MeshConnectivity::build(simulator.field().topology());
        log::info!("Mesh triangles: {}", mesh.triangle_count());
        Self {
            simulator,
            disturber,
            mesh,
            frame_dt: FRAME_DT,
            step_counter: StepCounter::new(),
        }
    }

    pub fn simulator(&self) -> &WaveSimulator {
        &self.simulator
    }

    pub fn mesh(&self) -> &MeshConnectivity {
        &self.mesh
    }

    /// Run `frames` ticks of `FRAME_DT` seconds each.
    pub fn run(&mut self, frames: u64) -> Result<RunSummary> {
        log::info!(
            "Running {} frames on {} backend",
            frames,
            self.simulator.backend_name()
        );

        let start_steps = self.simulator.step_count();
        let mut disturbances = 0;

        for _ in 0..frames {
            if let Some(d) = self.disturber.tick(self.frame_dt, &mut self.simulator)? {
                disturbances += 1;
                log::debug!("wave at ({}, {}) magnitude {:.2}", d.row, d.col, d.magnitude);
            }

            if self.simulator.step(self.frame_dt)? {
                if let Some(rate) = self.step_counter.tick() {
                    log::info!(
                        "{:.0} steps/s, t = {:.2}s, peak height {:.3}",
                        rate,
                        self.simulator.simulated_time(),
                        self.peak_height()
                    );
                }
            }
        }

        let summary = RunSummary {
            frames,
            steps: self.simulator.step_count() - start_steps,
            disturbances,
            peak_height: self.peak_height(),
        };
        log::info!(
            "Done: {} steps, {} disturbances, peak height {:.3}",
            summary.steps,
            summary.disturbances,
            summary.peak_height
        );
        Ok(summary)
    }

    fn peak_height(&self) -> f32 {
        self.simulator
            .field()
            .positions()
            .iter()
            .fold(0.0_f32, |peak, p| peak.max(p.y.abs()))
    }
}

/// Simple step-rate counter
struct StepCounter {
    last_update: Instant,
    step_count: u32,
}

impl StepCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            step_count: 0,
        }
    }

    /// Tick the counter, returns Some(steps per second) every second
    fn tick(&mut self) -> Option<f64> {
        self.step_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let rate = self.step_count as f64 / elapsed.as_secs_f64();
            self.step_count = 0;
            self.last_update = Instant::now();
            Some(rate)
        } else {
            None
        }
    }
}
