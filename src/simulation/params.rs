use crate::config::{DAMPING, GRID_COLUMNS, GRID_ROWS, SPATIAL_STEP, TIME_STEP, WAVE_SPEED};
use crate::error::{Result, WaveError};

/// Smallest usable grid edge: the update needs a 1-cell border on each side.
pub const MIN_GRID_DIM: usize = 4;

/// Initialization parameters for a wave field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    /// Number of grid rows (m).
    pub rows: usize,

    /// Number of grid columns (n).
    pub columns: usize,

    /// Distance between adjacent grid points (dx).
    pub spatial_step: f32,

    /// Fixed simulation time step in seconds (dt).
    pub time_step: f32,

    /// Wave propagation speed.
    pub wave_speed: f32,

    /// Damping coefficient. Zero gives an undamped field.
    pub damping: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            rows: GRID_ROWS,
            columns: GRID_COLUMNS,
            spatial_step: SPATIAL_STEP,
            time_step: TIME_STEP,
            wave_speed: WAVE_SPEED,
            damping: DAMPING,
        }
    }
}

impl WaveParams {
    /// Default physics on a grid of the given size.
    pub fn with_size(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            ..Self::default()
        }
    }

    /// Reject configurations the field cannot be initialized with.
    pub fn validate(&self) -> Result<()> {
        if self.rows < MIN_GRID_DIM || self.columns < MIN_GRID_DIM {
            return Err(WaveError::InvalidDimensions {
                rows: self.rows,
                columns: self.columns,
            });
        }
        positive("spatial_step", self.spatial_step)?;
        positive("time_step", self.time_step)?;
        positive("wave_speed", self.wave_speed)?;
        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(WaveError::InvalidParameter {
                name: "damping",
                value: self.damping,
            });
        }
        Ok(())
    }

    /// Courant number `c * dt / dx`.
    pub fn courant_number(&self) -> f32 {
        self.wave_speed * self.time_step / self.spatial_step
    }

    /// The explicit 2D scheme stays bounded for a Courant number <= 1/sqrt(2).
    pub fn is_stable(&self) -> bool {
        self.courant_number() <= std::f32::consts::FRAC_1_SQRT_2
    }
}

fn positive(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(WaveError::InvalidParameter { name, value })
    }
}

/// Precomputed coefficients of the explicit damped wave update:
///
/// `h_next = k1 * h_prev + k2 * h_curr + k3 * (sum of 4 neighbours)`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coefficients {
    /// Weight of the oldest sample (damping term).
    pub k1: f32,
    /// Weight of the current center sample.
    pub k2: f32,
    /// Weight of the sum of the four current orthogonal neighbours.
    pub k3: f32,
}

impl Coefficients {
    pub fn new(spatial_step: f32, time_step: f32, wave_speed: f32, damping: f32) -> Result<Self> {
        let d = damping * time_step + 2.0;
        if d == 0.0 {
            return Err(WaveError::DegenerateCoefficients { damping, time_step });
        }
        let e = (wave_speed * wave_speed) * (time_step * time_step) / (spatial_step * spatial_step);

        let coefficients = Self {
            k1: (damping * time_step - 2.0) / d,
            k2: (4.0 - 8.0 * e) / d,
            k3: (2.0 * e) / d,
        };
        if !(coefficients.k1.is_finite() && coefficients.k2.is_finite() && coefficients.k3.is_finite()) {
            return Err(WaveError::DegenerateCoefficients { damping, time_step });
        }
        Ok(coefficients)
    }

    pub fn from_params(params: &WaveParams) -> Result<Self> {
        Self::new(
            params.spatial_step,
            params.time_step,
            params.wave_speed,
            params.damping,
        )
    }
}
