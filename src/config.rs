/// Grid dimensions (128x128 = 16K vertices)
pub const GRID_ROWS: usize = 128;
pub const GRID_COLUMNS: usize = 128;

/// Compute shader workgroup size (must match @workgroup_size in wave_step.wgsl)
pub const WORKGROUP_SIZE: u32 = 16;

// ============================================
// Wave Equation Parameters
// ============================================

/// Distance between adjacent grid points
pub const SPATIAL_STEP: f32 = 1.0;

/// Fixed simulation time step in seconds. The simulator only advances once
/// this much elapsed time has accumulated.
pub const TIME_STEP: f32 = 0.03;

/// Wave propagation speed (grid units per second)
pub const WAVE_SPEED: f32 = 3.25;

/// Damping coefficient for wave equation (prevents runaway oscillation)
pub const DAMPING: f32 = 0.4;

/// Smallest distance from the grid edge a disturbance may be applied at.
/// `disturb` touches the four orthogonal neighbours, which must stay interior.
pub const MIN_DISTURB_MARGIN: usize = 2;

// ============================================
// Driver
// ============================================

/// Margin used by the random disturbance policy (wider than strictly needed)
pub const DISTURB_MARGIN: usize = 5;

/// Seconds between random disturbances
pub const DISTURB_INTERVAL: f32 = 0.4;

/// Random disturbance magnitude range [min, max)
pub const DISTURB_MAGNITUDE_MIN: f32 = 1.0;
pub const DISTURB_MAGNITUDE_MAX: f32 = 2.0;

/// Driver tick length (60 Hz)
pub const FRAME_DT: f32 = 1.0 / 60.0;

/// Number of ticks the headless driver runs when no count is given (one minute)
pub const DEFAULT_FRAMES: u64 = 3600;
