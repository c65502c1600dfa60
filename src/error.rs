use thiserror::Error;

/// Result type for wave field operations.
pub type Result<T> = std::result::Result<T, WaveError>;

/// Errors that can occur while configuring or driving a wave field.
#[derive(Error, Debug)]
pub enum WaveError {
    /// Grid too small for the interior update stencil.
    #[error("Invalid grid dimensions {rows}x{columns} (both must be at least 4)")]
    InvalidDimensions { rows: usize, columns: usize },

    /// A numeric parameter is out of its domain.
    #[error("Invalid parameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    /// The finite-difference coefficients would be infinite or NaN.
    #[error("Degenerate coefficients for damping={damping}, time_step={time_step}")]
    DegenerateCoefficients { damping: f32, time_step: f32 },

    /// Vertex lookup outside the grid.
    #[error("Vertex ({row}, {col}) is outside the {rows}x{columns} grid")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        columns: usize,
    },

    /// Disturbance too close to the boundary.
    #[error("Disturbance at ({row}, {col}) must stay 2 cells inside the {rows}x{columns} grid")]
    DisturbOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        columns: usize,
    },

    /// Operation on a field that has not been initialized.
    #[error("Wave field is not initialized")]
    NotInitialized,

    /// No GPU adapter could be found for the compute backend.
    #[error("No suitable GPU adapter found")]
    AdapterUnavailable,

    /// Field buffers or dispatch size would exceed a device limit.
    #[error("Grid {rows}x{columns} exceeds the GPU {limit} limit")]
    GridTooLarge {
        rows: usize,
        columns: usize,
        limit: &'static str,
    },

    /// Device creation failed.
    #[error("Failed to create GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// Mapping the readback buffer failed.
    #[error("Failed to map GPU buffer: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    /// Readback channel closed before the map completed.
    #[error("GPU readback failed: {0}")]
    Readback(String),
}
