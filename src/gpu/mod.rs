mod backend;
mod buffers;
mod compute;
mod context;

pub use backend::GpuBackend;
pub use buffers::{fits_limits, FieldBuffers, StepParams, TEXEL_SIZE};
pub use compute::{workgroup_counts, ComputePipeline};
pub use context::GpuContext;
