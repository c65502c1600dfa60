use glam::Vec3;

use super::buffers::fits_limits;
use super::{ComputePipeline, FieldBuffers, GpuContext};
use crate::error::Result;
use crate::simulation::{Coefficients, GridTopology, StepBackend};

/// Runs the height update as a wgpu compute dispatch.
///
/// The host field stays the source of truth: each step uploads both
/// solutions, runs the kernel, and reads the new heights back, so
/// disturbances applied between steps are always seen by the device.
/// Shading stays on the CPU.
pub struct GpuBackend {
    context: GpuContext,
    pipeline: ComputePipeline,
    buffers: Option<FieldBuffers>,
}

impl GpuBackend {
    pub async fn new() -> Result<Self> {
        let context = GpuContext::new().await?;
        let pipeline = ComputePipeline::new(&context.device);
        Ok(Self {
            context,
            pipeline,
            buffers: None,
        })
    }

    /// Blocking constructor for synchronous callers
    pub fn new_blocking() -> Result<Self> {
        pollster::block_on(Self::new())
    }
}

impl StepBackend for GpuBackend {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn advance(
        &mut self,
        grid: &GridTopology,
        coefficients: &Coefficients,
        current: &[Vec3],
        previous: &mut [Vec3],
    ) -> Result<()> {
        let device = &self.context.device;
        let queue = &self.context.queue;

        // Reallocate after the field was re-initialized with another size
        let buffers = match self.buffers.take() {
            Some(buffers) if buffers.matches(grid.rows(), grid.columns()) => self.buffers.insert(buffers),
            _ => {
                let (rows, columns) = fits_limits(grid.rows(), grid.columns(), &device.limits())?;
                self.buffers.insert(FieldBuffers::new(device, rows, columns))
            }
        };

        buffers.upload(queue, current, previous);
        buffers.update_params(queue, coefficients);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("wave-step-encoder"),
        });

        let bind_group = self.pipeline.create_bind_group(device, buffers);
        self.pipeline.dispatch(&mut encoder, &bind_group, buffers);
        buffers.copy_to_staging(&mut encoder);

        queue.submit(std::iter::once(encoder.finish()));

        buffers.read_heights(device, previous)
    }
}
