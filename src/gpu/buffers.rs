use std::sync::mpsc;

use glam::Vec3;
use wgpu::{Buffer, BufferUsages, Device, Limits, Queue};

use crate::config::WORKGROUP_SIZE;
use crate::error::{Result, WaveError};
use crate::simulation::Coefficients;

/// Bytes per vertex on the device: vec4<f32> (x, height, z, 1)
pub const TEXEL_SIZE: u64 = std::mem::size_of::<[f32; 4]>() as u64;

/// Check that a rows x columns field can be stored, bound and dispatched
/// under `limits`. Returns the dimensions as the shader's u32 types.
pub fn fits_limits(rows: usize, columns: usize, limits: &Limits) -> Result<(u32, u32)> {
    let too_large = |limit| WaveError::GridTooLarge {
        rows,
        columns,
        limit,
    };

    let bytes = (rows as u64)
        .checked_mul(columns as u64)
        .and_then(|count| count.checked_mul(TEXEL_SIZE))
        .ok_or_else(|| too_large("address space"))?;
    if bytes > limits.max_buffer_size {
        return Err(too_large("buffer size"));
    }
    if bytes > limits.max_storage_buffer_binding_size as u64 {
        return Err(too_large("storage binding size"));
    }

    let rows = u32::try_from(rows).map_err(|_| too_large("address space"))?;
    let columns = u32::try_from(columns).map_err(|_| too_large("address space"))?;
    let max_groups = limits.max_compute_workgroups_per_dimension;
    if rows.div_ceil(WORKGROUP_SIZE) > max_groups || columns.div_ceil(WORKGROUP_SIZE) > max_groups {
        return Err(too_large("workgroups per dimension"));
    }
    Ok((rows, columns))
}

/// Device-side copies of the two solution buffers plus the readback staging buffer
pub struct FieldBuffers {
    /// Current solution (read-only in the kernel)
    pub current_buffer: Buffer,
    /// Previous solution, overwritten in place with the next one
    pub previous_buffer: Buffer,
    /// Uniform buffer for step parameters
    pub params_buffer: Buffer,
    /// Host-mappable copy of the previous buffer
    pub staging_buffer: Buffer,
    /// Grid dimensions
    pub rows: u32,
    pub columns: u32,
    /// Reused packing area for uploads
    scratch: Vec<[f32; 4]>,
}

/// Step parameters passed to the compute shader (32 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StepParams {
    // Grid info (8 bytes)
    pub rows: u32,
    pub columns: u32,

    // Recurrence coefficients (12 bytes)
    pub k1: f32,
    pub k2: f32,
    pub k3: f32,

    // Pad to 32 bytes
    pub _padding: [f32; 3],
}

impl FieldBuffers {
    /// Allocate buffers for a rows x columns grid already checked with [`fits_limits`]
    pub fn new(device: &Device, rows: u32, columns: u32) -> Self {
        let vertex_count = rows as usize * columns as usize;
        let buffer_size = vertex_count as u64 * TEXEL_SIZE;

        let current_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave-current-buffer"),
            size: buffer_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let previous_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave-previous-buffer"),
            size: buffer_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave-step-params-buffer"),
            size: std::mem::size_of::<StepParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave-readback-staging"),
            size: buffer_size,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!("Allocated GPU field buffers for {}x{} grid", rows, columns);

        Self {
            current_buffer,
            previous_buffer,
            params_buffer,
            staging_buffer,
            rows,
            columns,
            scratch: Vec::with_capacity(vertex_count),
        }
    }

    pub fn matches(&self, rows: usize, columns: usize) -> bool {
        self.rows as usize == rows && self.columns as usize == columns
    }

    fn byte_size(&self) -> u64 {
        self.rows as u64 * self.columns as u64 * TEXEL_SIZE
    }

    /// Upload both solutions as vec4 (x, height, z, 1)
    pub fn upload(&mut self, queue: &Queue, current: &[Vec3], previous: &[Vec3]) {
        self.scratch.clear();
        self.scratch.extend(current.iter().map(|p| p.extend(1.0).to_array()));
        queue.write_buffer(&self.current_buffer, 0, bytemuck::cast_slice(&self.scratch));

        self.scratch.clear();
        self.scratch.extend(previous.iter().map(|p| p.extend(1.0).to_array()));
        queue.write_buffer(&self.previous_buffer, 0, bytemuck::cast_slice(&self.scratch));
    }

    /// Update step parameters
    pub fn update_params(&self, queue: &Queue, coefficients: &Coefficients) {
        let params = StepParams {
            rows: self.rows,
            columns: self.columns,
            k1: coefficients.k1,
            k2: coefficients.k2,
            k3: coefficients.k3,
            _padding: [0.0, 0.0, 0.0],
        };
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
    }

    /// Record a copy of the freshly written solution into the staging buffer
    pub fn copy_to_staging(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_buffer_to_buffer(&self.previous_buffer, 0, &self.staging_buffer, 0, self.byte_size());
    }

    /// Block until the staging buffer is mapped and copy heights back into `previous`
    pub fn read_heights(&self, device: &Device, previous: &mut [Vec3]) -> Result<()> {
        let slice = self.staging_buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|e| WaveError::Readback(e.to_string()))??;

        {
            let data = slice.get_mapped_range();
            let texels: &[[f32; 4]] = bytemuck::cast_slice(&data);
            for (p, texel) in previous.iter_mut().zip(texels) {
                p.y = texel[1];
            }
        }
        self.staging_buffer.unmap();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_params_size() {
        assert_eq!(std::mem::size_of::<StepParams>(), 32);
    }

    #[test]
    fn test_default_grid_fits() {
        let limits = Limits::default();
        assert_eq!(fits_limits(128, 128, &limits).unwrap(), (128, 128));
        // 2048 * 2048 * 16 = 64 MiB
        assert_eq!(fits_limits(2048, 2048, &limits).unwrap(), (2048, 2048));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let limits = Limits::default();
        // 3000 * 3000 * 16 = 144 MB, over the 128 MiB binding limit
        assert!(matches!(
            fits_limits(3000, 3000, &limits),
            Err(WaveError::GridTooLarge {
                rows: 3000,
                limit: "storage binding size",
                ..
            })
        ));
        assert!(matches!(
            fits_limits(usize::MAX, 4, &limits),
            Err(WaveError::GridTooLarge { limit: "address space", .. })
        ));
    }

    #[test]
    fn test_buffer_size_limit_checked() {
        let limits = Limits {
            max_buffer_size: 1024,
            ..Limits::default()
        };
        assert!(fits_limits(8, 8, &limits).is_ok());
        assert!(matches!(
            fits_limits(8, 9, &limits),
            Err(WaveError::GridTooLarge { limit: "buffer size", .. })
        ));
    }

    #[test]
    fn test_dispatch_width_checked() {
        // 2M columns fit in memory but need 125000 workgroups along x
        let limits = Limits::default();
        assert!(matches!(
            fits_limits(4, 2_000_000, &limits),
            Err(WaveError::GridTooLarge {
                limit: "workgroups per dimension",
                ..
            })
        ));
    }
}
