use std::num::NonZeroU64;

use wgpu::{BindGroup, BindGroupLayout, BindGroupLayoutEntry, BufferBindingType, Device};

use super::buffers::{FieldBuffers, StepParams, TEXEL_SIZE};
use crate::config::WORKGROUP_SIZE;

/// Binding slots in wave_step.wgsl
const CURRENT_BINDING: u32 = 0;
const PREVIOUS_BINDING: u32 = 1;
const PARAMS_BINDING: u32 = 2;

/// Compute pipeline for the in-place height update
pub struct ComputePipeline {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: BindGroupLayout,
}

fn buffer_entry(binding: u32, ty: BufferBindingType, min_size: u64) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(min_size),
        },
        count: None,
    }
}

/// Workgroups along (x, y) covering every column and row once
pub fn workgroup_counts(rows: u32, columns: u32) -> (u32, u32) {
    (columns.div_ceil(WORKGROUP_SIZE), rows.div_ceil(WORKGROUP_SIZE))
}

impl ComputePipeline {
    pub fn new(device: &Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("wave-step-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/wave_step.wgsl").into()),
        });

        // Storage arrays hold at least one vec4 vertex; the uniform is exactly StepParams
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("wave-step-bind-group-layout"),
            entries: &[
                buffer_entry(
                    CURRENT_BINDING,
                    BufferBindingType::Storage { read_only: true },
                    TEXEL_SIZE,
                ),
                buffer_entry(
                    PREVIOUS_BINDING,
                    BufferBindingType::Storage { read_only: false },
                    TEXEL_SIZE,
                ),
                buffer_entry(
                    PARAMS_BINDING,
                    BufferBindingType::Uniform,
                    std::mem::size_of::<StepParams>() as u64,
                ),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("wave-step-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("wave-step-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        log::debug!("Wave step pipeline created ({0}x{0} workgroups)", WORKGROUP_SIZE);

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    /// Bind the current, previous and parameter buffers of one field
    pub fn create_bind_group(&self, device: &Device, buffers: &FieldBuffers) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("wave-step-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: CURRENT_BINDING,
                    resource: buffers.current_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: PREVIOUS_BINDING,
                    resource: buffers.previous_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: PARAMS_BINDING,
                    resource: buffers.params_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// One invocation per vertex; the shader skips the boundary ring
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &BindGroup, buffers: &FieldBuffers) {
        let (groups_x, groups_y) = workgroup_counts(buffers.rows, buffers.columns);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("wave-step-pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(groups_x, groups_y, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroups_cover_grid() {
        assert_eq!(workgroup_counts(128, 128), (8, 8));
        // Partial groups round up; x runs along columns
        assert_eq!(workgroup_counts(17, 33), (3, 2));
        assert_eq!(workgroup_counts(4, 4), (1, 1));
    }
}
