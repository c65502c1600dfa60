use glam::Vec3;

/// Interleaved vertex for upload to a rendering layer.
///
/// Layout: 36 bytes, tightly packed f32 triples.
/// - position: [f32; 3] - x, simulated height, z
/// - normal: [f32; 3] - unit surface normal
/// - tangent: [f32; 3] - unit tangent along the local x axis
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3, tangent: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            tangent: tangent.to_array(),
        }
    }

    /// Byte stride between consecutive vertices in a vertex buffer
    pub const STRIDE: usize = std::mem::size_of::<MeshVertex>();
}
