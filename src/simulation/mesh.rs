use std::sync::Arc;

use super::grid::GridTopology;

/// Static triangle list for a grid: two triangles per quad.
///
/// Built once per grid size and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct MeshConnectivity {
    indices: Arc<[u32]>,
}

impl MeshConnectivity {
    pub fn build(topology: &GridTopology) -> Self {
        let m = topology.rows() as u32;
        let n = topology.columns() as u32;
        let mut indices = Vec::with_capacity(3 * topology.triangle_count());

        for i in 0..m.saturating_sub(1) {
            for j in 0..n.saturating_sub(1) {
                indices.extend_from_slice(&[
                    i * n + j,
                    i * n + j + 1,
                    (i + 1) * n + j,
                    (i + 1) * n + j,
                    i * n + j + 1,
                    (i + 1) * n + j + 1,
                ]);
            }
        }

        Self {
            indices: indices.into(),
        }
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Shared handle to the index list
    pub fn shared(&self) -> Arc<[u32]> {
        Arc::clone(&self.indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_count() {
        let grid = GridTopology::new(4, 4, 1.0);
        let mesh = MeshConnectivity::build(&grid);
        assert_eq!(mesh.indices().len(), 3 * grid.triangle_count());
        assert_eq!(mesh.triangle_count(), 18);
    }

    #[test]
    fn test_first_quad_winding() {
        let grid = GridTopology::new(3, 5, 1.0);
        let mesh = MeshConnectivity::build(&grid);
        assert_eq!(&mesh.indices()[..6], &[0, 1, 5, 5, 1, 6]);
    }

    #[test]
    fn test_indices_in_range() {
        let grid = GridTopology::new(7, 9, 0.5);
        let mesh = MeshConnectivity::build(&grid);
        let count = grid.vertex_count() as u32;
        assert!(mesh.indices().iter().all(|&i| i < count));
    }

    #[test]
    fn test_shared_is_same_allocation() {
        let mesh = MeshConnectivity::build(&GridTopology::new(4, 4, 1.0));
        let shared = mesh.shared();
        assert!(Arc::ptr_eq(&shared, &mesh.shared()));
        assert_eq!(&shared[..], mesh.indices());
    }
}
