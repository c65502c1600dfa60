use crate::error::{Result, WaveError};

/// Geometry of a rows x columns lattice of vertices in the xz-plane,
/// centered at the origin. Row 0 is the far (+z) edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridTopology {
    rows: usize,
    columns: usize,
    spatial_step: f32,
}

impl GridTopology {
    pub fn new(rows: usize, columns: usize, spatial_step: f32) -> Self {
        Self {
            rows,
            columns,
            spatial_step,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn spatial_step(&self) -> f32 {
        self.spatial_step
    }

    /// Linear index of vertex (row, col): `row * columns + col`
    pub fn vertex_index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.columns {
            return Err(WaveError::IndexOutOfRange {
                row,
                col,
                rows: self.rows,
                columns: self.columns,
            });
        }
        Ok(self.index(row, col))
    }

    /// Unchecked index for the stepping loops, which only visit interior cells.
    #[inline(always)]
    pub(crate) fn index(&self, row: usize, col: usize) -> usize {
        row * self.columns + col
    }

    /// World-space (x, z) of vertex (row, col)
    pub fn position(&self, row: usize, col: usize) -> Result<(f32, f32)> {
        self.vertex_index(row, col)?;
        Ok(self.position_of(row, col))
    }

    pub(crate) fn position_of(&self, row: usize, col: usize) -> (f32, f32) {
        let x = -self.half_width() + col as f32 * self.spatial_step;
        let z = self.half_depth() - row as f32 * self.spatial_step;
        (x, z)
    }

    pub fn half_width(&self) -> f32 {
        self.columns.saturating_sub(1) as f32 * self.spatial_step * 0.5
    }

    pub fn half_depth(&self) -> f32 {
        self.rows.saturating_sub(1) as f32 * self.spatial_step * 0.5
    }

    pub fn width(&self) -> f32 {
        self.columns as f32 * self.spatial_step
    }

    pub fn depth(&self) -> f32 {
        self.rows as f32 * self.spatial_step
    }

    pub fn vertex_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Two triangles per grid quad
    pub fn triangle_count(&self) -> usize {
        2 * self.rows.saturating_sub(1) * self.columns.saturating_sub(1)
    }

    /// True for vertices the recurrence updates (not on the outer ring)
    pub fn is_interior(&self, row: usize, col: usize) -> bool {
        row >= 1 && col >= 1 && row + 1 < self.rows && col + 1 < self.columns
    }

    pub fn is_boundary(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.columns && !self.is_interior(row, col)
    }
}
