//! Execution backends for the discrete update.
//!
//! Every backend implements the same recurrence over the same buffer layout,
//! so a simulation produces the same heights wherever it runs:
//!
//! ```text
//! prev[i,j].y = k1 * prev[i,j].y
//!             + k2 * curr[i,j].y
//!             + k3 * (curr[i+1,j].y + curr[i-1,j].y + curr[i,j+1].y + curr[i,j-1].y)
//! ```
//!
//! Only interior vertices are written. Each previous-buffer cell is read once
//! for its own `k1` term before being overwritten and all other reads hit the
//! untouched current buffer, so the update is safe in place and every cell
//! can be computed independently.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use rayon::prelude::*;

use super::grid::GridTopology;
use super::params::Coefficients;
use crate::error::Result;
use crate::gpu::GpuBackend;

/// One algorithm, several places to run it.
pub trait StepBackend: Send {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Write the next solution for every interior vertex into `previous`.
    fn advance(
        &mut self,
        grid: &GridTopology,
        coefficients: &Coefficients,
        current: &[Vec3],
        previous: &mut [Vec3],
    ) -> Result<()>;

    /// Recompute interior normals and tangents from `current` by central
    /// differences. Boundary entries are left untouched.
    fn derive_shading(
        &mut self,
        grid: &GridTopology,
        current: &[Vec3],
        normals: &mut [Vec3],
        tangents: &mut [Vec3],
    ) -> Result<()> {
        let n = grid.columns();
        for row in interior_rows(grid) {
            let span = row * n..(row + 1) * n;
            shade_row(grid, current, row, &mut normals[span.clone()], &mut tangents[span]);
        }
        Ok(())
    }
}

/// Single-threaded nested loops.
#[derive(Debug, Default)]
pub struct SequentialBackend;

impl StepBackend for SequentialBackend {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn advance(
        &mut self,
        grid: &GridTopology,
        coefficients: &Coefficients,
        current: &[Vec3],
        previous: &mut [Vec3],
    ) -> Result<()> {
        debug_assert_eq!(current.len(), grid.vertex_count());
        debug_assert_eq!(previous.len(), grid.vertex_count());

        let n = grid.columns();
        for row in interior_rows(grid) {
            update_row(grid, coefficients, current, row, &mut previous[row * n..(row + 1) * n]);
        }
        Ok(())
    }
}

/// Rows spread across the rayon thread pool.
///
/// `for_each` returns only after every row is done, which is the barrier
/// between the height phase and the shading phase.
#[derive(Debug, Default)]
pub struct ParallelBackend;

impl StepBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn advance(
        &mut self,
        grid: &GridTopology,
        coefficients: &Coefficients,
        current: &[Vec3],
        previous: &mut [Vec3],
    ) -> Result<()> {
        debug_assert_eq!(current.len(), grid.vertex_count());
        debug_assert_eq!(previous.len(), grid.vertex_count());

        let rows = grid.rows();
        previous
            .par_chunks_mut(grid.columns())
            .enumerate()
            .filter(|(row, _)| *row >= 1 && *row + 1 < rows)
            .for_each(|(row, previous_row)| {
                update_row(grid, coefficients, current, row, previous_row);
            });
        Ok(())
    }

    fn derive_shading(
        &mut self,
        grid: &GridTopology,
        current: &[Vec3],
        normals: &mut [Vec3],
        tangents: &mut [Vec3],
    ) -> Result<()> {
        let rows = grid.rows();
        let n = grid.columns();
        normals
            .par_chunks_mut(n)
            .zip(tangents.par_chunks_mut(n))
            .enumerate()
            .filter(|(row, _)| *row >= 1 && *row + 1 < rows)
            .for_each(|(row, (normal_row, tangent_row))| {
                shade_row(grid, current, row, normal_row, tangent_row);
            });
        Ok(())
    }
}

fn interior_rows(grid: &GridTopology) -> std::ops::Range<usize> {
    1..grid.rows().saturating_sub(1)
}

/// Apply the recurrence to the interior columns of one row.
/// `previous_row` is that row of the previous buffer.
#[inline]
pub(crate) fn update_row(
    grid: &GridTopology,
    k: &Coefficients,
    current: &[Vec3],
    row: usize,
    previous_row: &mut [Vec3],
) {
    let n = grid.columns();
    for col in 1..n.saturating_sub(1) {
        let i = grid.index(row, col);
        let neighbours = current[i + n].y + current[i - n].y + current[i + 1].y + current[i - 1].y;
        let p = &mut previous_row[col];
        p.y = k.k1 * p.y + k.k2 * current[i].y + k.k3 * neighbours;
    }
}

/// Central-difference normal and x-tangent for the interior columns of one row.
#[inline]
pub(crate) fn shade_row(
    grid: &GridTopology,
    current: &[Vec3],
    row: usize,
    normal_row: &mut [Vec3],
    tangent_row: &mut [Vec3],
) {
    let n = grid.columns();
    let two_dx = 2.0 * grid.spatial_step();
    for col in 1..n.saturating_sub(1) {
        let i = grid.index(row, col);
        let left = current[i - 1].y;
        let right = current[i + 1].y;
        let top = current[i - n].y;
        let bottom = current[i + n].y;

        normal_row[col] = Vec3::new(left - right, two_dx, bottom - top).normalize();
        tangent_row[col] = Vec3::new(two_dx, right - left, 0.0).normalize();
    }
}

/// Backend selection, made once when a simulator is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Sequential,
    Parallel,
    Gpu,
}

impl BackendKind {
    pub fn build(self) -> Result<Box<dyn StepBackend>> {
        Ok(match self {
            BackendKind::Sequential => Box::new(SequentialBackend),
            BackendKind::Parallel => Box::new(ParallelBackend),
            BackendKind::Gpu => Box::new(GpuBackend::new_blocking()?),
        })
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" | "cpu" => Ok(BackendKind::Sequential),
            "parallel" | "rayon" => Ok(BackendKind::Parallel),
            "gpu" => Ok(BackendKind::Gpu),
            other => Err(format!(
                "unknown backend '{}' (expected sequential, parallel or gpu)",
                other
            )),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Sequential => "sequential",
            BackendKind::Parallel => "parallel",
            BackendKind::Gpu => "gpu",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bumpy_grid() -> (GridTopology, Vec<Vec3>, Vec<Vec3>) {
        let grid = GridTopology::new(9, 11, 0.5);
        let mut current = Vec::new();
        let mut previous = Vec::new();
        for row in 0..grid.rows() {
            for col in 0..grid.columns() {
                let (x, z) = grid.position(row, col).unwrap();
                let h = if grid.is_interior(row, col) {
                    ((row * 7 + col * 3) % 5) as f32 * 0.25 - 0.5
                } else {
                    0.0
                };
                current.push(Vec3::new(x, h, z));
                previous.push(Vec3::new(x, h * 0.5, z));
            }
        }
        (grid, current, previous)
    }

    fn coefficients() -> Coefficients {
        Coefficients::new(0.5, 0.03, 3.25, 0.4).unwrap()
    }

    #[test]
    fn test_sequential_matches_formula() {
        let (grid, current, mut previous) = bumpy_grid();
        let before = previous.clone();
        let k = coefficients();
        SequentialBackend.advance(&grid, &k, &current, &mut previous).unwrap();

        let n = grid.columns();
        let i = grid.vertex_index(4, 5).unwrap();
        let expected = k.k1 * before[i].y
            + k.k2 * current[i].y
            + k.k3 * (current[i + n].y + current[i - n].y + current[i + 1].y + current[i - 1].y);
        assert_eq!(previous[i].y, expected);
        // x and z never move
        assert_eq!(previous[i].x, before[i].x);
        assert_eq!(previous[i].z, before[i].z);
    }

    #[test]
    fn test_boundary_untouched() {
        let (grid, current, mut previous) = bumpy_grid();
        let before = previous.clone();
        SequentialBackend
            .advance(&grid, &coefficients(), &current, &mut previous)
            .unwrap();
        for row in 0..grid.rows() {
            for col in 0..grid.columns() {
                if grid.is_boundary(row, col) {
                    let i = grid.vertex_index(row, col).unwrap();
                    assert_eq!(previous[i], before[i]);
                }
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (grid, current, previous) = bumpy_grid();
        let k = coefficients();

        let mut seq = previous.clone();
        SequentialBackend.advance(&grid, &k, &current, &mut seq).unwrap();
        let mut par = previous;
        ParallelBackend.advance(&grid, &k, &current, &mut par).unwrap();
        assert_eq!(seq, par);

        let count = grid.vertex_count();
        let (mut seq_n, mut seq_t) = (vec![Vec3::Y; count], vec![Vec3::X; count]);
        let (mut par_n, mut par_t) = (vec![Vec3::Y; count], vec![Vec3::X; count]);
        SequentialBackend
            .derive_shading(&grid, &current, &mut seq_n, &mut seq_t)
            .unwrap();
        ParallelBackend
            .derive_shading(&grid, &current, &mut par_n, &mut par_t)
            .unwrap();
        assert_eq!(seq_n, par_n);
        assert_eq!(seq_t, par_t);
    }

    #[test]
    fn test_shading_central_difference() {
        let grid = GridTopology::new(5, 5, 1.0);
        let mut current = vec![Vec3::ZERO; 25];
        // Height rises along +x: left = 0, right = 2 around (2, 2)
        current[grid.index(2, 1)].y = 0.0;
        current[grid.index(2, 3)].y = 2.0;
        let mut normals = vec![Vec3::Y; 25];
        let mut tangents = vec![Vec3::X; 25];
        SequentialBackend
            .derive_shading(&grid, &current, &mut normals, &mut tangents)
            .unwrap();

        let i = grid.index(2, 2);
        let expected_n = Vec3::new(-2.0, 2.0, 0.0).normalize();
        let expected_t = Vec3::new(2.0, 2.0, 0.0).normalize();
        assert!((normals[i] - expected_n).length() < 1e-6);
        assert!((tangents[i] - expected_t).length() < 1e-6);
        assert!((normals[i].length() - 1.0).abs() < 1e-6);
        // Boundary entries keep their old values
        assert_eq!(normals[grid.index(0, 2)], Vec3::Y);
        assert_eq!(tangents[grid.index(4, 4)], Vec3::X);
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("cpu".parse::<BackendKind>(), Ok(BackendKind::Sequential));
        assert_eq!("Parallel".parse::<BackendKind>(), Ok(BackendKind::Parallel));
        assert_eq!("rayon".parse::<BackendKind>(), Ok(BackendKind::Parallel));
        assert_eq!("gpu".parse::<BackendKind>(), Ok(BackendKind::Gpu));
        assert!("opencl".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::Parallel.to_string(), "parallel");
    }

    #[test]
    fn test_cpu_backends_build() {
        assert_eq!(BackendKind::Sequential.build().unwrap().name(), "sequential");
        assert_eq!(BackendKind::Parallel.build().unwrap().name(), "parallel");
    }
}
