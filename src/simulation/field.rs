use std::ops::Index;

use glam::Vec3;

use super::grid::GridTopology;
use super::params::{Coefficients, WaveParams};
use super::vertex::MeshVertex;
use crate::error::{Result, WaveError};

/// Per-vertex wave state.
///
/// Positions keep x and z fixed per grid point; y is the simulated height.
/// Two position buffers are kept for the second-order recurrence; `current`
/// says which one holds the latest solution.
#[derive(Debug, Default)]
pub struct WaveField {
    params: WaveParams,
    topology: GridTopology,
    coefficients: Coefficients,
    solutions: [Vec<Vec3>; 2],
    current: usize,
    normals: Vec<Vec3>,
    tangents: Vec<Vec3>,
    initialized: bool,
}

impl WaveField {
    /// Create and initialize a field in one go.
    pub fn new(params: WaveParams) -> Result<Self> {
        let mut field = Self::default();
        field.init(params)?;
        Ok(field)
    }

    /// (Re)initialize: validate, derive coefficients and reallocate every
    /// buffer as a flat plane at height 0 centered on the origin.
    ///
    /// On error the field is left exactly as it was.
    pub fn init(&mut self, params: WaveParams) -> Result<()> {
        params.validate()?;
        let coefficients = Coefficients::from_params(&params)?;

        if !params.is_stable() {
            log::warn!(
                "Courant number {:.3} exceeds 1/sqrt(2); heights will diverge",
                params.courant_number()
            );
        }

        let topology = GridTopology::new(params.rows, params.columns, params.spatial_step);
        let count = topology.vertex_count();

        let mut plane = Vec::with_capacity(count);
        for row in 0..topology.rows() {
            for col in 0..topology.columns() {
                let (x, z) = topology.position_of(row, col);
                plane.push(Vec3::new(x, 0.0, z));
            }
        }

        self.solutions = [plane.clone(), plane];
        self.current = 0;
        self.normals = vec![Vec3::Y; count];
        self.tangents = vec![Vec3::X; count];
        self.params = params;
        self.topology = topology;
        self.coefficients = coefficients;
        self.initialized = true;

        log::info!(
            "Wave field initialized: {}x{} grid, k1={:.5} k2={:.5} k3={:.5}",
            params.rows,
            params.columns,
            coefficients.k1,
            coefficients.k2,
            coefficients.k3
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn params(&self) -> &WaveParams {
        &self.params
    }

    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// Current solution (positions with simulated heights)
    pub fn positions(&self) -> &[Vec3] {
        &self.solutions[self.current]
    }

    /// Solution from the step before the current one
    pub fn previous_positions(&self) -> &[Vec3] {
        &self.solutions[1 - self.current]
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn tangents(&self) -> &[Vec3] {
        &self.tangents
    }

    /// Position of vertex `i` in the current solution
    pub fn position(&self, i: usize) -> Option<Vec3> {
        self.positions().get(i).copied()
    }

    /// Current height at (row, col)
    pub fn height(&self, row: usize, col: usize) -> Result<f32> {
        if !self.initialized {
            return Err(WaveError::NotInitialized);
        }
        let i = self.topology.vertex_index(row, col)?;
        Ok(self.positions()[i].y)
    }

    /// Owned copy of the readable state, for consumers on another thread or device.
    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            topology: self.topology,
            positions: self.positions().to_vec(),
            normals: self.normals.clone(),
            tangents: self.tangents.clone(),
        }
    }

    /// Interleave position/normal/tangent into one vertex stream.
    pub fn interleaved_vertices(&self) -> Vec<MeshVertex> {
        interleave(self.positions(), &self.normals, &self.tangents)
    }

    /// (current, previous) with the previous buffer writable.
    pub(crate) fn solutions_mut(&mut self) -> (&[Vec3], &mut [Vec3]) {
        let [a, b] = &mut self.solutions;
        if self.current == 0 {
            (a.as_slice(), b.as_mut_slice())
        } else {
            (b.as_slice(), a.as_mut_slice())
        }
    }

    /// The previous buffer becomes current and vice versa.
    pub(crate) fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// (current, normals, tangents) with the shading buffers writable.
    pub(crate) fn shading_mut(&mut self) -> (&[Vec3], &mut [Vec3], &mut [Vec3]) {
        (
            self.solutions[self.current].as_slice(),
            self.normals.as_mut_slice(),
            self.tangents.as_mut_slice(),
        )
    }

    pub(crate) fn current_mut(&mut self) -> &mut [Vec3] {
        &mut self.solutions[self.current]
    }
}

impl Index<usize> for WaveField {
    type Output = Vec3;

    fn index(&self, i: usize) -> &Vec3 {
        &self.positions()[i]
    }
}

/// Owned copy of a field's readable state at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    pub topology: GridTopology,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec3>,
}

impl FieldSnapshot {
    pub fn interleaved(&self) -> Vec<MeshVertex> {
        interleave(&self.positions, &self.normals, &self.tangents)
    }
}

fn interleave(positions: &[Vec3], normals: &[Vec3], tangents: &[Vec3]) -> Vec<MeshVertex> {
    positions
        .iter()
        .zip(normals)
        .zip(tangents)
        .map(|((&p, &n), &t)| MeshVertex::new(p, n, t))
        .collect()
}
