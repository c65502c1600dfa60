mod backend;
mod disturbance;
mod field;
mod grid;
mod mesh;
mod params;
mod simulator;
mod vertex;

pub use backend::{BackendKind, ParallelBackend, SequentialBackend, StepBackend};
pub use disturbance::{Disturbance, RandomDisturber};
pub use field::{FieldSnapshot, WaveField};
pub use grid::GridTopology;
pub use mesh::MeshConnectivity;
pub use params::{Coefficients, WaveParams, MIN_GRID_DIM};
pub use simulator::WaveSimulator;
pub use vertex::MeshVertex;
