//! Damped 2-D wave field simulation.
//!
//! A [`WaveField`] holds heights, normals and tangents on a rectangular grid.
//! A [`WaveSimulator`] advances it with an explicit finite-difference scheme
//! on a chosen [`StepBackend`] (sequential, rayon or wgpu compute) and injects
//! local disturbances between steps.

pub mod app;
pub mod config;
pub mod error;
pub mod gpu;
pub mod simulation;

pub use error::{Result, WaveError};
pub use simulation::{
    BackendKind, Coefficients, FieldSnapshot, GridTopology, MeshConnectivity, MeshVertex,
    RandomDisturber, StepBackend, WaveField, WaveParams, WaveSimulator,
};
