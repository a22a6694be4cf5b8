use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::bngl::BuildError;
use crate::core::io::occupancy::OccupancyError;
use crate::core::io::tetgen::MeshError;

/// Failures of the geometric algorithms. Indices are checked up front so that bad input
/// surfaces as an error instead of a panic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("{kind} index {index} is out of range (mesh has {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Model build failed: {source}")]
    Build {
        #[from]
        source: BuildError,
    },

    #[error("Mesh ingestion failed: {source}")]
    Mesh {
        #[from]
        source: MeshError,
    },

    #[error("Geometry processing failed: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Occupancy data could not be read: {source}")]
    Occupancy {
        #[from]
        source: OccupancyError,
    },
}
