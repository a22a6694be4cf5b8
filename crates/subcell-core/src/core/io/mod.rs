//! Provides input/output for model text, mesh tables and simulation occupancy data.
//!
//! The model DSL has a reader and a writer behind the [`traits::ModelFile`] trait. Mesh
//! tables and occupancy CSV are read-only inputs apart from the scattered-point output.

pub mod bngl;
pub mod occupancy;
pub mod records;
pub mod tetgen;
pub mod traits;
