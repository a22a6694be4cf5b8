//! # Engine Module
//!
//! The algorithms that run over built models and ingested meshes.
//!
//! - **Validation** ([`validation`]) - Cross-reference rules producing a per-entity and
//!   aggregate message report without touching the model.
//! - **Surface Extraction** ([`surface`]) - Boundary-parity surfaces for compartments and
//!   reindexed triangle lists for membranes, plus structure volumes and areas.
//! - **Spatial Sampling** ([`sampling`]) - Uniform points inside tetrahedra and triangles.
//! - **Configuration** ([`config`]) - Builders for the settings each workflow consumes.
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting.
//! - **Error Handling** ([`error`]) - Geometry and workflow error types.
//!
//! Every operation is synchronous and reads its inputs only; surface extraction fans out
//! across structures with rayon when the `parallel` feature is enabled.

pub mod config;
pub mod error;
pub mod progress;
pub mod sampling;
pub mod surface;
pub mod validation;
