//! # Subcellular Core Library
//!
//! Parsing, validation and geometry processing for spatial reaction-network models:
//! BNGL-like model text on one side, tetrahedral volume meshes on the other.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture so that each concern can be
//! tested on its own.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Model`, its entities, `Mesh`),
//!   the text codecs that produce them (model DSL, TetGen tables, occupancy CSV) and the
//!   token extractors and geometric primitives everything else builds on.
//!
//! - **[`engine`]: The Logic Core.** The algorithms that run over the models: the
//!   cross-reference validator, boundary-surface extraction and uniform spatial sampling
//!   over mesh simplices, together with their configuration, error and progress types.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures that chain the engine steps,
//!   such as importing a model with its mesh or scattering simulated molecule counts into
//!   renderable points.

pub mod core;
pub mod engine;
pub mod workflows;
