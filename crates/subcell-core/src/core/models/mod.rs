//! # Core Models Module
//!
//! This module contains the data structures that represent a spatial reaction-network
//! model and its geometry.
//!
//! ## Key Components
//!
//! - [`ids`] - Entity identifiers and the injectable identifier generators
//! - [`entities`] - The eight entity kinds (structures, parameters, functions, molecules,
//!   species, reactions, observables, diffusions)
//! - [`model`] - The `Model` aggregate with its collections and configuration
//! - [`mesh`] - Volume, surface and metadata parts of a tetrahedral mesh
//!
//! ## Usage
//!
//! ```ignore
//! use subcellular::core::io::bngl::ModelBuilder;
//!
//! let model = ModelBuilder::new().build("begin parameters\nk1 1.0\nend parameters")?;
//! assert_eq!(model.parameters[0].name, "k1");
//! ```

pub mod entities;
pub mod ids;
pub mod mesh;
pub mod model;
