//! # Core Module
//!
//! This module provides the fundamental data structures and codecs for spatial
//! reaction-network models, serving as the foundation of the library.
//!
//! ## Overview
//!
//! A model is authored as BNGL-like text (compartments, parameters, functions, molecule
//! types, species, reaction rules, observables, diffusions) and is optionally paired with a
//! tetrahedral mesh exported from TetGen. The core module turns both kinds of untyped input
//! into typed, cross-referenceable in-memory structures and back.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - `Model`, its eight entity collections, and `Mesh`
//! - **File I/O** ([`io`]) - Model DSL reader/writer, TetGen ingestion, occupancy tables
//! - **Utilities** ([`utils`]) - Identifier extraction from DSL expressions and simplex geometry
//!
//! ## Key Capabilities
//!
//! - **All-or-nothing parsing** with line-accurate error reporting
//! - **Injected identifier generation** for reproducible entity ids in tests
//! - **Dense zero-based mesh indexing** remapped from arbitrary external numbering
//! - **Serde-compatible trees** matching the JSON shape consumed by export collaborators

pub mod io;
pub mod models;
pub mod utils;
