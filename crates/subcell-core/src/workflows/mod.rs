//! # Workflows Module
//!
//! End-to-end procedures that chain the codecs in [`crate::core::io`] with the
//! [`crate::engine`] steps.
//!
//! - **Import Workflow** ([`import`]) - Builds a model from DSL text, validates it and,
//!   when a mesh source is configured, ingests the TetGen tables, checks the structure
//!   assignment and extracts every structure surface.
//! - **Scatter Workflow** ([`scatter`]) - Turns per-simplex molecule counts from a
//!   simulation into renderable points.

pub mod import;
pub mod scatter;
