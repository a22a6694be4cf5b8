//! Token extraction for DSL expressions and simplex geometry helpers.

pub mod geometry;
pub mod identifiers;
