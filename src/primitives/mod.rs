//! Core compute primitives.
//!
//! A single dense matrix type backs every two-dimensional count table
//! and topic-word distribution in the crate.

mod matrix;

pub use matrix::Matrix;
