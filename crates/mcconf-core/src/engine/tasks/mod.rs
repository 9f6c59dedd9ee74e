//! Computational units of a selection run.
//!
//! [`matrix_assembly`] scores every conformer pair of a group into a
//! [`DistanceMatrix`](crate::engine::matrix::DistanceMatrix); [`pruning`]
//! reduces that matrix to its most central member.

pub mod matrix_assembly;
pub mod pruning;
