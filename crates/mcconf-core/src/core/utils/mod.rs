//! Geometric helpers shared by the alignment and correspondence code.

pub mod geometry;
