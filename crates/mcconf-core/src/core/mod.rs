//! # Core Module
//!
//! This module provides the stateless building blocks of MCCONF: the conformer
//! data model, SD-file I/O and 3D geometry.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, conformers, attachment points and isomer groups
//! - **File I/O** ([`io`]) - Reading and writing multi-record SD files
//! - **Geometry** ([`utils`]) - Vector, angle and RMSD primitives on `nalgebra` types
//!
//! Nothing in this module knows how conformers are compared; that lives in
//! [`crate::engine`].

pub mod io;
pub mod models;
pub mod utils;
