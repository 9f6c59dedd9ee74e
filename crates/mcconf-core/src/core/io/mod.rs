//! Reading and writing conformer ensembles.
//!
//! [`traits::MolecularFile`] is the format-independent interface; [`sdf::SdfFile`]
//! implements it for MDL SD files with V2000 connection tables.

pub mod sdf;
pub mod traits;
