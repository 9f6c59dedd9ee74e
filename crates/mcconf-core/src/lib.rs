//! # MCCONF Core Library
//!
//! Selects the most common conformer of each isomer in a conformer ensemble: the
//! member structurally closest to all others in its group.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularGraph`,
//!   `IsomerGroup`), SD-file I/O and vector geometry.
//!
//! - **[`engine`]: The Logic Core.** Atom correspondence by graph isomorphism,
//!   rigid-body superposition, pairwise similarity scoring, the all-pairs
//!   `DistanceMatrix`, and the tasks that assemble and prune it.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together to
//!   pick one representative per isomer group, reporting progress and honoring
//!   cancellation.

pub mod core;
pub mod engine;
pub mod workflows;
