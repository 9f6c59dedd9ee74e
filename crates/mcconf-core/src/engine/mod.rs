//! # Engine Module
//!
//! This module implements the similarity engine of MCCONF: everything needed to
//! say how far apart two conformers are and which member of a group is the most
//! central one.
//!
//! ## Architecture
//!
//! - **Atom Correspondence** ([`correspondence`]) - Graph-isomorphism atom mappings, with placeholder relabeling
//! - **Rigid Alignment** ([`alignment`]) - Kabsch superposition and the intramolecular distance deviation
//! - **Pair Scoring** ([`similarity`]) - Minimum deviation over all mappings of a conformer pair
//! - **Distance Matrix** ([`matrix`]) - Symmetric all-pairs storage with row statistics and pruning
//! - **Configuration** ([`config`]) - Metric, mapping cap, failure policy and grouping settings
//! - **Progress Monitoring** ([`progress`]) and **Cancellation** ([`cancel`])
//! - **Error Handling** ([`error`]) - The aggregated [`error::EngineError`]
//!
//! Pair scoring is parallelized with rayon when the `parallel` feature is on.

pub mod alignment;
pub mod cancel;
pub mod config;
pub mod correspondence;
pub mod error;
pub mod matrix;
pub mod progress;
pub mod similarity;
pub mod tasks;
