//! # Workflows Module
//!
//! High-level entry points that run a complete selection from a stream of
//! conformers.
//!
//! - **Selection Workflow** ([`select`]) - Splits conformers into isomer groups,
//!   scores every pair within a group, prunes the distance matrix and emits one
//!   representative per group as soon as it is known.

pub mod select;
