//! # Core Models Module
//!
//! This module contains the data structures used to represent conformers and
//! conformer ensembles in MCCONF.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atoms with element identity, charge and coordinates
//! - [`element`] - Element symbol lookup, used to tell real atoms from placeholders
//! - [`topology`] - Bonds and bond orders
//! - [`molecule`] - A complete conformer (`MolecularGraph`) with its SD data items
//! - [`attachment`] - Attachment points derived from placeholder atoms, and their record codec
//! - [`group`] - Isomer groups and the splitting of a record stream into groups
//!
//! ## Usage
//!
//! ```ignore
//! use mcconf::core::models::{atom::Atom, molecule::MolecularGraph, topology::BondOrder};
//!
//! let mut mol = MolecularGraph::new("ethanol");
//! let c1 = mol.add_atom(Atom::new("C", Point3::new(0.0, 0.0, 0.0)));
//! let c2 = mol.add_atom(Atom::new("C", Point3::new(1.52, 0.0, 0.0)));
//! mol.add_bond(c1, c2, BondOrder::Single)?;
//! mol.set_property("ISOMER", "ethanol-1");
//! ```

pub mod atom;
pub mod attachment;
pub mod element;
pub mod group;
pub mod molecule;
pub mod topology;
