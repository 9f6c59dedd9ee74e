use crate::core::models::attachment::{ApClass, AttachmentPointError};
use crate::core::models::element;
use crate::core::models::molecule::MolecularGraph;
use crate::core::models::topology::BondOrder;
use petgraph::algo::subgraph_isomorphisms_iter;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashSet;
use thiserror::Error;
use tracing::trace;

/// Element standing in for placeholders that carry no known attachment-point class.
pub const FILLER_ELEMENT: &str = "Xe";

// Elements that are rare in organic conformer sets; the filler is deliberately absent.
const STAND_IN_POOL: &[&str] = &[
    "He", "Ne", "Ar", "Kr", "Rn", "Li", "Be", "Na", "Mg", "Al", "K", "Ca", "Sc", "Ti", "V", "Cr",
    "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru",
    "Rh", "Pd", "Ag", "Cd", "In", "Sn", "Sb", "Te", "Cs", "Ba", "La", "Hf", "Ta", "W", "Re", "Os",
    "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po",
];

#[derive(Debug, Error, PartialEq)]
pub enum CorrespondenceError {
    #[error("Invalid attachment points: {0}")]
    AttachmentPoints(#[from] AttachmentPointError),
    #[error(
        "Attachment-point class {class} is used with bond orders {first} and {second}; equal classes must share a bond order"
    )]
    InconsistentClass {
        class: ApClass,
        first: BondOrder,
        second: BondOrder,
    },
    #[error("Ran out of stand-in elements after {0} attachment-point classes")]
    StandInPoolExhausted(usize),
}

/// A one-to-one map from atom indices of graph A to atom indices of graph B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomMapping(Vec<usize>);

impl AtomMapping {
    pub fn new(targets: Vec<usize>) -> Self {
        Self(targets)
    }

    /// The atom of graph B matched to atom `index` of graph A.
    pub fn target(&self, index: usize) -> Option<usize> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Returns `true` if every one of `atom_count` atoms is mapped to a distinct target.
    pub fn is_complete(&self, atom_count: usize) -> bool {
        if self.0.len() != atom_count {
            return false;
        }
        let mut seen = HashSet::with_capacity(atom_count);
        self.0.iter().all(|&t| t < atom_count && seen.insert(t))
    }

    /// Reorders `items` of graph B into graph A's atom order.
    pub fn reorder<T: Copy>(&self, items: &[T]) -> Option<Vec<T>> {
        self.0.iter().map(|&t| items.get(t).copied()).collect()
    }
}

/// Stand-in elements for attachment-point classes, built from a reference graph.
///
/// Matching labels are atomic numbers. Real atoms keep theirs; placeholders
/// are relabeled so that isomorphism search only pairs attachment points of
/// the same class.
#[derive(Debug, Clone)]
pub struct StandInTable {
    entries: Vec<(ApClass, BondOrder, u8)>,
    filler: u8,
}

impl StandInTable {
    /// Builds the table from `reference`, skipping every element present in
    /// `reference` or `other`. Classes are numbered in order of first appearance.
    ///
    /// # Errors
    ///
    /// Returns [`CorrespondenceError`] if the attachment points cannot be read,
    /// one class appears with two bond orders, or the pool runs out.
    pub fn build(
        reference: &MolecularGraph,
        other: &MolecularGraph,
    ) -> Result<Self, CorrespondenceError> {
        let present: HashSet<u8> = reference
            .atoms()
            .iter()
            .chain(other.atoms())
            .map(|a| a.atomic_number)
            .collect();
        let mut pool = STAND_IN_POOL
            .iter()
            .filter_map(|symbol| element::atomic_number(symbol))
            .filter(|z| !present.contains(z));

        let mut table = Self {
            entries: Vec::new(),
            filler: element::atomic_number(FILLER_ELEMENT).unwrap_or(54),
        };
        for point in reference.attachment_points()? {
            if table.lookup(&point.class, point.bond_order)?.is_some() {
                continue;
            }
            let stand_in = pool
                .next()
                .ok_or(CorrespondenceError::StandInPoolExhausted(table.entries.len()))?;
            table.entries.push((point.class, point.bond_order, stand_in));
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The stand-in for `class`, checking that `order` agrees with the table.
    fn lookup(&self, class: &ApClass, order: BondOrder) -> Result<Option<u8>, CorrespondenceError> {
        match self.entries.iter().find(|(c, _, _)| c == class) {
            Some((_, first, _)) if *first != order => Err(CorrespondenceError::InconsistentClass {
                class: class.clone(),
                first: *first,
                second: order,
            }),
            Some((_, _, stand_in)) => Ok(Some(*stand_in)),
            None => Ok(None),
        }
    }

    /// Computes the matching label of every atom of `graph`. The graph itself
    /// is left untouched.
    pub fn labels(&self, graph: &MolecularGraph) -> Result<Vec<u8>, CorrespondenceError> {
        let mut labels: Vec<u8> = graph
            .atoms()
            .iter()
            .map(|a| if a.is_placeholder() { self.filler } else { a.atomic_number })
            .collect();
        for point in graph.attachment_points()? {
            if let Some(stand_in) = self.lookup(&point.class, point.bond_order)? {
                labels[point.placeholder] = stand_in;
            }
        }
        Ok(labels)
    }
}

fn to_petgraph(graph: &MolecularGraph, labels: &[u8]) -> UnGraph<u8, BondOrder> {
    let mut g = UnGraph::with_capacity(labels.len(), graph.bond_count());
    for &label in labels {
        g.add_node(label);
    }
    for bond in graph.bonds() {
        g.add_edge(
            NodeIndex::new(bond.atom1),
            NodeIndex::new(bond.atom2),
            bond.order,
        );
    }
    g
}

/// Enumerates the complete atom mappings from `a` onto `b`.
///
/// Both graphs must have the same atoms and bonds up to numbering. Atoms match
/// on element (placeholders on their stand-in), bonds on order with `Unset`
/// matching anything. Ring membership and stereochemistry play no part.
/// `max_mappings` stops the enumeration early for highly symmetric molecules.
///
/// An empty result means no complete correspondence exists.
pub fn find_mappings(
    a: &MolecularGraph,
    b: &MolecularGraph,
    max_mappings: Option<usize>,
) -> Result<Vec<AtomMapping>, CorrespondenceError> {
    if a.atom_count() != b.atom_count() || a.bond_count() != b.bond_count() {
        trace!(
            atoms = ?(a.atom_count(), b.atom_count()),
            bonds = ?(a.bond_count(), b.bond_count()),
            "Graph sizes differ; no correspondence possible."
        );
        return Ok(Vec::new());
    }

    let table = StandInTable::build(a, b)?;
    let graph_a = to_petgraph(a, &table.labels(a)?);
    let graph_b = to_petgraph(b, &table.labels(b)?);
    let (ref_a, ref_b) = (&graph_a, &graph_b);

    let mut node_match = |x: &u8, y: &u8| x == y;
    let mut edge_match = |x: &BondOrder, y: &BondOrder| x.matches(y);
    let Some(candidates) =
        subgraph_isomorphisms_iter(&ref_a, &ref_b, &mut node_match, &mut edge_match)
    else {
        return Ok(Vec::new());
    };

    let atom_count = a.atom_count();
    let mappings: Vec<AtomMapping> = candidates
        .map(AtomMapping::new)
        .filter(|m| m.is_complete(atom_count))
        .take(max_mappings.unwrap_or(usize::MAX))
        .collect();

    trace!(count = mappings.len(), "Enumerated atom mappings.");
    Ok(mappings)
}
