use super::atom::Atom;
use super::topology::{Bond, BondOrder};
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Bond {bond} references atom {atom}, but the molecule only has {atom_count} atoms")]
    BondOutOfRange {
        bond: usize,
        atom: usize,
        atom_count: usize,
    },
    #[error("Bond {bond} connects atom {atom} to itself")]
    SelfBond { bond: usize, atom: usize },
}

/// Represents one conformer: an ordered set of atoms with 3D coordinates,
/// the bonds connecting them, and the named data items of its record.
///
/// Coordinates are stored on the atoms, so the atom count always equals the
/// coordinate count. Every bond endpoint is checked against the atom list when
/// the graph is assembled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MolecularGraph {
    /// The record title (first header line of an SD record).
    title: String,
    /// Atoms in file order; their indices are the graph vertices.
    atoms: Vec<Atom>,
    /// Bonds between atom indices.
    bonds: Vec<Bond>,
    /// Named data items in the order they were read or set.
    properties: Vec<(String, String)>,
}

impl MolecularGraph {
    /// Creates a new, empty molecular graph with the given title.
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    /// Assembles a graph from atoms and bonds, validating every bond.
    ///
    /// # Errors
    ///
    /// Returns [`MoleculeError`] if a bond references a missing atom or
    /// connects an atom to itself.
    pub fn from_parts(
        title: &str,
        atoms: Vec<Atom>,
        bonds: Vec<Bond>,
    ) -> Result<Self, MoleculeError> {
        let mut graph = Self::new(title);
        graph.atoms = atoms;
        for bond in bonds {
            graph.add_bond(bond.atom1, bond.atom2, bond.order)?;
        }
        Ok(graph)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    /// Appends an atom and returns its index.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    /// Adds a bond between two existing atoms.
    ///
    /// # Errors
    ///
    /// Returns [`MoleculeError`] if either index is out of range or both are equal.
    pub fn add_bond(
        &mut self,
        atom1: usize,
        atom2: usize,
        order: BondOrder,
    ) -> Result<(), MoleculeError> {
        let bond = self.bonds.len();
        for atom in [atom1, atom2] {
            if atom >= self.atoms.len() {
                return Err(MoleculeError::BondOutOfRange {
                    bond,
                    atom,
                    atom_count: self.atoms.len(),
                });
            }
        }
        if atom1 == atom2 {
            return Err(MoleculeError::SelfBond { bond, atom: atom1 });
        }
        self.bonds.push(Bond::new(atom1, atom2, order));
        Ok(())
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn atom_mut(&mut self, index: usize) -> Option<&mut Atom> {
        self.atoms.get_mut(index)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Returns the coordinates of all atoms in index order.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.atoms.iter().map(|a| a.position).collect()
    }

    /// Overwrites atom coordinates in index order.
    ///
    /// Only as many atoms as there are positions are updated.
    pub fn set_positions(&mut self, positions: &[Point3<f64>]) {
        for (atom, position) in self.atoms.iter_mut().zip(positions) {
            atom.position = *position;
        }
    }

    /// Returns an iterator over the indices of atoms bonded to `index`.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.bonds.iter().filter_map(move |b| b.partner(index))
    }

    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a data item, replacing the value in place if the key already exists.
    pub fn set_property(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.properties.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.properties.push((key.to_string(), value)),
        }
    }

    pub fn remove_property(&mut self, key: &str) -> Option<String> {
        let position = self.properties.iter().position(|(k, _)| k == key)?;
        Some(self.properties.remove(position).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> MolecularGraph {
        MolecularGraph::from_parts(
            "water",
            vec![
                Atom::new("O", Point3::new(0.0, 0.0, 0.0)),
                Atom::new("H", Point3::new(0.96, 0.0, 0.0)),
                Atom::new("H", Point3::new(-0.24, 0.93, 0.0)),
            ],
            vec![
                Bond::new(0, 1, BondOrder::Single),
                Bond::new(0, 2, BondOrder::Single),
            ],
        )
        .unwrap()
    }

    #[test]
    fn from_parts_builds_valid_graph() {
        let mol = water();
        assert_eq!(mol.title(), "water");
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(mol.positions().len(), mol.atom_count());
    }

    #[test]
    fn from_parts_rejects_out_of_range_bond() {
        let result = MolecularGraph::from_parts(
            "bad",
            vec![Atom::new("C", Point3::origin())],
            vec![Bond::new(0, 1, BondOrder::Single)],
        );
        assert_eq!(
            result.unwrap_err(),
            MoleculeError::BondOutOfRange {
                bond: 0,
                atom: 1,
                atom_count: 1
            }
        );
    }

    #[test]
    fn add_bond_rejects_self_bond() {
        let mut mol = water();
        assert_eq!(
            mol.add_bond(1, 1, BondOrder::Single),
            Err(MoleculeError::SelfBond { bond: 2, atom: 1 })
        );
    }

    #[test]
    fn neighbors_lists_bonded_atoms() {
        let mol = water();
        let mut neighbors: Vec<_> = mol.neighbors(0).collect();
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec![1, 2]);
        assert_eq!(mol.neighbors(1).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn set_property_replaces_existing_value_in_place() {
        let mut mol = water();
        mol.set_property("ISOMER", "a");
        mol.set_property("ENERGY", "1.0");
        mol.set_property("ISOMER", "b");
        assert_eq!(mol.property("ISOMER"), Some("b"));
        assert_eq!(mol.properties()[0].0, "ISOMER");
        assert_eq!(mol.properties().len(), 2);
        assert_eq!(mol.remove_property("ENERGY"), Some("1.0".to_string()));
        assert_eq!(mol.property("ENERGY"), None);
    }

    #[test]
    fn set_positions_updates_coordinates() {
        let mut mol = water();
        let shifted: Vec<_> = mol
            .positions()
            .iter()
            .map(|p| p + nalgebra::Vector3::new(1.0, 0.0, 0.0))
            .collect();
        mol.set_positions(&shifted);
        assert_eq!(mol.positions(), shifted);
    }
}
