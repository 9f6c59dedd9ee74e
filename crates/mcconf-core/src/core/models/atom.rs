use super::element;
use nalgebra::Point3;

/// Represents a single atom of a conformer.
///
/// An atom is either a real chemical element or a placeholder (an attachment
/// point dummy, an `R` group, a `*` wildcard, ...). Placeholders are recognized
/// by an atomic number of zero; their symbol is kept verbatim so it can be
/// written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The element symbol or placeholder tag as read from the input (e.g., "C", "Cl", "R").
    pub symbol: String,
    /// The atomic number, or 0 for placeholder atoms.
    pub atomic_number: u8,
    /// The formal charge in elementary charge units.
    pub formal_charge: i8,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom`, resolving the atomic number from the symbol.
    ///
    /// Symbols that are not chemical elements produce a placeholder atom.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The element symbol or placeholder tag.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(symbol: &str, position: Point3<f64>) -> Self {
        let symbol = symbol.trim();
        Self {
            symbol: symbol.to_string(),
            atomic_number: element::atomic_number(symbol).unwrap_or(0),
            formal_charge: 0,
            position,
        }
    }

    pub fn with_charge(mut self, formal_charge: i8) -> Self {
        self.formal_charge = formal_charge;
        self
    }

    /// Returns `true` if this atom does not stand for a real element.
    pub fn is_placeholder(&self) -> bool {
        self.atomic_number == 0
    }
}
