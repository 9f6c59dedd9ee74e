use super::molecule::MolecularGraph;
use super::topology::BondOrder;
use nalgebra::Point3;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name of the SD data item holding attachment-point records.
pub const ATTACHMENT_POINTS_PROPERTY: &str = "ATTACHMENT_POINTS";

const FORMAT_VERSION: &str = "v1";
const ATOM_SEPARATOR: char = '#';
const FIELD_SEPARATOR: char = ':';
const VECTOR_SEPARATOR: char = '%';

#[derive(Debug, Error, PartialEq)]
pub enum AttachmentPointError {
    #[error("Malformed attachment-point record '{record}': {reason}")]
    MalformedRecord {
        record: String,
        reason: &'static str,
    },
    #[error("Unsupported attachment-point format version '{0}'")]
    UnsupportedVersion(String),
    #[error("Invalid attachment-point rule name '{0}'")]
    InvalidRule(String),
    #[error("Attachment point refers to atom {atom}, but the molecule only has {atom_count} atoms")]
    AtomOutOfRange { atom: usize, atom_count: usize },
    #[error("Attachment point refers to atom {atom} ('{symbol}'), which is not a placeholder")]
    NotAPlaceholder { atom: usize, symbol: String },
    #[error("Atom {0} carries more than one attachment-point record")]
    DuplicateAtom(usize),
}

/// The class of an attachment point: a rule name plus a numeric sub-class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApClass {
    rule: String,
    subclass: u32,
}

impl ApClass {
    /// Creates a class label.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentPointError::InvalidRule`] if the rule is empty or
    /// contains whitespace or any of the record separator characters.
    pub fn new(rule: &str, subclass: u32) -> Result<Self, AttachmentPointError> {
        let is_reserved = |c: char| {
            c.is_whitespace()
                || c == ATOM_SEPARATOR
                || c == FIELD_SEPARATOR
                || c == VECTOR_SEPARATOR
        };
        if rule.is_empty() || rule.chars().any(is_reserved) {
            return Err(AttachmentPointError::InvalidRule(rule.to_string()));
        }
        Ok(Self {
            rule: rule.to_string(),
            subclass,
        })
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn subclass(&self) -> u32 {
        self.subclass
    }
}

impl fmt::Display for ApClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.rule, FIELD_SEPARATOR, self.subclass)
    }
}

/// One serialized attachment point, as stored in the SD data item.
#[derive(Debug, Clone, PartialEq)]
pub struct ApRecord {
    /// Zero-based index of the placeholder atom.
    pub atom: usize,
    pub class: ApClass,
    pub bond_order: BondOrder,
    /// The end point of the attachment direction vector.
    pub direction: Point3<f64>,
}

impl fmt::Display for ApRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}{}{}{}{}{}{}",
            self.atom + 1,
            ATOM_SEPARATOR,
            self.class,
            FIELD_SEPARATOR,
            self.bond_order.ctfile_code(),
            FIELD_SEPARATOR,
            self.direction.x,
            VECTOR_SEPARATOR,
            self.direction.y,
            VECTOR_SEPARATOR,
            self.direction.z
        )
    }
}

impl FromStr for ApRecord {
    type Err = AttachmentPointError;

    // <atom>#<rule>:<subclass>:<order>:<x>%<y>%<z>
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| AttachmentPointError::MalformedRecord {
            record: s.to_string(),
            reason,
        };

        let (atom_str, rest) = s
            .split_once(ATOM_SEPARATOR)
            .ok_or_else(|| malformed("missing atom separator"))?;
        let atom: usize = atom_str
            .parse()
            .map_err(|_| malformed("invalid atom number"))?;
        if atom == 0 {
            return Err(malformed("atom numbers are 1-based"));
        }

        let fields: Vec<&str> = rest.split(FIELD_SEPARATOR).collect();
        let [rule, subclass, order, vector] = fields.as_slice() else {
            return Err(malformed("expected rule, sub-class, bond order and vector"));
        };
        let subclass: u32 = subclass
            .parse()
            .map_err(|_| malformed("invalid sub-class"))?;
        let code: u8 = order
            .parse()
            .map_err(|_| malformed("invalid bond order"))?;
        if code > 8 {
            return Err(malformed("invalid bond order"));
        }

        let coords = vector
            .split(VECTOR_SEPARATOR)
            .map(|c| c.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed("invalid vector component"))?;
        let [x, y, z] = coords.as_slice() else {
            return Err(malformed("vector must have three components"));
        };

        Ok(Self {
            atom: atom - 1,
            class: ApClass::new(rule, subclass)?,
            bond_order: BondOrder::from_ctfile(code),
            direction: Point3::new(*x, *y, *z),
        })
    }
}

/// Encodes records into the textual form of the SD data item.
pub fn encode_records(records: &[ApRecord]) -> String {
    let mut out = String::from(FORMAT_VERSION);
    for record in records {
        out.push(' ');
        out.push_str(&record.to_string());
    }
    out
}

/// Decodes the textual form of the SD data item.
///
/// A leading version token is optional; unversioned text is read as `v1`.
pub fn decode_records(text: &str) -> Result<Vec<ApRecord>, AttachmentPointError> {
    let mut tokens = text.split_whitespace().peekable();
    if let Some(first) = tokens.peek() {
        if !first.contains(ATOM_SEPARATOR) {
            if *first != FORMAT_VERSION {
                return Err(AttachmentPointError::UnsupportedVersion(first.to_string()));
            }
            tokens.next();
        }
    }
    tokens.map(str::parse).collect()
}

/// A placeholder atom viewed as an attachment point.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentPoint {
    /// Index of the placeholder atom.
    pub placeholder: usize,
    /// Index of the real atom the placeholder is bonded to, if any.
    pub owner: Option<usize>,
    pub class: ApClass,
    pub bond_order: BondOrder,
    pub direction: Point3<f64>,
}

impl MolecularGraph {
    /// Derives the attachment points of this graph from its data item.
    ///
    /// A graph without the data item has no attachment points.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentPointError`] if the data item cannot be decoded or a
    /// record refers to a missing, non-placeholder or already-claimed atom.
    pub fn attachment_points(&self) -> Result<Vec<AttachmentPoint>, AttachmentPointError> {
        let Some(text) = self.property(ATTACHMENT_POINTS_PROPERTY) else {
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        decode_records(text)?
            .into_iter()
            .map(|record| {
                let atom = self
                    .atom(record.atom)
                    .ok_or(AttachmentPointError::AtomOutOfRange {
                        atom: record.atom,
                        atom_count: self.atom_count(),
                    })?;
                if !atom.is_placeholder() {
                    return Err(AttachmentPointError::NotAPlaceholder {
                        atom: record.atom,
                        symbol: atom.symbol.clone(),
                    });
                }
                if !seen.insert(record.atom) {
                    return Err(AttachmentPointError::DuplicateAtom(record.atom));
                }
                Ok(AttachmentPoint {
                    placeholder: record.atom,
                    owner: self.neighbors(record.atom).next(),
                    class: record.class,
                    bond_order: record.bond_order,
                    direction: record.direction,
                })
            })
            .collect()
    }
}
