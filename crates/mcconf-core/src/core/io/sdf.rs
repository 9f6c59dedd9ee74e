use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::molecule::{MolecularGraph, MoleculeError};
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const RECORD_SEPARATOR: &str = "$$$$";
const PROGRAM_NAME: &str = "mcconf";
const V2000_MAX_COUNT: usize = 999;
const CHARGES_PER_LINE: usize = 8;

#[derive(Debug, Error)]
pub enum SdfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: SdfParseErrorKind },
    #[error("Invalid structure in record ending near line {line}: {source}")]
    Molecule {
        line: usize,
        #[source]
        source: MoleculeError,
    },
    #[error("Cannot write record '{title}': {reason}")]
    Unwritable { title: String, reason: String },
    #[error("File contains no molecule records")]
    Empty,
}

#[derive(Debug, Error)]
pub enum SdfParseErrorKind {
    #[error("Record ended before its counts line")]
    MissingCountsLine,
    #[error("Invalid counts line (value: '{0}')")]
    InvalidCounts(String),
    #[error("V3000 records are not supported")]
    UnsupportedV3000,
    #[error("Record ended before {expected} {block} lines were read")]
    TruncatedBlock { block: &'static str, expected: usize },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: &'static str, value: String },
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: &'static str, value: String },
    #[error("Atom symbol in columns 32-34 is empty")]
    MissingSymbol,
    #[error("Bond references atom {atom}, but atom numbers are 1-based")]
    ZeroAtomNumber { atom: usize },
    #[error("Malformed charge line '{0}'")]
    MalformedChargeLine(String),
    #[error("Malformed data item header '{0}'")]
    MalformedDataHeader(String),
}

fn columns(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_float(
    line: &str,
    line_no: usize,
    start: usize,
    end: usize,
    label: &'static str,
) -> Result<f64, SdfError> {
    let value = columns(line, start, end);
    value.parse().map_err(|_| SdfError::Parse {
        line: line_no,
        kind: SdfParseErrorKind::InvalidFloat {
            columns: label,
            value: value.into(),
        },
    })
}

fn parse_int(
    line: &str,
    line_no: usize,
    start: usize,
    end: usize,
    label: &'static str,
) -> Result<usize, SdfError> {
    let value = columns(line, start, end);
    value.parse().map_err(|_| SdfError::Parse {
        line: line_no,
        kind: SdfParseErrorKind::InvalidInt {
            columns: label,
            value: value.into(),
        },
    })
}

fn charge_from_code(code: usize) -> i8 {
    match code {
        1 => 3,
        2 => 2,
        3 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        _ => 0,
    }
}

/// A cursor over the numbered lines of an SD file.
struct LineCursor {
    lines: Vec<String>,
    position: usize,
}

impl LineCursor {
    fn next(&mut self) -> Option<(usize, &str)> {
        let line = self.lines.get(self.position)?;
        self.position += 1;
        Some((self.position, line.as_str()))
    }

    /// Like `next`, but a missing line is a parse error of the given kind.
    fn require(&mut self, kind: SdfParseErrorKind) -> Result<(usize, &str), SdfError> {
        let line = self.position;
        self.next().ok_or(SdfError::Parse { line, kind })
    }

    fn only_blank_lines_left(&self) -> bool {
        self.lines[self.position.min(self.lines.len())..]
            .iter()
            .all(|l| l.trim().is_empty())
    }
}

/// Reader and writer for MDL SD files (V2000 connection tables).
pub struct SdfFile;

impl SdfFile {
    fn read_record(cursor: &mut LineCursor) -> Result<MolecularGraph, SdfError> {
        let title = cursor.next().map(|(_, l)| l.trim().to_string()).unwrap_or_default();
        cursor.next(); // program / timestamp line
        cursor.next(); // comment line

        let (counts_no, counts_line) = cursor.require(SdfParseErrorKind::MissingCountsLine)?;
        if columns(counts_line, 33, 39) == "V3000" || counts_line.contains("V3000") {
            return Err(SdfError::Parse {
                line: counts_no,
                kind: SdfParseErrorKind::UnsupportedV3000,
            });
        }
        let invalid_counts = || SdfError::Parse {
            line: counts_no,
            kind: SdfParseErrorKind::InvalidCounts(counts_line.to_string()),
        };
        let n_atoms: usize = columns(counts_line, 0, 3).parse().map_err(|_| invalid_counts())?;
        let n_bonds: usize = columns(counts_line, 3, 6).parse().map_err(|_| invalid_counts())?;

        let mut molecule = MolecularGraph::new(&title);

        for _ in 0..n_atoms {
            let (line_no, line) = cursor.require(SdfParseErrorKind::TruncatedBlock {
                block: "atom",
                expected: n_atoms,
            })?;
            let x = parse_float(line, line_no, 0, 10, "1-10")?;
            let y = parse_float(line, line_no, 10, 20, "11-20")?;
            let z = parse_float(line, line_no, 20, 30, "21-30")?;
            let symbol = columns(line, 31, 34);
            if symbol.is_empty() {
                return Err(SdfError::Parse {
                    line: line_no,
                    kind: SdfParseErrorKind::MissingSymbol,
                });
            }
            let charge_code = columns(line, 36, 39).parse().unwrap_or(0);
            molecule.add_atom(
                Atom::new(symbol, Point3::new(x, y, z)).with_charge(charge_from_code(charge_code)),
            );
        }

        for _ in 0..n_bonds {
            let (line_no, line) = cursor.require(SdfParseErrorKind::TruncatedBlock {
                block: "bond",
                expected: n_bonds,
            })?;
            let a1 = parse_int(line, line_no, 0, 3, "1-3")?;
            let a2 = parse_int(line, line_no, 3, 6, "4-6")?;
            let code = columns(line, 6, 9).parse().unwrap_or(0);
            for atom in [a1, a2] {
                if atom == 0 {
                    return Err(SdfError::Parse {
                        line: line_no,
                        kind: SdfParseErrorKind::ZeroAtomNumber { atom },
                    });
                }
            }
            molecule
                .add_bond(a1 - 1, a2 - 1, BondOrder::from_ctfile(code))
                .map_err(|source| SdfError::Molecule {
                    line: line_no,
                    source,
                })?;
        }

        // Properties block. "M  CHG" supersedes the atom-block charge field.
        let mut charges_reset = false;
        while let Some((line_no, line)) = cursor.next() {
            if line.starts_with("M  END") {
                break;
            }
            if line.starts_with(RECORD_SEPARATOR) {
                return Ok(molecule);
            }
            if line.starts_with("M  CHG") {
                let charges = parse_charge_line(line).ok_or_else(|| SdfError::Parse {
                    line: line_no,
                    kind: SdfParseErrorKind::MalformedChargeLine(line.to_string()),
                })?;
                if !charges_reset {
                    for index in 0..molecule.atom_count() {
                        if let Some(atom) = molecule.atom_mut(index) {
                            atom.formal_charge = 0;
                        }
                    }
                    charges_reset = true;
                }
                for (index, charge) in charges {
                    let atom = molecule.atom_mut(index).ok_or_else(|| SdfError::Parse {
                        line: line_no,
                        kind: SdfParseErrorKind::MalformedChargeLine(line.to_string()),
                    })?;
                    atom.formal_charge = charge;
                }
            }
        }

        // Data items. A blank line ends an item; a "$$$$" line always ends the
        // record, closing any item left open.
        let mut current: Option<(String, Vec<String>)> = None;
        while let Some((line_no, line)) = cursor.next() {
            if line.trim_end() == RECORD_SEPARATOR {
                break;
            }
            match current.as_mut() {
                Some((_, values)) => {
                    if line.trim().is_empty() {
                        if let Some((key, values)) = current.take() {
                            molecule.set_property(&key, values.join("\n"));
                        }
                    } else {
                        values.push(line.to_string());
                    }
                }
                None => {
                    if line.starts_with('>') {
                        let key = parse_data_header(line).ok_or_else(|| SdfError::Parse {
                            line: line_no,
                            kind: SdfParseErrorKind::MalformedDataHeader(line.to_string()),
                        })?;
                        current = Some((key, Vec::new()));
                    }
                }
            }
        }
        if let Some((key, values)) = current {
            molecule.set_property(&key, values.join("\n"));
        }

        Ok(molecule)
    }
}

/// Parses `M  CHG  n aaa vvv ...` into zero-based atom indices and charges.
fn parse_charge_line(line: &str) -> Option<Vec<(usize, i8)>> {
    let rest = line.strip_prefix("M  CHG")?;
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let count: usize = parts.first()?.parse().ok()?;
    let mut charges = Vec::with_capacity(count);
    for pair in parts[1..].chunks(2).take(count) {
        let [atom, value] = pair else { break };
        let atom: usize = atom.parse().ok()?;
        let value: i8 = value.parse().ok()?;
        if atom == 0 {
            return None;
        }
        charges.push((atom - 1, value));
    }
    Some(charges)
}

/// Extracts the field name from a data header such as `>  <ISOMER>  (12)`.
fn parse_data_header(line: &str) -> Option<String> {
    let start = line.find('<')?;
    let end = line[start + 1..].find('>')? + start + 1;
    Some(line[start + 1..end].to_string())
}

impl MolecularFile for SdfFile {
    type Error = SdfError;

    fn read_all(reader: &mut impl BufRead) -> Result<Vec<MolecularGraph>, Self::Error> {
        let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
        let mut cursor = LineCursor { lines, position: 0 };

        let mut molecules = Vec::new();
        while !cursor.only_blank_lines_left() {
            molecules.push(Self::read_record(&mut cursor)?);
        }
        if molecules.is_empty() {
            return Err(SdfError::Empty);
        }
        Ok(molecules)
    }

    fn write_record(molecule: &MolecularGraph, writer: &mut impl Write) -> Result<(), Self::Error> {
        if molecule.atom_count() > V2000_MAX_COUNT || molecule.bond_count() > V2000_MAX_COUNT {
            return Err(SdfError::Unwritable {
                title: molecule.title().to_string(),
                reason: format!("V2000 allows at most {} atoms and bonds", V2000_MAX_COUNT),
            });
        }

        writeln!(writer, "{}", molecule.title())?;
        writeln!(writer, "  {:<8}{:10}3D", PROGRAM_NAME, "")?;
        writeln!(writer)?;
        writeln!(
            writer,
            "{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000",
            molecule.atom_count(),
            molecule.bond_count()
        )?;

        for atom in molecule.atoms() {
            writeln!(
                writer,
                "{:>10.4}{:>10.4}{:>10.4} {:<3} 0  0  0  0  0  0  0  0  0  0  0  0",
                atom.position.x, atom.position.y, atom.position.z, atom.symbol
            )?;
        }
        for bond in molecule.bonds() {
            writeln!(
                writer,
                "{:>3}{:>3}{:>3}  0  0  0  0",
                bond.atom1 + 1,
                bond.atom2 + 1,
                bond.order.ctfile_code()
            )?;
        }

        let charged: Vec<(usize, i8)> = molecule
            .atoms()
            .iter()
            .enumerate()
            .filter(|(_, a)| a.formal_charge != 0)
            .map(|(i, a)| (i + 1, a.formal_charge))
            .collect();
        for chunk in charged.chunks(CHARGES_PER_LINE) {
            write!(writer, "M  CHG{:>3}", chunk.len())?;
            for (atom, charge) in chunk {
                write!(writer, " {:>3} {:>3}", atom, charge)?;
            }
            writeln!(writer)?;
        }
        writeln!(writer, "M  END")?;

        for (key, value) in molecule.properties() {
            writeln!(writer, "> <{}>", key)?;
            writeln!(writer, "{}", value)?;
            writeln!(writer)?;
        }
        writeln!(writer, "{}", RECORD_SEPARATOR)?;
        Ok(())
    }
}
