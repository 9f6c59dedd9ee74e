use crate::core::models::molecule::MolecularGraph;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing multi-record molecular files.
///
/// Conformer ensembles are stored many records to a file, so readers return
/// every record in file order and writers can emit records one at a time,
/// which lets results be appended as soon as they are available.
pub trait MolecularFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads every record from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_all(reader: &mut impl BufRead) -> Result<Vec<MolecularGraph>, Self::Error>;

    /// Writes a single record to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_record(molecule: &MolecularGraph, writer: &mut impl Write)
    -> Result<(), Self::Error>;

    /// Writes several records to a writer, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if writing any record fails.
    fn write_all<'a>(
        molecules: impl IntoIterator<Item = &'a MolecularGraph>,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for molecule in molecules {
            Self::write_record(molecule, writer)?;
        }
        Ok(())
    }

    /// Reads every record from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<MolecularGraph>, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_all(&mut reader)
    }

    /// Writes records to a file path, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<'a, P: AsRef<Path>>(
        molecules: impl IntoIterator<Item = &'a MolecularGraph>,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_all(molecules, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
