use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing a persisted record.
///
/// Implementors handle format-specific encoding and decoding. Writing to a path
/// is atomic: the record is written to a temporary file in the destination
/// directory and renamed over the target only once it is fully flushed, so a
/// reader sees either the previous file or the new one, never a partial write.
pub trait RecordFile {
    /// The in-memory value stored in the file.
    type Record;

    /// The error type for I/O and format failures.
    type Error: Error + From<io::Error>;

    /// Reads a record from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails or the reader fails.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Record, Self::Error>;

    /// Writes a record to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the writer fails.
    fn write_to(record: &Self::Record, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a record from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoding fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Record, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Atomically replaces the file at `path` with the encoded record.
    ///
    /// On any failure the temporary file is removed and the previous content of
    /// `path`, if any, is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created, written, synced
    /// or renamed into place.
    fn write_to_path<P: AsRef<Path>>(record: &Self::Record, path: P) -> Result<(), Self::Error> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = tempfile::Builder::new()
            .prefix(".staged-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            Self::write_to(record, &mut writer)?;
            writer.flush()?;
        }
        staged.as_file().sync_all()?;
        staged
            .persist(path)
            .map_err(|e| Self::Error::from(e.error))?;
        Ok(())
    }
}
