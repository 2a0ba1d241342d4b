use std::fs::{self, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::record::{HEADER, ResultRecord};
use crate::error::{Error, Result};

/// Append-only CSV file of finished sessions
///
/// Row order is insertion order, which is also chronological order. The
/// store keeps no in-memory cache; every read parses the file again.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Append one record, creating the file with a header row if needed
    pub fn append(&self, record: &ResultRecord) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
        }
        writer.serialize(record)?;
        writer.flush()?;

        info!(
            path = %self.path.display(),
            score = record.score,
            level = record.level,
            "Appended result"
        );
        Ok(())
    }

    /// Read every well-formed record; a missing file means no data yet
    pub fn load_all(&self) -> Result<Vec<ResultRecord>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<ResultRecord>().enumerate() {
            match row {
                Ok(record) => records.push(record),
                Err(e) => debug!(row = index + 1, "Skipping malformed result row: {}", e),
            }
        }
        Ok(records)
    }

    /// Delete the backing file; returns whether anything was removed
    pub fn clear_all(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Cleared results");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Copy the backing file byte for byte to `dest`
    pub fn export_to(&self, dest: &Path) -> Result<u64> {
        if !self.exists() {
            return Err(Error::NothingToExport(self.path.clone()));
        }

        // Copying a file onto itself would truncate it first.
        if let (Ok(src), Ok(dst)) = (self.path.canonicalize(), dest.canonicalize())
            && src == dst
        {
            return Ok(fs::metadata(&self.path)?.len());
        }

        let bytes = fs::copy(&self.path, dest)?;
        info!(dest = %dest.display(), bytes, "Exported results");
        Ok(bytes)
    }
}
