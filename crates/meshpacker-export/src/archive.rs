//! Store-only archive writing

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use meshpacker_core::{Error, Result};
use tracing::{debug, trace, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes files into a new archive without compression.
///
/// Entry names are unique; adding a name twice keeps the first file.
pub struct ArchiveWriter {
    path: PathBuf,
    zip: ZipWriter<File>,
    entries: Vec<String>,
    names: BTreeSet<String>,
}

impl ArchiveWriter {
    /// Create (or truncate) the archive at `path`, creating parent directories
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path).map_err(|e| Error::ArchiveWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
        debug!(archive = %path.display(), "Created archive");

        Ok(Self {
            path,
            zip: ZipWriter::new(file),
            entries: Vec::new(),
            names: BTreeSet::new(),
        })
    }

    /// Entry names written so far, in order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Copy `source` into the archive as `entry`.
    ///
    /// Returns `false` when an entry with that name already exists.
    pub fn add_file(&mut self, source: &Path, entry: &str) -> Result<bool> {
        if self.names.contains(entry) {
            warn!(
                archive = %self.path.display(),
                entry,
                source = %source.display(),
                "Skipping duplicate archive entry"
            );
            return Ok(false);
        }

        let mut input = File::open(source).map_err(|e| Error::missing_input(source, e))?;

        let options = FileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .large_file(input.metadata().map(|m| m.len() >= u32::MAX as u64).unwrap_or(false));
        self.zip
            .start_file(entry, options)
            .map_err(|e| self.write_error(e))?;
        let bytes = io::copy(&mut input, &mut self.zip).map_err(|e| self.write_error(e))?;

        trace!(entry, bytes, "Added archive entry");
        self.names.insert(entry.to_string());
        self.entries.push(entry.to_string());
        Ok(true)
    }

    /// Write the central directory and close the archive
    pub fn finish(mut self) -> Result<Vec<String>> {
        self.zip.finish().map_err(|e| self.write_error(e))?;
        debug!(
            archive = %self.path.display(),
            entries = self.entries.len(),
            "Archive complete"
        );
        Ok(self.entries)
    }

    fn write_error(&self, err: impl std::fmt::Display) -> Error {
        Error::ArchiveWrite {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}
