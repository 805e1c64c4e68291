// meshpacker-parsers/src/traits.rs
//! Core trait shared by the in-place rewriters.
//!
//! A rewrite always reads the whole input first, transforms it in memory,
//! and only then replaces the file. A failure anywhere before the final
//! write leaves the input untouched.

use std::fs;
use std::io;
use std::path::Path;

use meshpacker_core::{Error, Result};
use tracing::debug;

/// Read a whole text input, reporting open failures as missing input files
pub fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::InvalidData => {
            Error::Io(source).with_context(format!("while reading {}", path.display()))
        }
        _ => Error::missing_input(path, source),
    })
}

/// Transforms a text file and writes the result back over it
pub trait InPlaceRewriter {
    /// Returns a human-readable name for this rewriter
    fn name(&self) -> &str;

    /// Rewrite the full content of `origin`, which was read from disk
    fn rewrite_str(&mut self, source: &str, origin: &Path) -> Result<String>;

    /// Rewrite a file in place, returning the number of bytes written.
    ///
    /// With `backup` set, the untouched content is also written there.
    fn rewrite_file(&mut self, path: &Path, backup: Option<&Path>) -> Result<usize> {
        let source = read_input(path)?;
        let output = self.rewrite_str(&source, path)?;

        if let Some(backup) = backup {
            fs::write(backup, &source)?;
            debug!(backup = %backup.display(), "Kept original");
        }
        fs::write(path, &output)?;

        debug!(
            rewriter = self.name(),
            path = %path.display(),
            bytes = output.len(),
            "Rewrote file"
        );
        Ok(output.len())
    }
}
