//! External mesh conversion
//!
//! The binary mesh format is produced by an external tool invoked as
//! `<tool> -q <input.mesh.xml> <output.mesh>`; exit code 0 means success.

use std::path::Path;
use std::process::Command;

use meshpacker_core::{Error, Result};
use tracing::{debug, info};

/// Tool used when none is configured
pub const DEFAULT_CONVERTER_COMMAND: &str = "OgreXMLConverter";

/// Converts a mesh description into the binary mesh format
pub trait MeshConverter {
    /// Returns a human-readable name for this converter
    fn name(&self) -> &str;

    /// Convert `input` and write the result to `output`
    fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Runs the external conversion tool
#[derive(Debug, Clone)]
pub struct XmlConverterTool {
    command: String,
}

impl XmlConverterTool {
    /// Use `command` as the conversion tool
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// The configured tool command
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for XmlConverterTool {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTER_COMMAND)
    }
}

impl MeshConverter for XmlConverterTool {
    fn name(&self) -> &str {
        &self.command
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        info!(
            tool = %self.command,
            input = %input.display(),
            output = %output.display(),
            "Running mesh converter"
        );

        let status = Command::new(&self.command)
            .arg("-q")
            .arg(input)
            .arg(output)
            .status()
            .map_err(|source| Error::ToolLaunch {
                tool: self.command.clone(),
                source,
            })?;

        if status.success() {
            debug!(input = %input.display(), "Mesh conversion [OK]");
            Ok(())
        } else {
            Err(Error::ExternalToolFailure {
                tool: self.command.clone(),
                input: input.to_path_buf(),
                status: status.code(),
            })
        }
    }
}
