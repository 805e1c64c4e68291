//! Unified error handling for meshpacker
//!
//! Every fatal condition of a packing run is one variant of [`Error`].
//! Records that are merely incomplete (an asset without a material file, an
//! extra without a source) are not errors; they are dropped with a warning
//! by whoever finalizes them.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all meshpacker operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An input file (project, material, mesh description, texture) could not be opened
    #[error("Can't open {}: {source}", .path.display())]
    MissingInputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ==================== Parse Errors ====================

    /// Directive in an invalid context, or a `key: value` line without its colon
    #[error("Malformed project file '{}' at line {line} ({content:?}): {message}", .path.display())]
    MalformedProjectFile {
        path: PathBuf,
        line: usize,
        content: String,
        message: String,
    },

    /// Mesh description is not well-formed markup
    #[error("Invalid mesh description {}: {message}", .path.display())]
    InvalidMeshDescription {
        path: PathBuf,
        message: String,
    },

    // ==================== Input Resolution Errors ====================

    /// Several candidate files found where exactly one was expected
    #[error("Multiple {kind} files found: {candidates:?}")]
    AmbiguousInput {
        kind: String,
        candidates: Vec<PathBuf>,
    },

    /// No candidate file found and none specified
    #[error("No {kind} file specified or found")]
    InputNotFound {
        kind: String,
    },

    // ==================== External Tool Errors ====================

    /// The conversion tool could not be started
    #[error("Failed to launch '{tool}': {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The conversion tool exited unsuccessfully
    #[error("'{tool}' failed on {} ({})", .input.display(), describe_status(.status))]
    ExternalToolFailure {
        tool: String,
        input: PathBuf,
        status: Option<i32>,
    },

    // ==================== Archive Errors ====================

    /// Writing the output archive failed
    #[error("Failed to write archive {}: {message}", .path.display())]
    ArchiveWrite {
        path: PathBuf,
        message: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a missing input file error
    pub fn missing_input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::MissingInputFile {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed project file error
    pub fn malformed(
        path: impl Into<PathBuf>,
        line: usize,
        content: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::MalformedProjectFile {
            path: path.into(),
            line,
            content: content.into(),
            message: message.into(),
        }
    }

    /// Peel off any context layers
    pub fn root(&self) -> &Error {
        match self {
            Error::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.root(),
            Error::MissingInputFile { .. } | Error::InputNotFound { .. }
        )
    }

    /// Check if this is a parse/format error
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.root(),
            Error::MalformedProjectFile { .. } | Error::InvalidMeshDescription { .. }
        )
    }

    /// Check if the conversion tool is to blame
    pub fn is_external_failure(&self) -> bool {
        matches!(
            self.root(),
            Error::ToolLaunch { .. } | Error::ExternalToolFailure { .. }
        )
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn missing() -> Error {
        Error::missing_input("/proj/tree.material", io::Error::from(io::ErrorKind::NotFound))
    }

    #[test]
    fn test_error_with_context() {
        let contextualized = missing().with_context("while scanning archive out.zip");

        let message = contextualized.to_string();
        assert!(message.contains("while scanning archive out.zip"));
        assert!(message.contains("tree.material"));
    }

    #[test]
    fn test_is_not_found_sees_through_context() {
        assert!(missing().is_not_found());
        assert!(missing().with_context("outer").is_not_found());
        assert!(Error::InputNotFound { kind: ".material".into() }.is_not_found());
        assert!(!Error::malformed("p.txt", 3, "Mesh", "nested block").is_not_found());
    }

    #[test]
    fn test_is_parse_error() {
        assert!(Error::malformed("p.txt", 3, "Mesh", "nested block").is_parse_error());
        assert!(Error::InvalidMeshDescription {
            path: PathBuf::from("a.mesh.xml"),
            message: "unexpected eof".into(),
        }
        .is_parse_error());
        assert!(!missing().is_parse_error());
    }

    #[test]
    fn test_malformed_message_names_line_and_content() {
        let err = Error::malformed("/proj/project.txt", 7, "Name Tree", "missing colon");
        let message = err.to_string();
        assert!(message.contains("line 7"));
        assert!(message.contains("Name Tree"));
        assert!(message.contains("missing colon"));
    }

    #[test]
    fn test_external_failure_status() {
        let err = Error::ExternalToolFailure {
            tool: "OgreXMLConverter".into(),
            input: PathBuf::from("tree.mesh.xml"),
            status: Some(2),
        };
        assert!(err.is_external_failure());
        assert!(err.to_string().contains("exit code 2"));

        let killed = Error::ExternalToolFailure {
            tool: "OgreXMLConverter".into(),
            input: PathBuf::from("tree.mesh.xml"),
            status: None,
        };
        assert!(killed.to_string().contains("signal"));
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(missing());
        let with_context = result.context("loading material");

        assert!(with_context.is_err());
        assert!(with_context.unwrap_err().to_string().contains("loading material"));
    }
}
