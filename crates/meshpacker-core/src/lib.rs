//! meshpacker Core Library
//!
//! This crate provides the data model, naming rules, and error handling
//! shared across all meshpacker components.

pub mod error;
pub mod naming;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use types::*;

/// Namespace inside an archive that holds textures used by several assets
pub const SHARED_TEXTURES_DIR: &str = "SharedTextures";

/// Prefix given to backup copies of rewritten input files
pub const BACKUP_PREFIX: &str = "orig_";

/// File name used for a `Zip` block that never sets a `Path`
pub const DEFAULT_ARCHIVE_NAME: &str = "meshpacker.zip";

