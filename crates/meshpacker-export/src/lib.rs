//! meshpacker Export Pipeline
//!
//! Turns rewritten assets into distributable archives:
//! - external mesh conversion (`.mesh.xml` → binary `.mesh`)
//! - store-only archive writing with a fixed internal layout
//! - the per-archive pipeline sequencing scan, rewrite, conversion and assembly

pub mod archive;
pub mod converter;
pub mod pipeline;

pub use archive::ArchiveWriter;
pub use converter::{MeshConverter, XmlConverterTool, DEFAULT_CONVERTER_COMMAND};
pub use pipeline::{ArchivePacker, PackOptions, PackReport};
