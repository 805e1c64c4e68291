//! meshpacker-parsers
//!
//! Readers and in-place rewriters for the text formats a packing run touches.
//!
//! # Supported Formats
//!
//! | Format  | Extension   | Description |
//! |---------|-------------|-------------|
//! | Project | any         | Block-structured list of archives to build |
//! | Material| `.material` | Material scripts with `pass`/`texture_unit` blocks |
//! | Mesh XML| `.mesh.xml` | Mesh description with `submesh` elements |
//!
//! # Example
//!
//! ```rust,ignore
//! use meshpacker_parsers::ProjectParser;
//!
//! let archives = ProjectParser::new().parse_file("project.txt".as_ref())?;
//! println!("{} archives to build", archives.len());
//! ```

pub mod material;
pub mod mesh_xml;
pub mod project;
pub mod traits;

pub use material::{
    classify, mark_shared_textures, MaterialLine, MaterialRewriter, SharedTextureScan,
};
pub use mesh_xml::MeshReferenceFixer;
pub use project::{parse_directive, BlockKind, Directive, ProjectParser};
pub use traits::{read_input, InPlaceRewriter};
