//! Material script handling
//!
//! Material scripts are block-structured text:
//!
//! ```text
//! material BaseMat/SOLID/TEX/bark.png
//! {
//!     technique
//!     {
//!         pass
//!         {
//!             texture_unit
//!             {
//!                 texture bark.png
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! Lines are first classified ([`classify`]) and then interpreted by the
//! shared-texture scan and the rewriter, which both see the exact same
//! texture references.

mod classify;
mod rewrite;
mod scan;

pub use classify::{classify, split_line_ending, MaterialLine};
pub use rewrite::{MaterialRewriter, CULL_NONE, DEPTH_WRITE_OFF, SCENE_BLEND_ALPHA};
pub use scan::{mark_shared_textures, SharedTextureScan};
