//! Material rewriting
//!
//! One forward pass over a material script:
//! - the material name is moved into the asset's namespace,
//! - texture references point at `<asset>/…` or `SharedTextures/…`,
//! - passes using alpha or two-sided textures get the matching render
//!   state injected right before their closing brace.
//!
//! Every other byte is copied through unchanged.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use meshpacker_core::{naming, Result, SHARED_TEXTURES_DIR};
use tracing::trace;

use super::classify::{classify, split_line_ending, MaterialLine};
use crate::traits::InPlaceRewriter;

/// Injected into passes using a texture whose name contains `alpha`
pub const SCENE_BLEND_ALPHA: &str = "scene_blend alpha_blend";

/// Injected alongside [`SCENE_BLEND_ALPHA`]
pub const DEPTH_WRITE_OFF: &str = "depth_write off";

/// Injected into passes using a texture whose name contains `twosided`/`2sided`
pub const CULL_NONE: &str = "cull_hardware none";

/// Render state requested by the textures of the open pass
#[derive(Debug, Default, Clone, Copy)]
struct PassState {
    alpha_blend: bool,
    double_sided: bool,
}

impl PassState {
    fn note_texture(&mut self, relative_path: &str) {
        let lower = relative_path.to_lowercase();
        if lower.contains("alpha") {
            self.alpha_blend = true;
        }
        if lower.contains("twosided") || lower.contains("2sided") {
            self.double_sided = true;
        }
    }

    fn injected_lines(self) -> Vec<&'static str> {
        let mut lines = Vec::new();
        if self.alpha_blend {
            lines.extend([SCENE_BLEND_ALPHA, DEPTH_WRITE_OFF]);
        }
        if self.double_sided {
            lines.push(CULL_NONE);
        }
        lines
    }
}

/// Rewrites one asset's material file
#[derive(Debug)]
pub struct MaterialRewriter<'a> {
    asset_name: &'a str,
    shared_textures: &'a BTreeSet<PathBuf>,
    private_textures: BTreeSet<PathBuf>,
}

impl<'a> MaterialRewriter<'a> {
    /// Create a rewriter for `asset_name`, given the archive's shared textures
    pub fn new(asset_name: &'a str, shared_textures: &'a BTreeSet<PathBuf>) -> Self {
        Self {
            asset_name,
            shared_textures,
            private_textures: BTreeSet::new(),
        }
    }

    /// Absolute paths of the non-shared textures seen so far
    pub fn private_textures(&self) -> &BTreeSet<PathBuf> {
        &self.private_textures
    }

    /// Consume the rewriter, keeping the non-shared textures
    pub fn into_private_textures(self) -> BTreeSet<PathBuf> {
        self.private_textures
    }

    /// Rewrite material text whose textures are relative to `material_dir`
    pub fn rewrite(&mut self, source: &str, material_dir: &Path) -> String {
        let mut output = String::with_capacity(source.len() + 64);
        let mut pass: Option<PassState> = None;
        let mut in_texture_unit = false;

        for raw in source.split_inclusive('\n') {
            let (line, eol) = split_line_ending(raw);

            match classify(line) {
                MaterialLine::MaterialDecl {
                    indent,
                    keyword,
                    name,
                    opens_block,
                } => {
                    output.push_str(indent);
                    output.push_str(keyword);
                    output.push(' ');
                    output.push_str(&naming::namespaced_material_name(self.asset_name, name));
                    if opens_block {
                        output.push_str(" {");
                    }
                    output.push_str(eol);
                }
                MaterialLine::PassOpen => {
                    pass = Some(PassState::default());
                    output.push_str(raw);
                }
                MaterialLine::TextureUnitOpen => {
                    in_texture_unit = true;
                    output.push_str(raw);
                }
                MaterialLine::TextureDecl {
                    indent,
                    keyword,
                    path,
                    trailing,
                } => {
                    let reference = self.texture_reference(path, material_dir);
                    trace!(texture = path, reference = %reference, "Rewrote texture reference");

                    output.push_str(indent);
                    output.push_str(keyword);
                    output.push(' ');
                    output.push_str(&reference);
                    output.push_str(trailing);
                    output.push_str(eol);

                    if let Some(pass) = pass.as_mut() {
                        pass.note_texture(path);
                    }
                }
                MaterialLine::BlockClose { indent_tabs } => {
                    if in_texture_unit {
                        in_texture_unit = false;
                    } else if let Some(closed) = pass.take() {
                        let indent = "\t".repeat(indent_tabs + 1);
                        let injected_eol = if eol.is_empty() { "\n" } else { eol };
                        for directive in closed.injected_lines() {
                            output.push_str(&indent);
                            output.push_str(directive);
                            output.push_str(injected_eol);
                        }
                    }
                    output.push_str(raw);
                }
                MaterialLine::Other => output.push_str(raw),
            }
        }

        output
    }

    fn texture_reference(&mut self, relative_path: &str, material_dir: &Path) -> String {
        let absolute = naming::resolve_relative(material_dir, relative_path);
        if self.shared_textures.contains(&absolute) {
            naming::texture_reference(SHARED_TEXTURES_DIR, relative_path)
        } else {
            self.private_textures.insert(absolute);
            naming::texture_reference(self.asset_name, relative_path)
        }
    }
}

impl InPlaceRewriter for MaterialRewriter<'_> {
    fn name(&self) -> &str {
        "material"
    }

    fn rewrite_str(&mut self, source: &str, origin: &Path) -> Result<String> {
        let material_dir = origin.parent().unwrap_or_else(|| Path::new(""));
        Ok(self.rewrite(source, material_dir))
    }
}
