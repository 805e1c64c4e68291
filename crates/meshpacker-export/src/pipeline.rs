//! Per-archive packing pipeline
//!
//! For one archive: find the shared textures, rewrite every asset's mesh
//! description and material in place, convert the meshes, then write the
//! archive. Any error aborts the archive; files already rewritten stay
//! rewritten.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use meshpacker_core::{naming, Archive, Asset, Result, ResultExt};
use meshpacker_parsers::{mark_shared_textures, InPlaceRewriter, MaterialRewriter, MeshReferenceFixer};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::archive::ArchiveWriter;
use crate::converter::{MeshConverter, XmlConverterTool, DEFAULT_CONVERTER_COMMAND};

/// Options for packing archives
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// External mesh conversion command
    pub converter: String,
    /// Keep `orig_` copies of rewritten inputs
    pub keep_originals: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            converter: DEFAULT_CONVERTER_COMMAND.to_string(),
            keep_originals: false,
        }
    }
}

/// Summary of one written archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackReport {
    /// Archive written
    pub archive: PathBuf,
    /// Names of the packed meshes
    pub assets: Vec<String>,
    /// Textures stored once under `SharedTextures/`
    pub shared_textures: Vec<PathBuf>,
    /// Target paths of the extra files
    pub extras: Vec<String>,
    /// Entry names in write order
    pub entries: Vec<String>,
}

/// Packs archives one after another
pub struct ArchivePacker<C: MeshConverter = XmlConverterTool> {
    options: PackOptions,
    converter: C,
}

impl ArchivePacker<XmlConverterTool> {
    /// Packer running the configured external converter
    pub fn new(options: PackOptions) -> Self {
        let converter = XmlConverterTool::new(options.converter.clone());
        Self { options, converter }
    }
}

impl<C: MeshConverter> ArchivePacker<C> {
    /// Packer using a custom converter
    pub fn with_converter(options: PackOptions, converter: C) -> Self {
        Self { options, converter }
    }

    /// Options this packer was created with
    pub fn options(&self) -> &PackOptions {
        &self.options
    }

    /// Pack every archive in order, stopping at the first failure.
    ///
    /// Archives without assets are skipped and produce no report.
    pub fn pack_all(&self, archives: impl IntoIterator<Item = Archive>) -> Result<Vec<PackReport>> {
        let mut reports = Vec::new();
        for archive in archives {
            if let Some(report) = self.pack(archive)? {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    /// Pack a single archive; `None` if it has no assets
    pub fn pack(&self, mut archive: Archive) -> Result<Option<PackReport>> {
        if archive.assets.is_empty() {
            warn!(
                archive = %archive.path.display(),
                extras = archive.extras.len(),
                "Archive has no meshes, skipping"
            );
            return Ok(None);
        }

        info!(
            archive = %archive.path.display(),
            assets = archive.assets.len(),
            "Packing archive"
        );

        let shared = mark_shared_textures(&mut archive)?;
        debug!(shared, "Shared texture scan complete");

        let Archive {
            assets,
            shared_textures,
            ..
        } = &mut archive;
        for asset in assets.values_mut() {
            self.prepare_asset(asset, shared_textures)
                .with_context(|| format!("while processing mesh '{}'", asset.name))?;
        }

        let entries = match assemble(&archive) {
            Ok(entries) => entries,
            Err(err) => {
                if fs::remove_file(&archive.path).is_ok() {
                    debug!(archive = %archive.path.display(), "Removed partial archive");
                }
                return Err(err.with_context(format!(
                    "while writing archive '{}'",
                    archive.path.display()
                )));
            }
        };

        info!(
            archive = %archive.path.display(),
            entries = entries.len(),
            "Archive written"
        );

        Ok(Some(PackReport {
            archive: archive.path,
            assets: archive.assets.into_keys().collect(),
            shared_textures: archive.shared_textures.into_iter().collect(),
            extras: archive.extras.into_keys().collect(),
            entries,
        }))
    }

    /// Rewrite an asset's inputs and convert its mesh
    fn prepare_asset(
        &self,
        asset: &mut Asset,
        shared_textures: &BTreeSet<PathBuf>,
    ) -> Result<()> {
        info!(
            asset = %asset.name,
            converter = self.converter.name(),
            "Processing mesh"
        );

        let mesh_backup = self.backup_for(&asset.mesh_xml_path);
        let mut fixer = MeshReferenceFixer::new(asset.name.clone());
        fixer.rewrite_file(&asset.mesh_xml_path, mesh_backup.as_deref())?;

        let material_backup = self.backup_for(&asset.material_path);
        let private = {
            let mut rewriter = MaterialRewriter::new(&asset.name, shared_textures);
            rewriter.rewrite_file(&asset.material_path, material_backup.as_deref())?;
            rewriter.into_private_textures()
        };
        asset.textures.extend(private);

        self.converter
            .convert(&asset.mesh_xml_path, &asset.converted_mesh_path())
    }

    fn backup_for(&self, path: &Path) -> Option<PathBuf> {
        self.options
            .keep_originals
            .then(|| naming::backup_path(path))
    }
}

/// Write the archive entries in their fixed order
fn assemble(archive: &Archive) -> Result<Vec<String>> {
    let mut writer = ArchiveWriter::create(&archive.path)?;

    for asset in archive.assets.values() {
        let mesh = asset.converted_mesh_path();
        writer.add_file(&mesh, &naming::base_name(&mesh))?;
        writer.add_file(&asset.material_path, &naming::material_entry_name(&asset.name))?;
        for texture in &asset.textures {
            writer.add_file(texture, &naming::private_texture_entry_name(&asset.name, texture))?;
        }
    }

    for texture in &archive.shared_textures {
        writer.add_file(texture, &naming::shared_texture_entry_name(texture))?;
    }

    for extra in archive.extras.values() {
        writer.add_file(&extra.source_path, &extra.target_path)?;
    }

    writer.finish()
}
