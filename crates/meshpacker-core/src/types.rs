//! Data model of a packing run
//!
//! An [`ArchiveCollection`] maps output archive paths to [`Archive`]
//! records; each archive owns its [`Asset`]s and [`ExtraFile`]s. All
//! containers are ordered so archive contents come out deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::naming;

/// One mesh-plus-material unit being prepared for packaging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Namespace prefix, unique within an archive
    pub name: String,
    /// Mesh description (`.mesh.xml`) file
    pub mesh_xml_path: PathBuf,
    /// Material description (`.material`) file
    pub material_path: PathBuf,
    /// Absolute paths of textures only this asset uses; filled while rewriting
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub textures: BTreeSet<PathBuf>,
}

impl Asset {
    /// Create an asset with an empty texture set
    pub fn new(
        name: impl Into<String>,
        mesh_xml_path: impl Into<PathBuf>,
        material_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            mesh_xml_path: mesh_xml_path.into(),
            material_path: material_path.into(),
            textures: BTreeSet::new(),
        }
    }

    /// Directory holding the material file; texture paths are relative to it
    pub fn material_dir(&self) -> &Path {
        self.material_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Binary mesh the converter writes for this asset
    pub fn converted_mesh_path(&self) -> PathBuf {
        naming::converted_mesh_path(&self.mesh_xml_path, &self.name)
    }

    /// Whether both records name the same files
    fn same_source(&self, other: &Asset) -> bool {
        self.mesh_xml_path == other.mesh_xml_path && self.material_path == other.material_path
    }
}

/// An arbitrary file copied into an archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraFile {
    /// File on disk
    pub source_path: PathBuf,
    /// Entry name inside the archive
    pub target_path: String,
}

impl ExtraFile {
    /// Create an extra file; an empty target defaults to the source's base name
    pub fn new(source_path: impl Into<PathBuf>, target_path: Option<String>) -> Self {
        let source_path = source_path.into();
        let target_path = target_path
            .filter(|target| !target.is_empty())
            .unwrap_or_else(|| naming::base_name(&source_path));
        Self {
            source_path,
            target_path,
        }
    }
}

/// Outcome of adding a record to an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insert {
    /// The record is new
    Added,
    /// An identical record was already present
    Duplicate,
    /// A different record already uses the same name; the new one was not added
    Conflict,
}

/// One output package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    /// Absolute output path
    pub path: PathBuf,
    /// Assets keyed by name
    pub assets: BTreeMap<String, Asset>,
    /// Extra files keyed by target path
    pub extras: BTreeMap<String, ExtraFile>,
    /// Absolute paths of textures referenced by more than one asset
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub shared_textures: BTreeSet<PathBuf>,
}

impl Archive {
    /// Create an empty archive
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            assets: BTreeMap::new(),
            extras: BTreeMap::new(),
            shared_textures: BTreeSet::new(),
        }
    }

    /// Add an asset unless its name is taken
    pub fn add_asset(&mut self, asset: Asset) -> Insert {
        match self.assets.get(&asset.name) {
            Some(existing) if existing.same_source(&asset) => Insert::Duplicate,
            Some(_) => Insert::Conflict,
            None => {
                self.assets.insert(asset.name.clone(), asset);
                Insert::Added
            }
        }
    }

    /// Add an extra file unless its target is taken
    pub fn add_extra(&mut self, extra: ExtraFile) -> Insert {
        match self.extras.get(&extra.target_path) {
            Some(existing) if existing.source_path == extra.source_path => Insert::Duplicate,
            Some(_) => Insert::Conflict,
            None => {
                self.extras.insert(extra.target_path.clone(), extra);
                Insert::Added
            }
        }
    }

    /// Union another archive's assets and extras into this one.
    ///
    /// Returns the records that clashed with an existing one of the same name.
    pub fn merge(&mut self, other: Archive) -> Vec<String> {
        let mut conflicts = Vec::new();
        for (name, asset) in other.assets {
            if self.add_asset(asset) == Insert::Conflict {
                conflicts.push(format!("asset '{name}'"));
            }
        }
        for (target, extra) in other.extras {
            if self.add_extra(extra) == Insert::Conflict {
                conflicts.push(format!("extra file '{target}'"));
            }
        }
        self.shared_textures.extend(other.shared_textures);
        conflicts
    }

    /// An archive with neither assets nor extras is invalid
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.extras.is_empty()
    }

    /// Record a texture as used by more than one asset
    pub fn mark_shared(&mut self, texture: impl Into<PathBuf>) {
        self.shared_textures.insert(texture.into());
    }

    /// Whether a texture was recorded as shared
    pub fn is_shared(&self, texture: &Path) -> bool {
        self.shared_textures.contains(texture)
    }
}

/// Archives to produce, keyed by absolute output path
#[derive(Debug, Default)]
pub struct ArchiveCollection {
    archives: BTreeMap<PathBuf, Archive>,
}

impl ArchiveCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an archive, merging it into any archive with the same path.
    ///
    /// Returns the merge conflicts, see [`Archive::merge`].
    pub fn insert_or_merge(&mut self, archive: Archive) -> Vec<String> {
        match self.archives.get_mut(&archive.path) {
            Some(existing) => existing.merge(archive),
            None => {
                self.archives.insert(archive.path.clone(), archive);
                Vec::new()
            }
        }
    }

    /// Number of archives
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Whether the collection holds no archives
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// Split into valid archives and the paths of discarded empty ones
    pub fn finalize(self) -> (Vec<Archive>, Vec<PathBuf>) {
        let (valid, empty): (Vec<_>, Vec<_>) = self
            .archives
            .into_values()
            .partition(|archive| !archive.is_empty());
        (valid, empty.into_iter().map(|archive| archive.path).collect())
    }
}
