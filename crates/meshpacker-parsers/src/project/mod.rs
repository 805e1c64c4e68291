//! Project file parser
//!
//! A project file lists the archives to build:
//!
//! ```text
//! # comment
//! Zip
//!     Path: out/forest.zip
//!     Mesh
//!         Name: Tree
//!         MeshXmlPath: export/tree.mesh.xml
//!         MaterialFilePath: export/tree.material
//!     EndMesh
//!     Extra
//!         SourcePath: docs/readme.txt
//!         TargetPath: readme.txt
//!     EndExtra
//! EndZip
//! ```
//!
//! Blocks nest exactly one level (`Mesh` and `Extra` inside `Zip`). Relative
//! paths are resolved against the directory holding the project file.
//! `Zip` blocks naming the same path are merged. Incomplete records are
//! dropped with a warning; anything structurally wrong aborts the parse.

mod directive;

pub use directive::{parse_directive, BlockKind, Directive};

use std::path::{Path, PathBuf};

use meshpacker_core::{
    naming, Archive, ArchiveCollection, Asset, Error, ExtraFile, Insert, Result,
    DEFAULT_ARCHIVE_NAME,
};
use tracing::{debug, info, warn};

use crate::traits::read_input;

/// Parses project files into the list of archives to build
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectParser;

impl ProjectParser {
    /// Create a new project parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a project file; a relative path is taken from the working directory
    pub fn parse_file(&self, path: &Path) -> Result<Vec<Archive>> {
        let path = if path.is_absolute() {
            naming::normalize_path(path)
        } else {
            naming::resolve_relative(&std::env::current_dir()?, path)
        };

        let source = read_input(&path)?;
        self.parse_str(&source, &path)
    }

    /// Parse project text as if it had been read from `project_path`
    pub fn parse_str(&self, source: &str, project_path: &Path) -> Result<Vec<Archive>> {
        let base_dir = project_path.parent().unwrap_or_else(|| Path::new(""));
        let mut collection = ArchiveCollection::new();
        let mut state = State::AwaitingArchive;
        let mut line_count = 0;

        for (index, raw) in source.lines().enumerate() {
            line_count = index + 1;
            let content = raw.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }

            let line = Line {
                project: project_path,
                base_dir,
                number: index + 1,
                content,
            };
            let directive = parse_directive(content).map_err(|message| line.error(message))?;
            state = state.apply(directive, &line, &mut collection)?;
        }

        if let Some(kind) = state.innermost_block() {
            return Err(Error::malformed(
                project_path,
                line_count,
                "",
                format!("unexpected end of file inside {kind} block"),
            ));
        }

        let (archives, discarded) = collection.finalize();
        for path in discarded {
            warn!(archive = %path.display(), "Discarding Zip record because it's empty");
        }

        info!(
            project = %project_path.display(),
            archives = archives.len(),
            "Parsed project file"
        );
        Ok(archives)
    }
}

/// The line being interpreted, for error reporting and path resolution
struct Line<'a> {
    project: &'a Path,
    base_dir: &'a Path,
    number: usize,
    content: &'a str,
}

impl Line<'_> {
    fn error(&self, message: impl Into<String>) -> Error {
        Error::malformed(self.project, self.number, self.content, message)
    }

    fn path_value(&self, value: &str) -> Option<PathBuf> {
        (!value.is_empty()).then(|| naming::resolve_relative(self.base_dir, value))
    }

    fn text_value(value: &str) -> Option<String> {
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Contents of an open `Zip` block
#[derive(Debug, Default)]
struct ArchiveBlock {
    path: Option<PathBuf>,
    assets: Vec<Asset>,
    extras: Vec<ExtraFile>,
}

impl ArchiveBlock {
    fn finish(self, line: &Line<'_>) -> Archive {
        let path = self
            .path
            .unwrap_or_else(|| line.base_dir.join(DEFAULT_ARCHIVE_NAME));
        let mut archive = Archive::new(path);

        for asset in self.assets {
            let name = asset.name.clone();
            if archive.add_asset(asset) == Insert::Conflict {
                warn!(
                    line = line.number,
                    asset = %name,
                    "Discarding mesh record because another mesh in this Zip block has the same name"
                );
            }
        }
        for extra in self.extras {
            let target = extra.target_path.clone();
            if archive.add_extra(extra) == Insert::Conflict {
                warn!(
                    line = line.number,
                    target = %target,
                    "Discarding extra-file record because its target path is already taken"
                );
            }
        }
        archive
    }
}

/// Contents of an open `Mesh` block
#[derive(Debug)]
struct AssetBlock {
    opened_at: usize,
    name: Option<String>,
    mesh_xml_path: Option<PathBuf>,
    material_path: Option<PathBuf>,
}

impl AssetBlock {
    fn new(opened_at: usize) -> Self {
        Self {
            opened_at,
            name: None,
            mesh_xml_path: None,
            material_path: None,
        }
    }

    fn finish(self) -> Option<Asset> {
        let (Some(mesh_xml_path), Some(material_path)) = (self.mesh_xml_path, self.material_path)
        else {
            warn!(
                line = self.opened_at,
                name = self.name.as_deref().unwrap_or(""),
                "Discarding mesh record because .mesh.xml file path or .material file path is not set"
            );
            return None;
        };

        let Some(name) = self
            .name
            .or_else(|| naming::asset_name_from_mesh_xml(&mesh_xml_path))
        else {
            warn!(
                line = self.opened_at,
                mesh_xml = %mesh_xml_path.display(),
                "Discarding mesh record because no name could be derived"
            );
            return None;
        };

        Some(Asset::new(name, mesh_xml_path, material_path))
    }
}

/// Contents of an open `Extra` block
#[derive(Debug)]
struct ExtraBlock {
    opened_at: usize,
    source_path: Option<PathBuf>,
    target_path: Option<String>,
}

impl ExtraBlock {
    fn new(opened_at: usize) -> Self {
        Self {
            opened_at,
            source_path: None,
            target_path: None,
        }
    }

    fn finish(self) -> Option<ExtraFile> {
        match self.source_path {
            Some(source) => Some(ExtraFile::new(source, self.target_path)),
            None => {
                warn!(
                    line = self.opened_at,
                    "Discarding extra-file record because it has no source path"
                );
                None
            }
        }
    }
}

/// Which blocks are open
#[derive(Debug)]
enum State {
    AwaitingArchive,
    InArchive(ArchiveBlock),
    InAsset(ArchiveBlock, AssetBlock),
    InExtra(ArchiveBlock, ExtraBlock),
}

impl State {
    fn innermost_block(&self) -> Option<BlockKind> {
        match self {
            State::AwaitingArchive => None,
            State::InArchive(_) => Some(BlockKind::Zip),
            State::InAsset(..) => Some(BlockKind::Mesh),
            State::InExtra(..) => Some(BlockKind::Extra),
        }
    }

    fn apply(
        self,
        directive: Directive<'_>,
        line: &Line<'_>,
        collection: &mut ArchiveCollection,
    ) -> Result<State> {
        match (self, directive) {
            // Block transitions
            (State::AwaitingArchive, Directive::Open(BlockKind::Zip)) => {
                debug!(line = line.number, "Zip block opened");
                Ok(State::InArchive(ArchiveBlock::default()))
            }
            (State::InArchive(archive), Directive::Open(BlockKind::Mesh)) => {
                Ok(State::InAsset(archive, AssetBlock::new(line.number)))
            }
            (State::InArchive(archive), Directive::Open(BlockKind::Extra)) => {
                Ok(State::InExtra(archive, ExtraBlock::new(line.number)))
            }
            (State::InArchive(archive), Directive::Close(BlockKind::Zip)) => {
                let archive = archive.finish(line);
                debug!(line = line.number, archive = %archive.path.display(), "Zip block closed");
                for conflict in collection.insert_or_merge(archive) {
                    warn!(line = line.number, "Discarding {conflict} because a merged Zip block already defines it");
                }
                Ok(State::AwaitingArchive)
            }
            (State::InAsset(mut archive, asset), Directive::Close(BlockKind::Mesh)) => {
                archive.assets.extend(asset.finish());
                Ok(State::InArchive(archive))
            }
            (State::InExtra(mut archive, extra), Directive::Close(BlockKind::Extra)) => {
                archive.extras.extend(extra.finish());
                Ok(State::InArchive(archive))
            }

            // Settings
            (State::InArchive(mut archive), Directive::Setting { key, value }) => {
                if check_owner(BlockKind::Zip, key, line)? {
                    archive.path = line.path_value(value);
                }
                Ok(State::InArchive(archive))
            }
            (State::InAsset(archive, mut asset), Directive::Setting { key, value }) => {
                if check_owner(BlockKind::Mesh, key, line)? {
                    match key {
                        "Name" => asset.name = Line::text_value(value),
                        "MeshXmlPath" => asset.mesh_xml_path = line.path_value(value),
                        _ => asset.material_path = line.path_value(value),
                    }
                }
                Ok(State::InAsset(archive, asset))
            }
            (State::InExtra(archive, mut extra), Directive::Setting { key, value }) => {
                if check_owner(BlockKind::Extra, key, line)? {
                    match key {
                        "SourcePath" => extra.source_path = line.path_value(value),
                        _ => extra.target_path = Line::text_value(value),
                    }
                }
                Ok(State::InExtra(archive, extra))
            }

            // Everything else is out of place
            (State::AwaitingArchive, Directive::Setting { .. }) => {
                Err(line.error("directive not valid outside of a Zip block"))
            }
            (state, Directive::Open(kind)) => Err(line.error(match state.innermost_block() {
                Some(open) => format!("can't open a {kind} block inside an open {open} block"),
                None => format!("a {kind} block must be inside a Zip block"),
            })),
            (state, Directive::Close(kind)) => Err(line.error(match state.innermost_block() {
                Some(open) => format!("End{kind} doesn't close the open {open} block"),
                None => format!("End{kind} without an open {kind} block"),
            })),
        }
    }
}

/// Whether `key` is a setting of `block`; known keys of other blocks are errors
fn check_owner(block: BlockKind, key: &str, line: &Line<'_>) -> Result<bool> {
    match BlockKind::of_setting(key) {
        Some(owner) if owner == block => Ok(true),
        Some(owner) => Err(line.error(format!(
            "directive '{key}' belongs in a {owner} block, not a {block} block"
        ))),
        None => {
            warn!(line = line.number, key, "Ignoring unknown directive");
            Ok(false)
        }
    }
}
