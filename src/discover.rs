//! Single-asset mode input resolution
//!
//! Inputs not given on the command line are looked up in the working
//! directory by file suffix.

use std::fs;
use std::path::{Path, PathBuf};

use meshpacker_core::naming::{self, MATERIAL_SUFFIX, MESH_XML_SUFFIX};
use meshpacker_core::{Archive, Asset, Error, Result};
use tracing::{debug, info};

/// Paths and names supplied on the command line
#[derive(Debug, Default, Clone)]
pub struct SingleAssetArgs {
    pub name: Option<String>,
    pub mesh_xml: Option<PathBuf>,
    pub material: Option<PathBuf>,
    pub archive: Option<PathBuf>,
}

/// Find the only file in `dir` whose name ends with `suffix`.
///
/// `orig_` backups are never candidates.
pub fn find_unique(dir: &Path, suffix: &str, kind: &str) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && !naming::is_backup(path))
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(suffix))
        })
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(Error::InputNotFound {
            kind: kind.to_string(),
        }),
        1 => {
            let found = candidates.remove(0);
            info!(kind, path = %found.display(), "Using discovered input");
            Ok(found)
        }
        _ => Err(Error::AmbiguousInput {
            kind: kind.to_string(),
            candidates,
        }),
    }
}

/// Build the one-asset archive for single-asset mode
pub fn resolve_single_asset(cwd: &Path, args: SingleAssetArgs) -> Result<Archive> {
    let mesh_xml = match args.mesh_xml {
        Some(path) => naming::resolve_relative(cwd, path),
        None => find_unique(cwd, MESH_XML_SUFFIX, "mesh description")?,
    };
    let material = match args.material {
        Some(path) => naming::resolve_relative(cwd, path),
        None => find_unique(cwd, MATERIAL_SUFFIX, "material")?,
    };

    let name = match args.name.filter(|name| !name.is_empty()) {
        Some(name) => name,
        None => naming::asset_name_from_mesh_xml(&mesh_xml).ok_or_else(|| {
            Error::InvalidMeshDescription {
                path: mesh_xml.clone(),
                message: "cannot derive a mesh name from the file name".to_string(),
            }
        })?,
    };

    let archive_path = match args.archive {
        Some(path) => naming::resolve_relative(cwd, path),
        None => cwd.join(format!("{name}.zip")),
    };

    debug!(
        asset = %name,
        mesh_xml = %mesh_xml.display(),
        material = %material.display(),
        archive = %archive_path.display(),
        "Resolved single-asset inputs"
    );

    let mut archive = Archive::new(archive_path);
    archive.add_asset(Asset::new(name, mesh_xml, material));
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_discovers_both_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = touch(dir.path(), "tree.mesh.xml");
        let material = touch(dir.path(), "tree.material");
        touch(dir.path(), "orig_tree.material");
        touch(dir.path(), "notes.txt");

        let archive = resolve_single_asset(dir.path(), SingleAssetArgs::default()).unwrap();

        assert_eq!(archive.path, dir.path().join("tree.zip"));
        let asset = &archive.assets["tree"];
        assert_eq!(asset.mesh_xml_path, mesh);
        assert_eq!(asset.material_path, material);
    }

    #[test]
    fn test_ambiguous_material() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "tree.mesh.xml");
        touch(dir.path(), "a.material");
        touch(dir.path(), "b.material");

        let err = resolve_single_asset(dir.path(), SingleAssetArgs::default()).unwrap_err();
        match err {
            Error::AmbiguousInput { kind, candidates } => {
                assert_eq!(kind, "material");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_mesh_description() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "tree.material");

        let err = resolve_single_asset(dir.path(), SingleAssetArgs::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_explicit_arguments_win() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.material");
        touch(dir.path(), "b.material");

        let args = SingleAssetArgs {
            name: Some("Oak".to_string()),
            mesh_xml: Some(PathBuf::from("models/oak.mesh.xml")),
            material: Some(PathBuf::from("b.material")),
            archive: Some(PathBuf::from("out/oak.zip")),
        };
        let archive = resolve_single_asset(dir.path(), args).unwrap();

        assert_eq!(archive.path, dir.path().join("out/oak.zip"));
        let asset = &archive.assets["Oak"];
        assert_eq!(asset.mesh_xml_path, dir.path().join("models/oak.mesh.xml"));
        assert_eq!(asset.material_path, dir.path().join("b.material"));
    }
}
