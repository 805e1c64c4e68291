//! Naming rules
//!
//! Pure string and path transforms that give every asset its own namespace
//! inside an archive: material names, texture references, archive entry
//! names, backup file names, and lexical path resolution.

use std::path::{Component, Path, PathBuf};

use crate::{BACKUP_PREFIX, SHARED_TEXTURES_DIR};

/// Suffix of a mesh description file
pub const MESH_XML_SUFFIX: &str = ".mesh.xml";

/// Suffix of a material description file
pub const MATERIAL_SUFFIX: &str = ".material";

/// Rewrite an exporter-generated material name into the asset's namespace.
///
/// Exporters embed the texture file name in the material name
/// (`BaseMat/SOLID/TEX/bark.png`); only the final segment is kept and
/// prefixed with the asset name, giving `Tree/bark.png`.
pub fn namespaced_material_name(asset_name: &str, raw_name: &str) -> String {
    let raw_name = raw_name.trim();
    let last = match raw_name.rfind('/') {
        Some(pos) => &raw_name[pos + 1..],
        None => raw_name,
    };
    format!("{asset_name}/{last}")
}

/// Texture reference as written into a rewritten material file
pub fn texture_reference(namespace: &str, relative_path: &str) -> String {
    format!("{namespace}/{relative_path}")
}

/// Sibling path with `prefix` inserted in front of the file name.
///
/// `/data/tree.material` with `orig_` becomes `/data/orig_tree.material`.
pub fn prefixed_sibling(path: &Path, prefix: &str) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let renamed = format!("{prefix}{file_name}");
    match path.parent() {
        Some(parent) => parent.join(renamed),
        None => PathBuf::from(renamed),
    }
}

/// Where the untouched copy of a rewritten input file is kept
pub fn backup_path(path: &Path) -> PathBuf {
    prefixed_sibling(path, BACKUP_PREFIX)
}

/// Whether a file name looks like a backup made by [`backup_path`]
pub fn is_backup(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with(BACKUP_PREFIX))
}

/// Derive an asset name from its mesh description file name.
///
/// `.mesh.xml` is stripped, falling back to `.xml`, then to the plain
/// file stem. Returns `None` when nothing usable is left.
pub fn asset_name_from_mesh_xml(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_string_lossy();
    let name = file_name
        .strip_suffix(MESH_XML_SUFFIX)
        .or_else(|| file_name.strip_suffix(".xml"))
        .map(str::to_string)
        .or_else(|| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))?;

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Binary mesh produced by the converter, next to the mesh description
pub fn converted_mesh_path(mesh_xml_path: &Path, asset_name: &str) -> PathBuf {
    let file_name = format!("{asset_name}.mesh");
    match mesh_xml_path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Archive entry for an asset's rewritten material file
pub fn material_entry_name(asset_name: &str) -> String {
    format!("{asset_name}{MATERIAL_SUFFIX}")
}

/// Archive entry for a texture used by one asset only
pub fn private_texture_entry_name(asset_name: &str, texture_path: &Path) -> String {
    format!("{asset_name}/{}", base_name(texture_path))
}

/// Archive entry for a texture used by several assets
pub fn shared_texture_entry_name(texture_path: &Path) -> String {
    format!("{SHARED_TEXTURES_DIR}/{}", base_name(texture_path))
}

/// Final path component as a string (empty when there is none)
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Resolve `path` against `base_dir` unless it is already absolute.
pub fn resolve_relative(base_dir: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base_dir.join(path))
    }
}

/// Lexically normalize a path
/// - Removes `.` components
/// - Resolves `..` against the preceding component where there is one
///
/// Symlinks are not consulted, so two spellings of the same file compare
/// equal without touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => {
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_namespaced_material_name() {
        assert_eq!(
            namespaced_material_name("Tree", "BaseMat/SOLID/TEX/bark.png"),
            "Tree/bark.png"
        );
        assert_eq!(namespaced_material_name("Tree", "bark.png"), "Tree/bark.png");
        assert_eq!(namespaced_material_name("Tree", "  Mat/leaf.png\n"), "Tree/leaf.png");
    }

    #[test]
    fn test_texture_reference() {
        assert_eq!(texture_reference("Tree", "bark.png"), "Tree/bark.png");
        assert_eq!(
            texture_reference(SHARED_TEXTURES_DIR, "tex/shared.png"),
            "SharedTextures/tex/shared.png"
        );
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("/data/tree.material")),
            PathBuf::from("/data/orig_tree.material")
        );
        assert_eq!(
            backup_path(Path::new("tree.mesh.xml")),
            PathBuf::from("orig_tree.mesh.xml")
        );
        assert!(is_backup(&backup_path(Path::new("/data/tree.material"))));
        assert!(!is_backup(Path::new("/data/tree.material")));
    }

    #[test]
    fn test_asset_name_from_mesh_xml() {
        assert_eq!(
            asset_name_from_mesh_xml(Path::new("/data/tree.mesh.xml")),
            Some("tree".to_string())
        );
        assert_eq!(
            asset_name_from_mesh_xml(Path::new("rock.xml")),
            Some("rock".to_string())
        );
        assert_eq!(
            asset_name_from_mesh_xml(Path::new("/data/bush.mesh")),
            Some("bush".to_string())
        );
        assert_eq!(asset_name_from_mesh_xml(Path::new(".mesh.xml")), None);
    }

    #[test]
    fn test_converted_mesh_path() {
        assert_eq!(
            converted_mesh_path(Path::new("/data/export/tree.mesh.xml"), "Tree"),
            PathBuf::from("/data/export/Tree.mesh")
        );
    }

    #[test]
    fn test_entry_names() {
        assert_eq!(material_entry_name("Tree"), "Tree.material");
        assert_eq!(
            private_texture_entry_name("Tree", Path::new("/data/tex/bark.png")),
            "Tree/bark.png"
        );
        assert_eq!(
            shared_texture_entry_name(Path::new("/data/tex/shared_tex.png")),
            "SharedTextures/shared_tex.png"
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/data/a/../tex/./bark.png")),
            PathBuf::from("/data/tex/bark.png")
        );
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_resolve_relative() {
        let base = Path::new("/proj/assets");
        assert_eq!(
            resolve_relative(base, "tree.material"),
            PathBuf::from("/proj/assets/tree.material")
        );
        assert_eq!(
            resolve_relative(base, "../out.zip"),
            PathBuf::from("/proj/out.zip")
        );
        assert_eq!(
            resolve_relative(base, "/abs/out.zip"),
            PathBuf::from("/abs/out.zip")
        );
    }

    proptest! {
        #[test]
        fn test_material_name_keeps_only_last_segment(
            asset in "[A-Za-z][A-Za-z0-9_]{0,12}",
            prefix in prop::collection::vec("[A-Za-z0-9_.]{1,8}", 0..5),
            last in "[A-Za-z0-9_.]{1,12}",
        ) {
            let mut raw = prefix.join("/");
            if !raw.is_empty() {
                raw.push('/');
            }
            raw.push_str(&last);

            prop_assert_eq!(namespaced_material_name(&asset, &raw), format!("{}/{}", asset, last));
        }
    }
}
