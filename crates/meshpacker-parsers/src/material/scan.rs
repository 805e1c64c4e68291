//! Shared-texture detection

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use meshpacker_core::{naming, Archive, Result, ResultExt};
use tracing::{debug, info};

use super::classify::{classify, MaterialLine};
use crate::traits::read_input;

/// Collects texture references across material files and remembers which
/// absolute paths came up more than once
#[derive(Debug, Default)]
pub struct SharedTextureScan {
    seen: BTreeSet<PathBuf>,
    shared: BTreeSet<PathBuf>,
}

impl SharedTextureScan {
    /// Create an empty scan
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan material text whose textures are relative to `material_dir`
    pub fn scan_str(&mut self, source: &str, material_dir: &Path) {
        for line in source.lines() {
            if let MaterialLine::TextureDecl { path, .. } = classify(line) {
                let absolute = naming::resolve_relative(material_dir, path);
                if self.seen.contains(&absolute) {
                    if self.shared.insert(absolute) {
                        info!(texture = path, "Found shared texture");
                    }
                } else {
                    self.seen.insert(absolute);
                }
            }
        }
    }

    /// Scan one material file
    pub fn scan_file(&mut self, material_path: &Path) -> Result<()> {
        let source = read_input(material_path)?;
        let material_dir = material_path.parent().unwrap_or_else(|| Path::new(""));
        self.scan_str(&source, material_dir);
        Ok(())
    }

    /// Every texture referenced so far
    pub fn seen(&self) -> &BTreeSet<PathBuf> {
        &self.seen
    }

    /// Textures referenced more than once so far
    pub fn shared(&self) -> &BTreeSet<PathBuf> {
        &self.shared
    }

    /// Consume the scan, keeping the shared textures
    pub fn into_shared(self) -> BTreeSet<PathBuf> {
        self.shared
    }
}

/// Scan every asset's material file and record the shared textures on the archive.
///
/// Must complete before any material of the archive is rewritten.
pub fn mark_shared_textures(archive: &mut Archive) -> Result<usize> {
    debug!(archive = %archive.path.display(), "Looking for shared textures");

    let mut scan = SharedTextureScan::new();
    for asset in archive.assets.values() {
        scan.scan_file(&asset.material_path)
            .with_context(|| format!("while scanning textures of mesh '{}'", asset.name))?;
    }

    let shared = scan.into_shared();
    let count = shared.len();
    for texture in shared {
        archive.mark_shared(texture);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = "material Mat/bark.png\n{\n\ttechnique\n\t{\n\t\tpass\n\t\t{\n\
                        \t\t\ttexture_unit\n\t\t\t{\n\t\t\t\ttexture bark.png\n\t\t\t}\n\
                        \t\t\ttexture_unit\n\t\t\t{\n\t\t\t\ttexture ../shared/leaf.png\n\t\t\t}\n\
                        \t\t}\n\t}\n}\n";

    #[test]
    fn test_single_use_is_not_shared() {
        let mut scan = SharedTextureScan::new();
        scan.scan_str(TREE, Path::new("/p/tree"));

        assert_eq!(scan.seen().len(), 2);
        assert!(scan.seen().contains(Path::new("/p/shared/leaf.png")));
        assert!(scan.shared().is_empty());
    }

    #[test]
    fn test_same_absolute_path_from_two_materials_is_shared() {
        let mut scan = SharedTextureScan::new();
        scan.scan_str(TREE, Path::new("/p/tree"));
        scan.scan_str("\t\t\t\ttexture ../shared/leaf.png\n", Path::new("/p/bush"));

        let shared = scan.into_shared();
        assert_eq!(shared.into_iter().collect::<Vec<_>>(), vec![PathBuf::from("/p/shared/leaf.png")]);
    }

    #[test]
    fn test_same_relative_path_in_different_dirs_is_not_shared() {
        let mut scan = SharedTextureScan::new();
        scan.scan_str("texture bark.png\n", Path::new("/p/tree"));
        scan.scan_str("texture bark.png\n", Path::new("/p/oak"));
        assert!(scan.shared().is_empty());
    }

    #[test]
    fn test_repeat_within_one_material_is_shared() {
        let mut scan = SharedTextureScan::new();
        scan.scan_str("texture bark.png\ntexture bark.png\n", Path::new("/p"));
        assert!(scan.shared().contains(Path::new("/p/bark.png")));
    }

    #[test]
    fn test_case_insensitive_keyword() {
        let mut scan = SharedTextureScan::new();
        scan.scan_str("TEXTURE a.png\ntexture a.png\n", Path::new("/p"));
        assert_eq!(scan.shared().len(), 1);
    }
}
