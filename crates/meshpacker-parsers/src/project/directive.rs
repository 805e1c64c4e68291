//! Project file line tokenizer
//!
//! Turns one trimmed, non-empty, non-comment project line into a
//! [`Directive`]. Interpreting the directive is the parser's job.

use std::fmt;

/// The three block kinds of the project grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// `Zip` … `EndZip`: one output archive
    Zip,
    /// `Mesh` … `EndMesh`: one asset, nested in a `Zip` block
    Mesh,
    /// `Extra` … `EndExtra`: one extra file, nested in a `Zip` block
    Extra,
}

impl BlockKind {
    /// Block that owns a `key: value` setting, if the key is known
    pub fn of_setting(key: &str) -> Option<Self> {
        match key {
            "Path" => Some(BlockKind::Zip),
            "Name" | "MaterialFilePath" | "MeshXmlPath" => Some(BlockKind::Mesh),
            "SourcePath" | "TargetPath" => Some(BlockKind::Extra),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Zip => "Zip",
            BlockKind::Mesh => "Mesh",
            BlockKind::Extra => "Extra",
        };
        f.write_str(name)
    }
}

/// One line of a project file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `Zip`, `Mesh` or `Extra`
    Open(BlockKind),
    /// `EndZip`, `EndMesh` or `EndExtra`
    Close(BlockKind),
    /// `key: value`
    Setting { key: &'a str, value: &'a str },
}

/// Tokenize a trimmed project line.
///
/// A setting's value is the text after the last space following the colon,
/// so values cannot contain spaces. An empty value is returned as `""`.
pub fn parse_directive(line: &str) -> Result<Directive<'_>, &'static str> {
    match line {
        "Zip" => return Ok(Directive::Open(BlockKind::Zip)),
        "EndZip" => return Ok(Directive::Close(BlockKind::Zip)),
        "Mesh" => return Ok(Directive::Open(BlockKind::Mesh)),
        "EndMesh" => return Ok(Directive::Close(BlockKind::Mesh)),
        "Extra" => return Ok(Directive::Open(BlockKind::Extra)),
        "EndExtra" => return Ok(Directive::Close(BlockKind::Extra)),
        _ => {}
    }

    let (key, rest) = line
        .split_once(':')
        .ok_or("can't parse directive - missing colon")?;
    let key = key.trim();
    if key.is_empty() {
        return Err("can't parse directive - missing name before colon");
    }

    let value = rest.rsplit(' ').next().unwrap_or_default().trim();
    Ok(Directive::Setting { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_keywords() {
        assert_eq!(parse_directive("Zip"), Ok(Directive::Open(BlockKind::Zip)));
        assert_eq!(parse_directive("EndMesh"), Ok(Directive::Close(BlockKind::Mesh)));
        assert_eq!(parse_directive("Extra"), Ok(Directive::Open(BlockKind::Extra)));
    }

    #[test]
    fn test_setting_value_after_last_space() {
        assert_eq!(
            parse_directive("Path: out/trees.zip"),
            Ok(Directive::Setting { key: "Path", value: "out/trees.zip" })
        );
        assert_eq!(
            parse_directive("Name:   Tree"),
            Ok(Directive::Setting { key: "Name", value: "Tree" })
        );
        assert_eq!(
            parse_directive("Name: Big Tree"),
            Ok(Directive::Setting { key: "Name", value: "Tree" })
        );
        assert_eq!(
            parse_directive("MeshXmlPath:tree.mesh.xml"),
            Ok(Directive::Setting { key: "MeshXmlPath", value: "tree.mesh.xml" })
        );
    }

    #[test]
    fn test_setting_keeps_colons_in_value() {
        assert_eq!(
            parse_directive(r"SourcePath: C:\data\readme.txt"),
            Ok(Directive::Setting { key: "SourcePath", value: r"C:\data\readme.txt" })
        );
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(
            parse_directive("Name:"),
            Ok(Directive::Setting { key: "Name", value: "" })
        );
    }

    #[test]
    fn test_missing_colon() {
        assert!(parse_directive("Name Tree").is_err());
        assert!(parse_directive(": value").is_err());
    }

    #[test]
    fn test_setting_owner() {
        assert_eq!(BlockKind::of_setting("Path"), Some(BlockKind::Zip));
        assert_eq!(BlockKind::of_setting("MeshXmlPath"), Some(BlockKind::Mesh));
        assert_eq!(BlockKind::of_setting("TargetPath"), Some(BlockKind::Extra));
        assert_eq!(BlockKind::of_setting("Colour"), None);
    }
}
