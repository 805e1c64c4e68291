//! Material line classifier

/// One line of a material script, by the role it plays in rewriting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialLine<'a> {
    /// `material <name>`, optionally followed by `{`
    MaterialDecl {
        indent: &'a str,
        keyword: &'a str,
        name: &'a str,
        opens_block: bool,
    },
    /// `pass` header
    PassOpen,
    /// `texture_unit` header
    TextureUnitOpen,
    /// `texture <path> [args...]`
    TextureDecl {
        indent: &'a str,
        keyword: &'a str,
        path: &'a str,
        /// Everything after the path, leading whitespace included
        trailing: &'a str,
    },
    /// A line starting with `}`
    BlockClose { indent_tabs: usize },
    /// Anything else: comments, parameters, braces, blank lines
    Other,
}

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Split a line into its content and its terminator (`"\r\n"`, `"\n"` or `""`)
pub fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Classify a line (without its terminator).
///
/// Only the first word decides the category, compared case-insensitively,
/// so keywords mentioned inside comments or values are never picked up.
/// A byte-order mark in front of the first line counts as indentation.
pub fn classify(line: &str) -> MaterialLine<'_> {
    let body = line.trim_start_matches(|c: char| c.is_whitespace() || c == BYTE_ORDER_MARK);
    let indent = &line[..line.len() - body.len()];
    let body = body.trim_end();

    if body.starts_with('}') {
        return MaterialLine::BlockClose {
            indent_tabs: indent.matches('\t').count(),
        };
    }

    let keyword_len = body
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(body.len());
    let (keyword, rest) = body.split_at(keyword_len);

    if keyword.eq_ignore_ascii_case("material") {
        let rest = rest.trim();
        let (name, opens_block) = match rest.strip_suffix('{') {
            Some(name) => (name.trim_end(), true),
            None => (rest, false),
        };
        if name.is_empty() {
            return MaterialLine::Other;
        }
        MaterialLine::MaterialDecl {
            indent,
            keyword,
            name,
            opens_block,
        }
    } else if keyword.eq_ignore_ascii_case("pass") {
        MaterialLine::PassOpen
    } else if keyword.eq_ignore_ascii_case("texture_unit") {
        MaterialLine::TextureUnitOpen
    } else if keyword.eq_ignore_ascii_case("texture") {
        let args = rest.trim_start();
        let path_len = args.find(char::is_whitespace).unwrap_or(args.len());
        if path_len == 0 {
            return MaterialLine::Other;
        }
        let (path, trailing) = args.split_at(path_len);
        MaterialLine::TextureDecl {
            indent,
            keyword,
            path,
            trailing,
        }
    } else {
        MaterialLine::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_decl() {
        assert_eq!(
            classify("material BaseMat/SOLID/TEX/bark.png"),
            MaterialLine::MaterialDecl {
                indent: "",
                keyword: "material",
                name: "BaseMat/SOLID/TEX/bark.png",
                opens_block: false,
            }
        );
        assert_eq!(
            classify("material Mat/leaf.png {"),
            MaterialLine::MaterialDecl {
                indent: "",
                keyword: "material",
                name: "Mat/leaf.png",
                opens_block: true,
            }
        );
    }

    #[test]
    fn test_material_decl_after_byte_order_mark() {
        assert_eq!(
            classify("\u{feff}material BaseMat/SOLID/TEX/bark.png"),
            MaterialLine::MaterialDecl {
                indent: "\u{feff}",
                keyword: "material",
                name: "BaseMat/SOLID/TEX/bark.png",
                opens_block: false,
            }
        );
    }

    #[test]
    fn test_block_headers() {
        assert_eq!(classify("\t\tpass"), MaterialLine::PassOpen);
        assert_eq!(classify("\t\tpass {"), MaterialLine::PassOpen);
        assert_eq!(classify("\t\t\ttexture_unit"), MaterialLine::TextureUnitOpen);
        assert_eq!(classify("\t\t\ttexture_unit{"), MaterialLine::TextureUnitOpen);
    }

    #[test]
    fn test_texture_decl() {
        assert_eq!(
            classify("\t\t\t\ttexture bark.png"),
            MaterialLine::TextureDecl {
                indent: "\t\t\t\t",
                keyword: "texture",
                path: "bark.png",
                trailing: "",
            }
        );
        assert_eq!(
            classify("    Texture tex/leaf_alpha.png 2d"),
            MaterialLine::TextureDecl {
                indent: "    ",
                keyword: "Texture",
                path: "tex/leaf_alpha.png",
                trailing: " 2d",
            }
        );
    }

    #[test]
    fn test_block_close() {
        assert_eq!(classify("\t\t}"), MaterialLine::BlockClose { indent_tabs: 2 });
        assert_eq!(classify("}"), MaterialLine::BlockClose { indent_tabs: 0 });
        assert_eq!(classify("}  // end"), MaterialLine::BlockClose { indent_tabs: 0 });
    }

    #[test]
    fn test_other_lines() {
        assert_eq!(classify("\t\t\tdiffuse 1 1 1 1"), MaterialLine::Other);
        assert_eq!(classify("// texture from the material pass"), MaterialLine::Other);
        assert_eq!(classify("\ttechnique"), MaterialLine::Other);
        assert_eq!(classify("{"), MaterialLine::Other);
        assert_eq!(classify(""), MaterialLine::Other);
        assert_eq!(classify("texture"), MaterialLine::Other);
        assert_eq!(classify("texture_coord_set 0"), MaterialLine::Other);
    }

    #[test]
    fn test_split_line_ending() {
        assert_eq!(split_line_ending("pass\r\n"), ("pass", "\r\n"));
        assert_eq!(split_line_ending("pass\n"), ("pass", "\n"));
        assert_eq!(split_line_ending("pass"), ("pass", ""));
    }
}
