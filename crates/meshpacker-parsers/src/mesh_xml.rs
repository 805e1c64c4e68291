//! Mesh description rewriting
//!
//! Moves the `material` attribute of every `submesh` element into the
//! asset's namespace. The document is streamed through `quick-xml` event by
//! event, so everything except the rewritten attributes is written back
//! exactly as it was read.

use std::path::Path;

use meshpacker_core::{naming, Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use tracing::debug;

use crate::traits::InPlaceRewriter;

const SUBMESH: &[u8] = b"submesh";
const MATERIAL: &[u8] = b"material";

/// Rewrites the submesh material references of one asset's mesh description
#[derive(Debug, Clone)]
pub struct MeshReferenceFixer {
    asset_name: String,
    rewritten: usize,
}

impl MeshReferenceFixer {
    /// Create a fixer for `asset_name`
    pub fn new(asset_name: impl Into<String>) -> Self {
        Self {
            asset_name: asset_name.into(),
            rewritten: 0,
        }
    }

    /// Number of submesh elements rewritten so far
    pub fn rewritten(&self) -> usize {
        self.rewritten
    }

    /// Rebuild a `submesh` element with its material rewritten; `None` if it has none
    fn rewrite_submesh(
        &mut self,
        element: &BytesStart<'_>,
    ) -> std::result::Result<Option<BytesStart<'static>>, String> {
        let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        let mut rewritten = BytesStart::new(name);
        let mut found = false;

        for attribute in element.attributes() {
            let attribute = attribute.map_err(|e| e.to_string())?;
            if attribute.key.as_ref() == MATERIAL {
                let raw = attribute.unescape_value().map_err(|e| e.to_string())?;
                let material = naming::namespaced_material_name(&self.asset_name, &raw);
                rewritten.push_attribute(("material", material.as_str()));
                found = true;
            } else {
                let key = std::str::from_utf8(attribute.key.as_ref()).map_err(|e| e.to_string())?;
                let value = attribute.unescape_value().map_err(|e| e.to_string())?;
                rewritten.push_attribute((key, value.as_ref()));
            }
        }

        if found {
            self.rewritten += 1;
            Ok(Some(rewritten))
        } else {
            Ok(None)
        }
    }
}

impl InPlaceRewriter for MeshReferenceFixer {
    fn name(&self) -> &str {
        "mesh-xml"
    }

    fn rewrite_str(&mut self, source: &str, origin: &Path) -> Result<String> {
        let invalid = |position: u64, message: String| Error::InvalidMeshDescription {
            path: origin.to_path_buf(),
            message: format!("{message} (at byte {position})"),
        };

        let mut reader = Reader::from_str(source);
        let mut writer = Writer::new(Vec::with_capacity(source.len()));

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader
                .read_event()
                .map_err(|e| invalid(position, e.to_string()))?;

            let written = match event {
                Event::Eof => break,
                Event::Start(element) if element.name().as_ref() == SUBMESH => {
                    match self
                        .rewrite_submesh(&element)
                        .map_err(|message| invalid(position, message))?
                    {
                        Some(rewritten) => writer.write_event(Event::Start(rewritten)),
                        None => writer.write_event(Event::Start(element)),
                    }
                }
                Event::Empty(element) if element.name().as_ref() == SUBMESH => {
                    match self
                        .rewrite_submesh(&element)
                        .map_err(|message| invalid(position, message))?
                    {
                        Some(rewritten) => writer.write_event(Event::Empty(rewritten)),
                        None => writer.write_event(Event::Empty(element)),
                    }
                }
                other => writer.write_event(other),
            };
            written.map_err(|e| invalid(position, e.to_string()))?;
        }

        debug!(
            asset = %self.asset_name,
            submeshes = self.rewritten,
            "Fixed submesh material references"
        );

        String::from_utf8(writer.into_inner())
            .map_err(|e| invalid(source.len() as u64, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESH: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<mesh>
    <submeshes>
        <submesh material="BaseMat/SOLID/TEX/bark.png" usesharedvertices="false">
            <faces count="1">
                <face v1="0" v2="1" v3="2" />
            </faces>
        </submesh>
        <submesh material="Mat/leaf_alpha.png" use32bitindexes="false" />
        <submesh usesharedvertices="true" />
    </submeshes>
</mesh>
"#;

    fn fix(source: &str) -> Result<(String, usize)> {
        let mut fixer = MeshReferenceFixer::new("Tree");
        let output = fixer.rewrite_str(source, Path::new("/p/tree.mesh.xml"))?;
        Ok((output, fixer.rewritten()))
    }

    #[test]
    fn test_submesh_materials_are_namespaced() {
        let (output, count) = fix(MESH).unwrap();

        assert_eq!(count, 2);
        assert!(output.contains(r#"<submesh material="Tree/bark.png" usesharedvertices="false">"#));
        assert!(output.contains(r#"<submesh material="Tree/leaf_alpha.png" use32bitindexes="false"/>"#));
        assert!(output.contains(r#"<submesh usesharedvertices="true" />"#));
    }

    #[test]
    fn test_rest_of_document_is_preserved() {
        let (output, _) = fix(MESH).unwrap();

        assert!(output.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(output.contains("<faces count=\"1\">\n"));
        assert!(output.contains("</submeshes>\n</mesh>\n"));
    }

    #[test]
    fn test_escaped_material_name() {
        let (output, _) = fix(r#"<mesh><submesh material="A&amp;B/rock.png"/></mesh>"#).unwrap();
        assert_eq!(output, r#"<mesh><submesh material="Tree/rock.png"/></mesh>"#);
    }

    #[test]
    fn test_single_quoted_attribute_is_reescaped() {
        let (output, _) =
            fix(r#"<mesh><submesh material="Mat/bark.png" name='a"b &amp; c'/></mesh>"#).unwrap();
        assert_eq!(
            output,
            r#"<mesh><submesh material="Tree/bark.png" name="a&quot;b &amp; c"/></mesh>"#
        );
    }

    #[test]
    fn test_document_without_submeshes_is_unchanged() {
        let source = "<mesh>\n  <sharedgeometry vertexcount=\"0\"/>\n</mesh>";
        let (output, count) = fix(source).unwrap();
        assert_eq!(count, 0);
        assert_eq!(output, "<mesh>\n  <sharedgeometry vertexcount=\"0\"/>\n</mesh>");
    }

    #[test]
    fn test_mismatched_tags_are_rejected() {
        let err = fix("<mesh><submeshes></mesh>").unwrap_err();
        assert!(err.is_parse_error());
        assert!(err.to_string().contains("tree.mesh.xml"));
    }
}
