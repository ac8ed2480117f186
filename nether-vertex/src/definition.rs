//! Vertex format definition files
//!
//! A definition lists elements in declaration order, each named by its
//! semantic, plus optional per-target format redirects:
//!
//! ```xml
//! <root>
//!     <elements>
//!         <POSITION> <type> FLOAT3 </type> </POSITION>
//!         <NORMAL> <type> UBYTE4_NORMAL_8_8_8 </type> </NORMAL>
//!         <TEXCOORD> <type> FLOAT2 </type> <stream> 1 </stream> </TEXCOORD>
//!     </elements>
//!     <targets>
//!         <target> <name> D3D9 </name> <format> xyznuv_d3d </format> </target>
//!     </targets>
//! </root>
//! ```
//!
//! Every element field may also be given as an attribute
//! (`<TEXCOORD type="FLOAT2" semanticIndex="1"/>`).

use crate::error::DefinitionError;
use crate::format::VertexFormat;
use crate::registry::{Semantic, StorageType};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Highest stream index a definition may use.
pub const MAX_STREAMS: u32 = 16;

/// Storage type of elements that do not name one.
pub const DEFAULT_STORAGE: &str = "FLOAT3";

fn default_storage() -> String {
    DEFAULT_STORAGE.to_string()
}

/// Parsed format definition, not yet validated against the type registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDefinition {
    #[serde(default)]
    pub elements: Vec<ElementDefinition>,
    #[serde(default)]
    pub targets: Vec<TargetDefinition>,
}

/// One element declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDefinition {
    /// Semantic name (e.g. "TEXCOORD").
    pub semantic: String,
    /// Storage type name (default: FLOAT3).
    #[serde(default = "default_storage")]
    pub storage: String,
    /// Explicit semantic index; the next free index when absent.
    #[serde(default)]
    pub semantic_index: Option<u32>,
    /// Owning stream; the highest stream created so far when absent.
    #[serde(default)]
    pub stream: Option<u32>,
    /// Explicit byte offset; appended at the stream's end when absent.
    #[serde(default)]
    pub offset: Option<u32>,
}

impl ElementDefinition {
    pub fn new(semantic: impl Into<String>, storage: impl Into<String>) -> Self {
        Self {
            semantic: semantic.into(),
            storage: storage.into(),
            semantic_index: None,
            stream: None,
            offset: None,
        }
    }
}

/// Redirect to another format for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDefinition {
    pub name: String,
    pub format: String,
}

impl FormatDefinition {
    /// Parses a definition document.
    pub fn from_xml(text: &str) -> Result<Self, DefinitionError> {
        let doc = Document::parse(text)?;
        let root = doc.root_element();
        let elements = child(root, "elements").ok_or(DefinitionError::MissingElements)?;

        let mut definition = FormatDefinition::default();
        for node in elements.children().filter(Node::is_element) {
            definition.elements.push(ElementDefinition {
                semantic: node.tag_name().name().to_string(),
                storage: value(node, "type").map_or_else(default_storage, str::to_string),
                semantic_index: number(node, "semanticIndex")?,
                stream: number(node, "stream")?,
                offset: number(node, "offset")?,
            });
        }

        if let Some(targets) = child(root, "targets") {
            for node in targets.children().filter(|n| n.has_tag_name("target")) {
                let Some(format) = value(node, "format") else {
                    tracing::warn!("Ignoring target declaration without a format");
                    continue;
                };
                let name = value(node, "name").unwrap_or_default();
                definition.targets.push(TargetDefinition {
                    name: name.to_string(),
                    format: format.to_string(),
                });
            }
        }

        Ok(definition)
    }

    /// Builds the format described by this definition.
    ///
    /// Elements with an unknown semantic are skipped. Unknown storage types
    /// are kept (with size 0) so the rest of the layout stays intact.
    pub fn build(&self, name: &str) -> Result<VertexFormat, DefinitionError> {
        let mut format = VertexFormat::new(name);

        for element in &self.elements {
            let semantic = Semantic::from_name(&element.semantic);
            if semantic == Semantic::Unknown {
                tracing::warn!(
                    format = name,
                    "Skipping element with unknown semantic '{}'",
                    element.semantic
                );
                continue;
            }

            let storage = StorageType::from_name(&element.storage);
            if storage == StorageType::Unknown {
                tracing::warn!(
                    format = name,
                    "Unknown storage type '{}' for {}",
                    element.storage,
                    semantic
                );
            }

            let stream = element
                .stream
                .unwrap_or_else(|| format.stream_count().saturating_sub(1));
            if stream >= MAX_STREAMS {
                return Err(DefinitionError::InvalidNumber {
                    field: "stream",
                    value: stream.to_string(),
                });
            }
            while format.stream_count() <= stream {
                format.add_stream();
            }

            format.add_element_at(
                stream,
                semantic,
                storage,
                element.semantic_index,
                element.offset,
            )?;
        }

        if format.count_elements() == 0 {
            return Err(DefinitionError::NoElements);
        }

        for target in &self.targets {
            format.add_target(target.name.as_str(), target.format.as_str());
        }

        Ok(format)
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

/// Attribute or child element text, trimmed. Empty values count as absent.
fn value<'a>(node: Node<'a, '_>, key: &str) -> Option<&'a str> {
    node.attribute(key)
        .or_else(|| child(node, key).and_then(|n| n.text()))
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn number(node: Node<'_, '_>, key: &'static str) -> Result<Option<u32>, DefinitionError> {
    value(node, key)
        .map(|text| {
            text.parse().map_err(|_| DefinitionError::InvalidNumber {
                field: key,
                value: text.to_string(),
            })
        })
        .transpose()
}
