//! Design document model.
//!
//! A design file is a tree of nodes. Only the fields the proxy reasons about are typed
//! (`id`, `name`, `type`, `children`); every other property the service sends is kept in
//! [`DesignDocument::properties`] and written back out unchanged, so callers of the proxy see the
//! same JSON the service produced.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Node type tag (`"type"` on the wire).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Document,
    Canvas,
    Frame,
    Group,
    Section,
    Text,
    Rectangle,
    Ellipse,
    Vector,
    Line,
    Star,
    RegularPolygon,
    BooleanOperation,
    Slice,
    Component,
    ComponentSet,
    Instance,
    /// A type this crate does not know about yet; the raw tag is preserved.
    Other(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Document => "DOCUMENT",
            NodeType::Canvas => "CANVAS",
            NodeType::Frame => "FRAME",
            NodeType::Group => "GROUP",
            NodeType::Section => "SECTION",
            NodeType::Text => "TEXT",
            NodeType::Rectangle => "RECTANGLE",
            NodeType::Ellipse => "ELLIPSE",
            NodeType::Vector => "VECTOR",
            NodeType::Line => "LINE",
            NodeType::Star => "STAR",
            NodeType::RegularPolygon => "REGULAR_POLYGON",
            NodeType::BooleanOperation => "BOOLEAN_OPERATION",
            NodeType::Slice => "SLICE",
            NodeType::Component => "COMPONENT",
            NodeType::ComponentSet => "COMPONENT_SET",
            NodeType::Instance => "INSTANCE",
            NodeType::Other(raw) => raw,
        }
    }
}

impl From<String> for NodeType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "DOCUMENT" => NodeType::Document,
            "CANVAS" => NodeType::Canvas,
            "FRAME" => NodeType::Frame,
            "GROUP" => NodeType::Group,
            "SECTION" => NodeType::Section,
            "TEXT" => NodeType::Text,
            "RECTANGLE" => NodeType::Rectangle,
            "ELLIPSE" => NodeType::Ellipse,
            "VECTOR" => NodeType::Vector,
            "LINE" => NodeType::Line,
            "STAR" => NodeType::Star,
            "REGULAR_POLYGON" => NodeType::RegularPolygon,
            "BOOLEAN_OPERATION" => NodeType::BooleanOperation,
            "SLICE" => NodeType::Slice,
            "COMPONENT" => NodeType::Component,
            "COMPONENT_SET" => NodeType::ComponentSet,
            "INSTANCE" => NodeType::Instance,
            _ => NodeType::Other(raw),
        }
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a design file, together with its subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// `None` for leaf nodes that carry no `children` key at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DesignDocument>>,
    /// Every other property of the node, untouched.
    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl DesignDocument {
    /// Child nodes in document order; empty for leaves.
    pub fn children(&self) -> &[DesignDocument] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Top-level pages, i.e. the `CANVAS` children of a `DOCUMENT` root.
    pub fn pages(&self) -> impl Iterator<Item = PageSummary> + '_ {
        self.children()
            .iter()
            .filter(|child| child.node_type == NodeType::Canvas)
            .map(|page| PageSummary {
                id: page.id.clone(),
                name: page.name.clone(),
            })
    }
}

/// Metadata describing a whole design file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignFileMetadata {
    pub name: String,
    pub last_modified: DateTime<Utc>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl From<DesignFileMetadata> for api_shared::FileMetadataRes {
    fn from(meta: DesignFileMetadata) -> Self {
        api_shared::FileMetadataRes {
            name: meta.name,
            last_modified: meta
                .last_modified
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            version: meta.version,
            thumbnail_url: meta.thumbnail_url,
        }
    }
}

/// Identifier and name of one page of a design file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSummary {
    pub id: String,
    pub name: String,
}

impl From<PageSummary> for api_shared::PageRes {
    fn from(page: PageSummary) -> Self {
        api_shared::PageRes {
            id: page.id,
            name: page.name,
        }
    }
}

/// Body of `GET /files/{key}`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileResponse {
    pub name: String,
    pub last_modified: DateTime<Utc>,
    pub version: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub document: DesignDocument,
}

impl FileResponse {
    pub fn into_parts(self) -> (DesignDocument, DesignFileMetadata) {
        (
            self.document,
            DesignFileMetadata {
                name: self.name,
                last_modified: self.last_modified,
                version: self.version,
                thumbnail_url: self.thumbnail_url,
            },
        )
    }
}

/// Body of `GET /files/{key}/nodes?ids=...`. Unknown IDs map to `null`.
#[derive(Deserialize)]
pub(crate) struct NodesResponse {
    #[serde(default)]
    pub nodes: HashMap<String, Option<NodeEntry>>,
}

#[derive(Deserialize)]
pub(crate) struct NodeEntry {
    pub document: DesignDocument,
}
