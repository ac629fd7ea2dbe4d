//! JSON payloads exchanged with callers of the proxy.
//!
//! Field names follow the wire format of the original front end (`fileId`, `nodeId`,
//! `lastModified`, `type`), so existing consumers keep working unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Query string accepted by `GET /api/figma`.
#[derive(Serialize, Deserialize, IntoParams, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DesignQueryParams {
    /// Design file key; falls back to the server's configured default
    pub file_id: Option<String>,
    /// Return only this node (takes precedence over `component`)
    pub node_id: Option<String>,
    /// Case-insensitive substring to search node names for
    pub component: Option<String>,
}

/// Which selection policy produced a [`DesignQueryRes`].
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Node,
    Component,
    File,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadataRes {
    pub name: String,
    /// RFC 3339 timestamp
    pub last_modified: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct DesignQueryRes {
    pub success: bool,
    /// The selected node, component subtree, or whole document
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    #[serde(rename = "type")]
    pub kind: ResultKind,
    /// Echo of the `component` search term, present for component results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// File metadata, present for whole-file results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FileMetadataRes>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchNodesReq {
    #[serde(default)]
    pub file_id: Option<String>,
    pub ids: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct BatchNodesRes {
    pub success: bool,
    /// Resolved nodes keyed by node ID; IDs the service did not resolve are omitted
    #[schema(value_type = Object)]
    pub nodes: BTreeMap<String, serde_json::Value>,
}

/// Query string accepted by `GET /api/figma/pages`.
#[derive(Serialize, Deserialize, IntoParams, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PagesParams {
    pub file_id: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct PageRes {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct ListPagesRes {
    pub success: bool,
    pub pages: Vec<PageRes>,
}

/// Error payload returned by every endpoint on failure.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct ErrorRes {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_res_uses_front_end_field_names() {
        let res = DesignQueryRes {
            success: true,
            data: json!({"id": "2"}),
            kind: ResultKind::Component,
            filter: Some("button".into()),
            metadata: None,
        };
        let value = serde_json::to_value(&res).unwrap();
        assert_eq!(
            value,
            json!({"success": true, "data": {"id": "2"}, "type": "component", "filter": "button"})
        );
    }

    #[test]
    fn query_params_read_camel_case_keys() {
        let params: DesignQueryParams =
            serde_json::from_value(json!({"fileId": "abc", "nodeId": "1:2"})).unwrap();
        assert_eq!(params.file_id.as_deref(), Some("abc"));
        assert_eq!(params.node_id.as_deref(), Some("1:2"));
        assert_eq!(params.component, None);
    }

    #[test]
    fn error_res_omits_missing_details() {
        let res = ErrorRes {
            error: "Node not found".into(),
            details: None,
        };
        assert_eq!(
            serde_json::to_string(&res).unwrap(),
            r#"{"error":"Node not found"}"#
        );
    }
}
