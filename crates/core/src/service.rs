//! Query resolution on top of [`FigmaClient`].
//!
//! A [`DesignQuery`] carries raw, optional inputs exactly as a caller supplied them (HTTP query
//! string, CLI flags). `DesignService` validates them, picks one selection policy and returns a
//! [`QueryOutcome`]. Selection precedence:
//!
//! 1. `node_id` present: targeted node fetch, [`QueryOutcome::Node`], or
//!    [`DesignError::NotFound`] when the service does not resolve the ID.
//! 2. else `component` present and matched in the whole file: [`QueryOutcome::Component`].
//! 3. else the whole file with metadata: [`QueryOutcome::File`]. A component search that finds
//!    nothing lands here too.

use crate::client::FigmaClient;
use crate::config::FigmaConfig;
use crate::document::{DesignDocument, DesignFileMetadata, PageSummary};
use crate::search::find_component_by_name;
use crate::{DesignError, DesignResult, FileKey, NodeId};
use api_shared::{BatchNodesRes, DesignQueryRes, ResultKind};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Raw query inputs. Blank strings count as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DesignQuery {
    pub file_key: Option<String>,
    pub node_id: Option<String>,
    pub component: Option<String>,
}

impl From<api_shared::DesignQueryParams> for DesignQuery {
    fn from(params: api_shared::DesignQueryParams) -> Self {
        Self {
            file_key: params.file_id,
            node_id: params.node_id,
            component: params.component,
        }
    }
}

/// The single selection policy applied to one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeQuery {
    ById(NodeId),
    BySubstring(String),
    None,
}

impl DesignQuery {
    /// Decide which policy applies. `node_id` wins over `component`.
    ///
    /// # Errors
    /// Returns `DesignError::InvalidInput` if `node_id` is present but malformed.
    pub fn node_query(&self) -> DesignResult<NodeQuery> {
        if let Some(raw) = present(self.node_id.as_deref()) {
            let id = NodeId::new(raw)
                .map_err(|e| DesignError::InvalidInput(format!("nodeId '{raw}': {e}")))?;
            return Ok(NodeQuery::ById(id));
        }
        if let Some(needle) = present(self.component.as_deref()) {
            return Ok(NodeQuery::BySubstring(needle.to_string()));
        }
        Ok(NodeQuery::None)
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, PartialEq)]
pub enum QueryOutcome {
    Node {
        node_id: NodeId,
        document: DesignDocument,
    },
    Component {
        filter: String,
        document: DesignDocument,
    },
    File {
        document: DesignDocument,
        metadata: DesignFileMetadata,
    },
}

impl QueryOutcome {
    pub fn kind(&self) -> ResultKind {
        match self {
            QueryOutcome::Node { .. } => ResultKind::Node,
            QueryOutcome::Component { .. } => ResultKind::Component,
            QueryOutcome::File { .. } => ResultKind::File,
        }
    }

    pub fn document(&self) -> &DesignDocument {
        match self {
            QueryOutcome::Node { document, .. }
            | QueryOutcome::Component { document, .. }
            | QueryOutcome::File { document, .. } => document,
        }
    }

    /// Convert into the JSON payload shared by the REST API and the CLI.
    pub fn into_response(self) -> DesignResult<DesignQueryRes> {
        let kind = self.kind();
        let (document, filter, metadata) = match self {
            QueryOutcome::Node { document, .. } => (document, None, None),
            QueryOutcome::Component { filter, document } => (document, Some(filter), None),
            QueryOutcome::File { document, metadata } => {
                (document, None, Some(metadata.into()))
            }
        };
        Ok(DesignQueryRes {
            success: true,
            data: serde_json::to_value(document).map_err(DesignError::Serialization)?,
            kind,
            filter,
            metadata,
        })
    }
}

/// Convert a batch result into the shared JSON payload.
pub fn batch_response(nodes: BTreeMap<String, DesignDocument>) -> DesignResult<BatchNodesRes> {
    let nodes = nodes
        .into_iter()
        .map(|(id, doc)| {
            serde_json::to_value(doc)
                .map(|value| (id, value))
                .map_err(DesignError::Serialization)
        })
        .collect::<DesignResult<BTreeMap<_, _>>>()?;
    Ok(BatchNodesRes {
        success: true,
        nodes,
    })
}

/// Stateless query service; cheap to clone and share across request handlers.
#[derive(Clone, Debug)]
pub struct DesignService {
    client: FigmaClient,
}

impl DesignService {
    pub fn new(cfg: Arc<FigmaConfig>) -> DesignResult<Self> {
        Ok(Self {
            client: FigmaClient::new(cfg)?,
        })
    }

    pub fn client(&self) -> &FigmaClient {
        &self.client
    }

    /// Resolve the file key for a request: the caller's value, else the configured default.
    ///
    /// # Errors
    /// - `DesignError::Config` when neither is available.
    /// - `DesignError::InvalidInput` when the caller's value is malformed.
    pub fn resolve_file_key(&self, requested: Option<&str>) -> DesignResult<FileKey> {
        match present(requested) {
            Some(raw) => FileKey::new(raw)
                .map_err(|e| DesignError::InvalidInput(format!("fileId '{raw}': {e}"))),
            None => self.client.config().default_file_key().cloned().ok_or_else(|| {
                DesignError::Config(format!(
                    "no file key supplied and {} is not set",
                    crate::constants::ENV_FILE_KEY
                ))
            }),
        }
    }

    /// Resolve one query against the design-file service.
    pub async fn query(&self, query: DesignQuery) -> DesignResult<QueryOutcome> {
        // Validate everything before any network call.
        let file_key = self.resolve_file_key(query.file_key.as_deref())?;
        let node_query = query.node_query()?;

        match node_query {
            NodeQuery::ById(node_id) => {
                match self.client.fetch_node(&file_key, &node_id).await? {
                    Some(document) => Ok(QueryOutcome::Node { node_id, document }),
                    None => Err(DesignError::NotFound(format!(
                        "node {node_id} in file {file_key}"
                    ))),
                }
            }
            NodeQuery::BySubstring(filter) => {
                let (root, metadata) = self.client.fetch_whole_file(&file_key).await?;
                if let Some(found) = find_component_by_name(&root, &filter) {
                    tracing::debug!("component '{}' matched node {}", filter, found.id);
                    return Ok(QueryOutcome::Component {
                        document: found.clone(),
                        filter,
                    });
                }
                tracing::debug!("component '{}' not found, returning whole file", filter);
                Ok(QueryOutcome::File {
                    document: root,
                    metadata,
                })
            }
            NodeQuery::None => {
                let (document, metadata) = self.client.fetch_whole_file(&file_key).await?;
                Ok(QueryOutcome::File { document, metadata })
            }
        }
    }

    /// Batch variant: fetch several nodes by ID in one request.
    pub async fn query_nodes(
        &self,
        file_key: Option<&str>,
        ids: &[String],
    ) -> DesignResult<BTreeMap<String, DesignDocument>> {
        let file_key = self.resolve_file_key(file_key)?;
        let node_ids = ids
            .iter()
            .map(|raw| {
                NodeId::new(raw).map_err(|e| DesignError::InvalidInput(format!("id '{raw}': {e}")))
            })
            .collect::<DesignResult<Vec<_>>>()?;
        self.client.fetch_nodes(&file_key, &node_ids).await
    }

    pub async fn list_pages(&self, file_key: Option<&str>) -> DesignResult<Vec<PageSummary>> {
        let file_key = self.resolve_file_key(file_key)?;
        self.client.list_pages(&file_key).await
    }
}
