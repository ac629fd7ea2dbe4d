//! HTTP client for the design-file REST API.
//!
//! Each method issues exactly one request and awaits it; there are no retries and no caching.
//! Non-success statuses, transport failures, timeouts and undecodable bodies all surface as
//! [`DesignError::Upstream`].

use crate::config::{AuthScheme, FigmaConfig};
use crate::constants::{FIGMA_TOKEN_HEADER, USER_AGENT};
use crate::document::{
    DesignDocument, DesignFileMetadata, FileResponse, NodesResponse, PageSummary,
};
use crate::{DesignError, DesignResult, FileKey, NodeId};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct FigmaClient {
    http: reqwest::Client,
    cfg: Arc<FigmaConfig>,
}

impl FigmaClient {
    /// Create a client using the base URL, credential and timeout from `cfg`.
    ///
    /// # Errors
    /// Returns `DesignError::Config` if the underlying HTTP client cannot be built (for example
    /// when no TLS backend is available).
    pub fn new(cfg: Arc<FigmaConfig>) -> DesignResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DesignError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, cfg })
    }

    pub fn config(&self) -> &FigmaConfig {
        &self.cfg
    }

    /// Fetch the whole document tree of a file together with its metadata.
    pub async fn fetch_whole_file(
        &self,
        file_key: &FileKey,
    ) -> DesignResult<(DesignDocument, DesignFileMetadata)> {
        tracing::debug!(file_key = %file_key, "fetching design file");
        let body: FileResponse = self
            .send_json(self.get(&format!("/files/{file_key}")))
            .await?;
        Ok(body.into_parts())
    }

    /// Fetch a single node by ID using the targeted nodes endpoint.
    ///
    /// Returns `Ok(None)` when the service does not resolve the ID; that is not an error.
    pub async fn fetch_node(
        &self,
        file_key: &FileKey,
        node_id: &NodeId,
    ) -> DesignResult<Option<DesignDocument>> {
        let mut nodes = self.fetch_nodes(file_key, std::slice::from_ref(node_id)).await?;
        Ok(nodes.remove(node_id.as_str()))
    }

    /// Fetch several nodes in one request.
    ///
    /// The returned map contains only the IDs the service resolved.
    ///
    /// # Errors
    /// Returns `DesignError::InvalidInput` for an empty ID list, without contacting the service.
    pub async fn fetch_nodes(
        &self,
        file_key: &FileKey,
        node_ids: &[NodeId],
    ) -> DesignResult<BTreeMap<String, DesignDocument>> {
        if node_ids.is_empty() {
            return Err(DesignError::InvalidInput(
                "at least one node id is required".into(),
            ));
        }

        let ids = node_ids
            .iter()
            .map(NodeId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        tracing::debug!(file_key = %file_key, ids = %ids, "fetching design nodes");

        let request = self
            .get(&format!("/files/{file_key}/nodes"))
            .query(&[("ids", ids.as_str())]);
        let body: NodesResponse = self.send_json(request).await?;

        let resolved: BTreeMap<String, DesignDocument> = body
            .nodes
            .into_iter()
            .filter_map(|(id, entry)| entry.map(|e| (id, e.document)))
            .collect();
        if resolved.len() < node_ids.len() {
            tracing::debug!(
                "{} of {} requested nodes were not resolved",
                node_ids.len() - resolved.len(),
                node_ids.len()
            );
        }
        Ok(resolved)
    }

    /// List the pages of a file, fetching only the first level of the tree.
    pub async fn list_pages(&self, file_key: &FileKey) -> DesignResult<Vec<PageSummary>> {
        tracing::debug!(file_key = %file_key, "listing pages");
        let request = self
            .get(&format!("/files/{file_key}"))
            .query(&[("depth", "1")]);
        let body: FileResponse = self.send_json(request).await?;
        Ok(body.document.pages().collect())
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.http.get(format!("{}{}", self.cfg.api_base(), path));
        let token = self.cfg.access_token().expose();
        match self.cfg.auth_scheme() {
            AuthScheme::PersonalToken => request.header(FIGMA_TOKEN_HEADER, token),
            AuthScheme::Bearer => request.bearer_auth(token),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> DesignResult<T> {
        let response = request.send().await.map_err(DesignError::transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(DesignError::transport)?;

        if !status.is_success() {
            let message = upstream_message(status, &body);
            tracing::warn!("design service returned {}: {}", status, message);
            return Err(DesignError::Upstream {
                status: Some(status.as_u16()),
                message,
            });
        }

        decode_body(&body).map_err(|e| DesignError::Upstream {
            status: Some(status.as_u16()),
            message: format!("unexpected response body: {e}"),
        })
    }
}

/// Decode a JSON body with no nesting limit. Each tree level is two JSON levels (node object and
/// `children` array); the stack grows onto the heap as needed.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> serde_json::Result<T> {
    let mut de = serde_json::Deserializer::from_slice(body);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Extract a human-readable message from an error body.
///
/// The service answers errors with `{"status": 404, "err": "Not found"}`; other shapes fall back
/// to the raw text, then to the status reason.
fn upstream_message(status: StatusCode, body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        #[serde(alias = "message")]
        err: String,
    }

    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        return parsed.err;
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::AccessToken;
    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    pub(crate) const TEST_TOKEN: &str = "figd_test_token";

    /// A file with two pages; page 0:1 holds a frame with a button component.
    pub(crate) fn sample_file() -> Value {
        json!({
            "name": "Recruit UI",
            "lastModified": "2024-03-01T10:15:00Z",
            "version": "42",
            "document": {
                "id": "0:0",
                "name": "Document",
                "type": "DOCUMENT",
                "children": [
                    {"id": "0:1", "name": "Jobs", "type": "CANVAS", "children": [
                        {"id": "1:1", "name": "Job Card", "type": "FRAME", "children": [
                            {"id": "1:2", "name": "Primary Button", "type": "COMPONENT", "children": []}
                        ]}
                    ]},
                    {"id": "0:2", "name": "Profile", "type": "CANVAS", "children": []}
                ]
            }
        })
    }

    fn find_by_id<'a>(node: &'a Value, id: &str) -> Option<&'a Value> {
        if node["id"] == id {
            return Some(node);
        }
        node["children"]
            .as_array()?
            .iter()
            .find_map(|child| find_by_id(child, id))
    }

    fn authorised(headers: &HeaderMap) -> bool {
        let token = headers
            .get(FIGMA_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| {
                headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.strip_prefix("Bearer "))
                    .map(str::to_string)
            });
        token.as_deref() == Some(TEST_TOKEN)
    }

    async fn file_handler(
        State(file): State<Value>,
        headers: HeaderMap,
        axum::extract::Path(key): axum::extract::Path<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> axum::response::Response {
        if !authorised(&headers) {
            return (
                AxumStatus::FORBIDDEN,
                Json(json!({"status": 403, "err": "Invalid token"})),
            )
                .into_response();
        }
        if key == "missing" {
            return (
                AxumStatus::NOT_FOUND,
                Json(json!({"status": 404, "err": "Not found"})),
            )
                .into_response();
        }
        let mut body = file.clone();
        if params.get("depth").map(String::as_str) == Some("1") {
            if let Some(pages) = body["document"]["children"].as_array_mut() {
                for page in pages {
                    if let Some(obj) = page.as_object_mut() {
                        obj.remove("children");
                    }
                }
            }
        }
        Json(body).into_response()
    }

    async fn nodes_handler(
        State(file): State<Value>,
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> axum::response::Response {
        if !authorised(&headers) {
            return (AxumStatus::FORBIDDEN, "forbidden").into_response();
        }
        let mut nodes = serde_json::Map::new();
        for id in params.get("ids").map(String::as_str).unwrap_or("").split(',') {
            let entry = find_by_id(&file["document"], id)
                .map(|doc| json!({"document": doc}))
                .unwrap_or(Value::Null);
            nodes.insert(id.to_string(), entry);
        }
        Json(json!({"name": file["name"], "nodes": nodes})).into_response()
    }

    /// Serve `file` the way the design-file service would, returning the API base URL.
    pub(crate) async fn spawn_mock_service(file: Value) -> String {
        let app = Router::new()
            .route("/v1/files/:key", get(file_handler))
            .route("/v1/files/:key/nodes", get(nodes_handler))
            .with_state(file);
        spawn_router(app).await
    }

    pub(crate) async fn spawn_router(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });
        format!("http://{addr}/v1")
    }

    pub(crate) fn test_config(api_base: &str, token: &str) -> Arc<FigmaConfig> {
        Arc::new(
            FigmaConfig::new(
                api_base,
                AccessToken::new(token).unwrap(),
                Some(FileKey::new("abc123").unwrap()),
                AuthScheme::PersonalToken,
                Duration::from_secs(5),
            )
            .expect("FigmaConfig::new should succeed"),
        )
    }

    async fn test_client() -> FigmaClient {
        let base = spawn_mock_service(sample_file()).await;
        FigmaClient::new(test_config(&base, TEST_TOKEN)).unwrap()
    }

    fn key() -> FileKey {
        FileKey::new("abc123").unwrap()
    }

    #[tokio::test]
    async fn fetch_whole_file_returns_document_and_metadata() {
        let client = test_client().await;
        let (document, meta) = client.fetch_whole_file(&key()).await.expect("fetch file");

        assert_eq!(document.node_type, crate::NodeType::Document);
        assert_eq!(document.children().len(), 2);
        assert_eq!(meta.name, "Recruit UI");
        assert_eq!(meta.version, "42");
    }

    #[tokio::test]
    async fn fetch_node_returns_embedded_document() {
        let client = test_client().await;
        let node = client
            .fetch_node(&key(), &NodeId::new("1:2").unwrap())
            .await
            .expect("fetch node")
            .expect("node should exist");
        assert_eq!(node.id, "1:2");
        assert_eq!(node.name, "Primary Button");
    }

    #[tokio::test]
    async fn fetch_node_absent_is_none_not_error() {
        let client = test_client().await;
        let node = client
            .fetch_node(&key(), &NodeId::new("99:99").unwrap())
            .await
            .expect("absent node is not an error");
        assert!(node.is_none());
    }

    #[tokio::test]
    async fn fetch_node_with_empty_nodes_map_is_none() {
        let app = Router::new().route(
            "/v1/files/:key/nodes",
            get(|| async { Json(json!({"nodes": {}})) }),
        );
        let base = spawn_router(app).await;
        let client = FigmaClient::new(test_config(&base, TEST_TOKEN)).unwrap();

        let node = client
            .fetch_node(&key(), &NodeId::new("2").unwrap())
            .await
            .expect("empty map is not an error");
        assert!(node.is_none());
    }

    #[tokio::test]
    async fn fetch_nodes_omits_unresolved_ids() {
        let client = test_client().await;
        let ids = vec![
            NodeId::new("1:1").unwrap(),
            NodeId::new("nope").unwrap(),
            NodeId::new("0:2").unwrap(),
        ];
        let nodes = client.fetch_nodes(&key(), &ids).await.expect("batch fetch");
        assert_eq!(
            nodes.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["0:2", "1:1"]
        );
        assert_eq!(nodes["1:1"].name, "Job Card");
    }

    #[tokio::test]
    async fn fetch_nodes_rejects_empty_id_list() {
        let client = test_client().await;
        let err = client.fetch_nodes(&key(), &[]).await.expect_err("empty ids");
        assert!(matches!(err, DesignError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn list_pages_reads_first_level() {
        let client = test_client().await;
        let pages = client.list_pages(&key()).await.expect("list pages");
        let names: Vec<_> = pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Jobs", "Profile"]);
    }

    type SeenHeaders = Arc<Mutex<Vec<HeaderMap>>>;

    /// Serve the sample file and keep the headers of every request received.
    async fn spawn_header_recorder() -> (String, SeenHeaders) {
        let seen = SeenHeaders::default();
        let app = Router::new()
            .route(
                "/v1/files/:key",
                get(|State(seen): State<SeenHeaders>, headers: HeaderMap| async move {
                    seen.lock().unwrap().push(headers);
                    Json(sample_file())
                }),
            )
            .with_state(seen.clone());
        (spawn_router(app).await, seen)
    }

    fn config_with_scheme(
        api_base: &str,
        scheme: AuthScheme,
        timeout: Duration,
    ) -> Arc<FigmaConfig> {
        Arc::new(
            FigmaConfig::new(
                api_base,
                AccessToken::new(TEST_TOKEN).unwrap(),
                None,
                scheme,
                timeout,
            )
            .unwrap(),
        )
    }

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn bearer_scheme_sends_authorization_header() {
        let (base, seen) = spawn_header_recorder().await;
        let cfg = config_with_scheme(&base, AuthScheme::Bearer, Duration::from_secs(5));
        FigmaClient::new(cfg)
            .unwrap()
            .fetch_whole_file(&key())
            .await
            .expect("fetch with bearer token");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let expected = format!("Bearer {TEST_TOKEN}");
        assert_eq!(header(&seen[0], "authorization"), Some(expected.as_str()));
        assert_eq!(header(&seen[0], FIGMA_TOKEN_HEADER), None);
    }

    #[tokio::test]
    async fn personal_token_scheme_sends_figma_token_header() {
        let (base, seen) = spawn_header_recorder().await;
        let cfg = config_with_scheme(&base, AuthScheme::PersonalToken, Duration::from_secs(5));
        FigmaClient::new(cfg)
            .unwrap()
            .fetch_whole_file(&key())
            .await
            .expect("fetch with personal token");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(header(&seen[0], FIGMA_TOKEN_HEADER), Some(TEST_TOKEN));
        assert_eq!(header(&seen[0], "authorization"), None);
    }

    #[tokio::test]
    async fn slow_service_times_out_without_status() {
        let app = Router::new().route(
            "/v1/files/:key",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(sample_file())
            }),
        );
        let base = spawn_router(app).await;
        let cfg = config_with_scheme(&base, AuthScheme::PersonalToken, Duration::from_secs(1));
        let err = FigmaClient::new(cfg)
            .unwrap()
            .fetch_whole_file(&key())
            .await
            .expect_err("request should time out");
        match err {
            DesignError::Upstream { status, message } => {
                assert_eq!(status, None);
                assert_eq!(message, "request timed out");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// A DOCUMENT root over a single chain of `depth` frames ending in a node named "leaf".
    fn deeply_nested_file(depth: usize) -> Value {
        let mut node = json!({"id": format!("{depth}:0"), "name": "leaf", "type": "FRAME"});
        for level in (1..depth).rev() {
            node = json!({
                "id": format!("{level}:0"),
                "name": format!("Frame {level}"),
                "type": "FRAME",
                "children": [node]
            });
        }
        json!({
            "name": "Deep",
            "lastModified": "2024-03-01T10:15:00Z",
            "version": "1",
            "document": {"id": "0:0", "name": "Document", "type": "DOCUMENT", "children": [node]}
        })
    }

    #[tokio::test]
    async fn fetch_whole_file_decodes_deeply_nested_tree() {
        let base = spawn_mock_service(deeply_nested_file(150)).await;
        let client = FigmaClient::new(test_config(&base, TEST_TOKEN)).unwrap();
        let (document, meta) = client
            .fetch_whole_file(&key())
            .await
            .expect("deep trees are valid files");

        assert_eq!(meta.name, "Deep");
        let found = crate::find_component_by_name(&document, "leaf").expect("leaf is reachable");
        assert_eq!(found.id, "150:0");
        assert!(found.is_leaf());
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error_with_message() {
        let base = spawn_mock_service(sample_file()).await;
        let client = FigmaClient::new(test_config(&base, "wrong")).unwrap();
        let err = client
            .fetch_whole_file(&key())
            .await
            .expect_err("bad token");
        match err {
            DesignError::Upstream { status, message } => {
                assert_eq!(status, Some(403));
                assert_eq!(message, "Invalid token");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let client = test_client().await;
        let err = client
            .fetch_whole_file(&FileKey::new("missing").unwrap())
            .await
            .expect_err("missing file");
        assert_eq!(err.upstream_status(), Some(404));
    }

    #[tokio::test]
    async fn unreachable_service_is_upstream_error_without_status() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            FigmaClient::new(test_config(&format!("http://{addr}/v1"), TEST_TOKEN)).unwrap();
        let err = client
            .fetch_whole_file(&key())
            .await
            .expect_err("nothing is listening");
        assert!(matches!(err, DesignError::Upstream { status: None, .. }));
    }

    #[tokio::test]
    async fn undecodable_body_is_upstream_error() {
        let app = Router::new().route("/v1/files/:key", get(|| async { "<html>oops</html>" }));
        let base = spawn_router(app).await;
        let client = FigmaClient::new(test_config(&base, TEST_TOKEN)).unwrap();
        let err = client.fetch_whole_file(&key()).await.expect_err("not json");
        assert!(matches!(err, DesignError::Upstream { status: Some(200), .. }));
    }

    #[test]
    fn upstream_message_fallbacks() {
        assert_eq!(
            upstream_message(StatusCode::NOT_FOUND, br#"{"status":404,"err":"Not found"}"#),
            "Not found"
        );
        assert_eq!(
            upstream_message(StatusCode::BAD_GATEWAY, b"  upstream down \n"),
            "upstream down"
        );
        assert_eq!(
            upstream_message(StatusCode::TOO_MANY_REQUESTS, b""),
            "Too Many Requests"
        );
    }
}
