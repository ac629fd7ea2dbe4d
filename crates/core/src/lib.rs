//! # figproxy core
//!
//! Fetch and search logic for design files served by the Figma REST API.
//!
//! This crate contains:
//! - the document model (`document`) and the first-match name search (`search`)
//! - the outbound HTTP client (`client`), configured explicitly through `FigmaConfig`
//! - query resolution shared by the REST API and the CLI (`service`)
//!
//! **No server concerns**: routing, CORS and OpenAPI belong in `api-rest`; argument parsing and
//! printing belong in the CLI.

pub mod client;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod search;
pub mod service;

pub use client::FigmaClient;
pub use config::{AuthScheme, FigmaConfig, FigmaEnv};
pub use document::{DesignDocument, DesignFileMetadata, NodeType, PageSummary};
pub use error::{DesignError, DesignResult};
pub use figproxy_types::{AccessToken, FileKey, NodeId, TextError};
pub use search::find_component_by_name;
pub use service::{batch_response, DesignQuery, DesignService, NodeQuery, QueryOutcome};
