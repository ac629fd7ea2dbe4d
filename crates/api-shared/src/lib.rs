//! # API Shared
//!
//! Shared definitions for the figproxy surfaces.
//!
//! Contains:
//! - JSON request/response payloads (`dto` module), with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `figproxy-core` (which converts its results into these payloads), `api-rest` and the
//! CLI, so every surface emits the same JSON.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
