//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **File store** (`/api/upload`, `/api/download/{filename}`,
//!   `/api/read/{filename}`, `/api/write`, `/api/files`): persistence
//!   against the flat storage directory
//! - **AI gateway** (`/api/gateway`): normalized access to the supported
//!   chat-completion providers
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
