//! API request and response data models.
//!
//! These structures define the public API contract. All models are
//! annotated with `utoipa` for automatic API docs, and responses carry the
//! normalized `success` field so callers can branch without inspecting the
//! HTTP status.

pub mod files;
pub mod gateway;
