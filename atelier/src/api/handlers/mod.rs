//! HTTP request handlers for all API endpoints.
//!
//! Each handler is responsible for request validation and
//! deserialization, delegating to the file store or gateway client held in
//! [`crate::AppState`], and response serialization.
//!
//! # Handler Modules
//!
//! - [`files`]: upload, download, read, write, and list against the
//!   storage root
//! - [`gateway`]: normalized dispatch to the upstream AI providers
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts
//! to the appropriate HTTP status code and JSON error envelope.

pub mod files;
pub mod gateway;
