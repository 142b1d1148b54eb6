use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Multipart upload request carried no `file` part
    #[error("No file uploaded")]
    NoFileUploaded,

    /// Write request is missing `filename` or `content`
    #[error("Filename and content required")]
    MissingParameters,

    /// Gateway request named a service outside the supported set
    #[error("Invalid service")]
    InvalidService { service: String },

    /// Resolved path escaped the storage root
    #[error("Access denied")]
    AccessDenied,

    /// Requested file does not exist in the storage root
    #[error("File not found")]
    FileNotFound { name: String },

    /// Invalid request data (e.g. unparseable multipart body)
    #[error("{message}")]
    BadRequest { message: String },

    /// Upstream AI provider returned a non-success status
    #[error("Upstream error: {status}")]
    Upstream { status: String },

    /// Outbound call never yielded a response (timeout, connection refused)
    #[error("Failed to reach upstream provider: {reason}")]
    UpstreamUnreachable { reason: String },

    /// Upstream reply did not match the provider's documented shape
    #[error("Malformed response from upstream provider")]
    MalformedUpstream { provider: &'static str },

    /// Filesystem operation error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NoFileUploaded | Error::MissingParameters | Error::InvalidService { .. } | Error::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            Error::AccessDenied => StatusCode::FORBIDDEN,
            Error::FileNotFound { .. } => StatusCode::NOT_FOUND,
            Error::Upstream { .. }
            | Error::UpstreamUnreachable { .. }
            | Error::MalformedUpstream { .. }
            | Error::Io(_)
            | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking resolved paths or
    /// internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::NoFileUploaded => "No file uploaded".to_string(),
            Error::MissingParameters => "Filename and content required".to_string(),
            Error::InvalidService { .. } => "Invalid service".to_string(),
            // Fixed message: must not reveal what the name resolved to
            Error::AccessDenied => "Access denied".to_string(),
            Error::FileNotFound { .. } => "File not found".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::Upstream { status } => format!("Upstream error: {status}"),
            Error::UpstreamUnreachable { reason } => format!("Failed to reach upstream provider: {reason}"),
            Error::MalformedUpstream { .. } => "Malformed response from upstream provider".to_string(),
            Error::Io(_) | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Io(_) | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Upstream { .. } | Error::UpstreamUnreachable { .. } | Error::MalformedUpstream { .. } => {
                tracing::warn!("Upstream provider error: {}", self);
            }
            Error::AccessDenied => {
                tracing::info!("Rejected path escaping the storage root");
            }
            Error::InvalidService { service } => {
                tracing::debug!(service = %service, "Unsupported gateway service");
            }
            Error::FileNotFound { name } => {
                tracing::debug!(name = %name, "File not found");
            }
            Error::NoFileUploaded | Error::MissingParameters | Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = json!({
            "success": false,
            "error": self.user_message(),
        });

        (status, Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
