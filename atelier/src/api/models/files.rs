use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response for a successful multipart upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    /// Generated name the file was stored under
    pub filename: String,
    /// Full storage path of the stored file
    pub path: String,
    /// Name the client supplied for the file
    #[serde(rename = "originalName")]
    pub original_name: String,
}

/// Response for reading a file as text
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadResponse {
    pub success: bool,
    pub content: String,
}

/// Request body for writing a file.
///
/// Both fields are required; `content` may be the empty string, which is
/// distinct from absent.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WriteRequest {
    pub filename: Option<String>,
    pub content: Option<String>,
}

/// Response for a successful write
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WriteResponse {
    pub success: bool,
    /// Sanitized name the content was actually written under
    pub filename: String,
}

/// Response for listing the storage root
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileListResponse {
    pub files: Vec<String>,
}
