use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for the AI gateway.
///
/// `service` is kept as a raw string here so an unsupported tag surfaces as
/// the gateway's own 400 "Invalid service" rather than a deserialization
/// rejection; [`crate::gateway::Provider::parse`] turns it into the typed
/// dispatch enum.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    /// One of "deepseek", "gemini", "copilot"
    pub service: String,
    pub api_key: String,
    pub prompt: String,
    /// Provider-specific default is used when absent
    #[serde(default)]
    pub model: Option<String>,
}

/// Normalized envelope returned for a successful completion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GatewayResponse {
    pub success: bool,
    /// The extracted text reply
    pub response: String,
}
