//! OpenAPI documentation for the HTTP surface.
//!
//! The generated document is served at `/docs` by `utoipa-scalar`.

use crate::api::{handlers, models};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier API",
        description = "File workspace storage and AI completion gateway backing the Atelier browser editor."
    ),
    paths(
        handlers::files::upload_file,
        handlers::files::download_file,
        handlers::files::read_file,
        handlers::files::write_file,
        handlers::files::list_files,
        handlers::gateway::complete,
    ),
    components(schemas(
        models::files::UploadResponse,
        models::files::ReadResponse,
        models::files::WriteRequest,
        models::files::WriteResponse,
        models::files::FileListResponse,
        models::gateway::GatewayRequest,
        models::gateway::GatewayResponse,
    )),
    tags(
        (name = "files", description = "File storage against the flat workspace directory"),
        (name = "gateway", description = "Normalized access to upstream AI chat-completion providers")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/upload",
            "/api/download/{filename}",
            "/api/read/{filename}",
            "/api/write",
            "/api/files",
            "/api/gateway",
        ] {
            assert!(paths.contains(&expected), "missing {expected} in {paths:?}");
        }
    }
}
