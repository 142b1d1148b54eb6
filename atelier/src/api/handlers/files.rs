use crate::api::models::files::{FileListResponse, ReadResponse, UploadResponse, WriteRequest, WriteResponse};
use crate::errors::{Error, Result};
use crate::AppState;
use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use tokio_util::io::ReaderStream;

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    summary = "Upload file",
    description = "Store an uploaded file under a generated name inside the storage root.",
    request_body(content_type = "multipart/form-data", description = "Form with a `file` part"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file uploaded"),
        (status = 403, description = "Access denied"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>> {
    // Collect the file part as multipart fields stream in
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {}", e),
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let original_name = field.file_name().map(|s| s.to_string());
                let bytes = field.bytes().await.map_err(|e| Error::BadRequest {
                    message: format!("Failed to read file data: {}", e),
                })?;
                if let Some(name) = original_name {
                    upload = Some((name, bytes.to_vec()));
                }
            }
            _ => {
                // Ignore unknown fields (forward compatibility)
            }
        }
    }

    let (original_name, bytes) = upload.ok_or(Error::NoFileUploaded)?;

    let stored = state.store.store_upload(&original_name, &bytes).await?;

    tracing::info!(
        filename = %stored.filename,
        original_name = %original_name,
        bytes = bytes.len(),
        "File uploaded"
    );

    Ok(Json(UploadResponse {
        success: true,
        filename: stored.filename,
        path: stored.path.to_string_lossy().into_owned(),
        original_name,
    }))
}

#[utoipa::path(
    get,
    path = "/api/download/{filename}",
    tag = "files",
    summary = "Download file",
    description = "Stream a stored file as an attachment.",
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "File not found")
    ),
    params(("filename" = String, Path, description = "Name of the file to download"))
)]
pub async fn download_file(State(state): State<AppState>, Path(filename): Path<String>) -> Result<impl IntoResponse> {
    let (file, name) = state.store.open(&filename).await?;

    let content_type = mime_guess::from_path(&name).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\"")),
        ],
        body,
    ))
}

#[utoipa::path(
    get,
    path = "/api/read/{filename}",
    tag = "files",
    summary = "Read file",
    description = "Return a stored file's full contents as text.",
    responses(
        (status = 200, description = "File content", body = ReadResponse),
        (status = 403, description = "Access denied"),
        (status = 404, description = "File not found")
    ),
    params(("filename" = String, Path, description = "Name of the file to read"))
)]
pub async fn read_file(State(state): State<AppState>, Path(filename): Path<String>) -> Result<Json<ReadResponse>> {
    let content = state.store.read(&filename).await?;
    Ok(Json(ReadResponse { success: true, content }))
}

#[utoipa::path(
    post,
    path = "/api/write",
    tag = "files",
    summary = "Write file",
    description = "Write text content to a file in the storage root, overwriting any existing file of that name.",
    request_body = WriteRequest,
    responses(
        (status = 200, description = "File written", body = WriteResponse),
        (status = 400, description = "Filename and content required"),
        (status = 403, description = "Access denied"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn write_file(State(state): State<AppState>, Json(request): Json<WriteRequest>) -> Result<Json<WriteResponse>> {
    // Empty-string content is a valid write; absent content is not
    let (filename, content) = match (request.filename, request.content) {
        (Some(filename), Some(content)) => (filename, content),
        _ => return Err(Error::MissingParameters),
    };

    let used = state.store.write(&filename, &content).await?;
    Ok(Json(WriteResponse {
        success: true,
        filename: used,
    }))
}

#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    summary = "List files",
    description = "Names of the entries directly inside the storage root. An absent root is an empty store.",
    responses(
        (status = 200, description = "Entry names", body = FileListResponse)
    )
)]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<FileListResponse>> {
    let files = state.store.list().await?;
    Ok(Json(FileListResponse { files }))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_app;
    use axum_test::multipart::{MultipartForm, Part};

    #[test_log::test(tokio::test)]
    async fn write_then_read_returns_exactly_what_was_written() {
        let (server, _root) = create_test_app();

        let write = server
            .post("/api/write")
            .json(&serde_json::json!({"filename": "a.txt", "content": "hello"}))
            .await;
        assert_eq!(write.status_code().as_u16(), 200);
        assert_eq!(write.json::<serde_json::Value>(), serde_json::json!({"success": true, "filename": "a.txt"}));

        let read = server.get("/api/read/a.txt").await;
        assert_eq!(read.status_code().as_u16(), 200);
        assert_eq!(read.json::<serde_json::Value>(), serde_json::json!({"success": true, "content": "hello"}));
    }

    #[test_log::test(tokio::test)]
    async fn write_round_trips_empty_and_multibyte_content() {
        let (server, _root) = create_test_app();

        for content in ["", "héllo wörld \u{1F980}"] {
            let write = server
                .post("/api/write")
                .json(&serde_json::json!({"filename": "unicode.txt", "content": content}))
                .await;
            assert_eq!(write.status_code().as_u16(), 200);

            let read = server.get("/api/read/unicode.txt").await;
            let body: serde_json::Value = read.json();
            assert_eq!(body["content"], content);
        }
    }

    #[test_log::test(tokio::test)]
    async fn write_without_content_is_a_client_error() {
        let (server, _root) = create_test_app();

        let response = server.post("/api/write").json(&serde_json::json!({"filename": "a.txt"})).await;
        assert_eq!(response.status_code().as_u16(), 400);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Filename and content required");

        let response = server.post("/api/write").json(&serde_json::json!({"content": "x"})).await;
        assert_eq!(response.status_code().as_u16(), 400);
    }

    #[test_log::test(tokio::test)]
    async fn write_with_directory_components_uses_the_basename() {
        let (server, _root) = create_test_app();

        let response = server
            .post("/api/write")
            .json(&serde_json::json!({"filename": "nested/dir/b.txt", "content": "x"}))
            .await;
        assert_eq!(response.status_code().as_u16(), 200);
        let body: serde_json::Value = response.json();
        assert_eq!(body["filename"], "b.txt");
    }

    #[test_log::test(tokio::test)]
    async fn traversal_download_is_denied_without_reading_the_file() {
        let (server, _root) = create_test_app();

        let response = server.get("/api/download/..%2F..%2Fetc%2Fpasswd").await;
        assert_eq!(response.status_code().as_u16(), 403);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Access denied");
        assert_eq!(body["success"], false);
    }

    #[test_log::test(tokio::test)]
    async fn traversal_read_and_write_are_denied() {
        let (server, _root) = create_test_app();

        let read = server.get("/api/read/..%2Fsecrets.txt").await;
        assert_eq!(read.status_code().as_u16(), 403);

        let write = server
            .post("/api/write")
            .json(&serde_json::json!({"filename": "../escape.txt", "content": "x"}))
            .await;
        assert_eq!(write.status_code().as_u16(), 403);
    }

    #[test_log::test(tokio::test)]
    async fn download_streams_the_stored_bytes_as_an_attachment() {
        let (server, _root) = create_test_app();

        server
            .post("/api/write")
            .json(&serde_json::json!({"filename": "page.html", "content": "<h1>hi</h1>"}))
            .await;

        let response = server.get("/api/download/page.html").await;
        assert_eq!(response.status_code().as_u16(), 200);
        assert_eq!(response.as_bytes().as_ref(), b"<h1>hi</h1>");
        let disposition = response
            .headers()
            .get("content-disposition")
            .expect("attachment header")
            .to_str()
            .unwrap();
        assert!(disposition.contains("attachment"));
        assert!(disposition.contains("page.html"));
    }

    #[test_log::test(tokio::test)]
    async fn missing_file_reads_and_downloads_are_404() {
        let (server, _root) = create_test_app();

        let read = server.get("/api/read/ghost.txt").await;
        assert_eq!(read.status_code().as_u16(), 404);
        let body: serde_json::Value = read.json();
        assert_eq!(body["error"], "File not found");

        let download = server.get("/api/download/ghost.txt").await;
        assert_eq!(download.status_code().as_u16(), 404);
    }

    #[test_log::test(tokio::test)]
    async fn upload_stores_under_a_generated_name() {
        let (server, _root) = create_test_app();

        let form = MultipartForm::new().add_part("file", Part::bytes(b"console.log(1)".as_slice()).file_name("sketch.js"));
        let response = server.post("/api/upload").multipart(form).await;

        assert_eq!(response.status_code().as_u16(), 200);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["originalName"], "sketch.js");
        let generated = body["filename"].as_str().unwrap();
        assert!(generated.ends_with("-sketch.js"));
        assert_ne!(generated, "sketch.js");

        // The stored file is visible through the list and read endpoints
        let list: serde_json::Value = server.get("/api/files").await.json();
        assert!(list["files"].as_array().unwrap().iter().any(|f| f == generated));
    }

    #[test_log::test(tokio::test)]
    async fn repeated_uploads_of_the_same_name_never_collide() {
        let (server, _root) = create_test_app();

        let mut names = Vec::new();
        for round in 0..2 {
            let form = MultipartForm::new().add_part("file", Part::bytes(format!("v{round}").into_bytes()).file_name("sketch.js"));
            let response = server.post("/api/upload").multipart(form).await;
            assert_eq!(response.status_code().as_u16(), 200);
            let body: serde_json::Value = response.json();
            names.push(body["filename"].as_str().unwrap().to_string());
        }
        assert_ne!(names[0], names[1]);
    }

    #[test_log::test(tokio::test)]
    async fn upload_with_a_traversal_file_name_is_denied() {
        let (server, _root) = create_test_app();

        let form = MultipartForm::new().add_part("file", Part::bytes(b"evil".as_slice()).file_name("../../etc/evil.sh"));
        let response = server.post("/api/upload").multipart(form).await;

        assert_eq!(response.status_code().as_u16(), 403);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Access denied");

        // Nothing was stored
        let list: serde_json::Value = server.get("/api/files").await.json();
        assert_eq!(list["files"], serde_json::json!([]));
    }

    #[test_log::test(tokio::test)]
    async fn upload_without_a_file_part_is_rejected() {
        let (server, _root) = create_test_app();

        let form = MultipartForm::new().add_text("comment", "no file here");
        let response = server.post("/api/upload").multipart(form).await;

        assert_eq!(response.status_code().as_u16(), 400);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "No file uploaded");
    }

    #[test_log::test(tokio::test)]
    async fn list_is_empty_before_anything_is_stored() {
        let (server, _root) = create_test_app();

        let response = server.get("/api/files").await;
        assert_eq!(response.status_code().as_u16(), 200);
        assert_eq!(response.json::<serde_json::Value>(), serde_json::json!({"files": []}));
    }
}
