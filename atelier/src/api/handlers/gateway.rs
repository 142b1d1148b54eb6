use crate::api::models::gateway::{GatewayRequest, GatewayResponse};
use crate::errors::Result;
use crate::gateway::Provider;
use crate::AppState;
use axum::{extract::State, Json};

#[utoipa::path(
    post,
    path = "/api/gateway",
    tag = "gateway",
    summary = "AI completion",
    description = "Forward a prompt to one of the supported chat-completion providers and return the extracted text reply.",
    request_body = GatewayRequest,
    responses(
        (status = 200, description = "Completion text", body = GatewayResponse),
        (status = 400, description = "Invalid service"),
        (status = 500, description = "Upstream or parse failure")
    )
)]
pub async fn complete(State(state): State<AppState>, Json(request): Json<GatewayRequest>) -> Result<Json<GatewayResponse>> {
    // Unsupported service tags fail here; no upstream call is attempted
    let provider = Provider::parse(&request.service)?;

    let text = state
        .gateway
        .complete(provider, &request.api_key, &request.prompt, request.model.as_deref())
        .await?;

    Ok(Json(GatewayResponse {
        success: true,
        response: text,
    }))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::test_utils::{create_test_app, create_test_app_with};
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_against(mock: &MockServer) -> Config {
        let base = Url::parse(&mock.uri()).unwrap();
        let mut config = Config::default();
        config.gateway.deepseek_url = base.clone();
        config.gateway.gemini_url = base.clone();
        config.gateway.openai_url = base;
        config
    }

    #[test_log::test(tokio::test)]
    async fn unknown_service_is_rejected_without_any_upstream_call() {
        let mock = MockServer::start().await;
        // Counter mock: the gateway must never reach the upstream
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&mock).await;

        let (server, _root) = create_test_app_with(config_against(&mock));

        let response = server
            .post("/api/gateway")
            .json(&serde_json::json!({"service": "claude", "apiKey": "x", "prompt": "hi"}))
            .await;

        assert_eq!(response.status_code().as_u16(), 400);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Invalid service");
        // wiremock verifies the expect(0) when the server drops
    }

    #[test_log::test(tokio::test)]
    async fn gemini_reply_shape_is_normalized_into_the_envelope() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "hello"}]}}]
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let (server, _root) = create_test_app_with(config_against(&mock));

        let response = server
            .post("/api/gateway")
            .json(&serde_json::json!({"service": "gemini", "apiKey": "x", "prompt": "hi"}))
            .await;

        assert_eq!(response.status_code().as_u16(), 200);
        assert_eq!(
            response.json::<serde_json::Value>(),
            serde_json::json!({"success": true, "response": "hello"})
        );
    }

    #[test_log::test(tokio::test)]
    async fn upstream_failure_surfaces_as_a_500_envelope_not_a_crash() {
        let mock = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).mount(&mock).await;

        let (server, _root) = create_test_app_with(config_against(&mock));

        let response = server
            .post("/api/gateway")
            .json(&serde_json::json!({"service": "deepseek", "apiKey": "x", "prompt": "hi"}))
            .await;

        assert_eq!(response.status_code().as_u16(), 500);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("500"));

        // The server is still healthy after the failure
        let health = server.get("/healthz").await;
        assert_eq!(health.status_code().as_u16(), 200);
    }

    #[test_log::test(tokio::test)]
    async fn default_models_are_applied_when_the_request_names_none() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({"model": "deepseek-chat"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "ok"}}]
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let (server, _root) = create_test_app_with(config_against(&mock));

        let response = server
            .post("/api/gateway")
            .json(&serde_json::json!({"service": "deepseek", "apiKey": "x", "prompt": "hi"}))
            .await;
        assert_eq!(response.status_code().as_u16(), 200);
    }

    #[test_log::test(tokio::test)]
    async fn gateway_and_file_store_share_one_process_without_interference() {
        // The two services are only related by being served together
        let (server, _root) = create_test_app();

        let write = server
            .post("/api/write")
            .json(&serde_json::json!({"filename": "a.txt", "content": "hello"}))
            .await;
        assert_eq!(write.status_code().as_u16(), 200);

        let bad_gateway = server
            .post("/api/gateway")
            .json(&serde_json::json!({"service": "nope", "apiKey": "x", "prompt": "hi"}))
            .await;
        assert_eq!(bad_gateway.status_code().as_u16(), 400);

        let read = server.get("/api/read/a.txt").await;
        assert_eq!(read.json::<serde_json::Value>()["content"], "hello");
    }
}
