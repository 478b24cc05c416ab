pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::agent::handlers as agent_handlers;
use crate::context::handlers as context_handlers;
use crate::errors::AppError;
use crate::state::AppState;

/// Résumé uploads and large document entries need more than axum's 2 MB default.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Context API
        .route("/agent/context", post(context_handlers::handle_store_context))
        .route(
            "/agent/context/:user_id",
            get(context_handlers::handle_get_context).delete(context_handlers::handle_clear_context),
        )
        .route(
            "/agent/context/:user_id/resume",
            post(context_handlers::handle_upload_resume),
        )
        // Task API
        .route("/agent/task", post(agent_handlers::handle_execute_task))
        .route("/agent/usage/:user_id", get(agent_handlers::handle_get_usage))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::agent::orchestrator::Orchestrator;
    use crate::agent::test_support::ScriptedProvider;
    use crate::context::formatter::ContextFormatter;
    use crate::context::store::ContextStore;

    fn test_state(provider: Arc<ScriptedProvider>) -> AppState {
        AppState {
            orchestrator: Arc::new(Orchestrator::new(
                provider,
                Arc::new(ContextStore::new()),
                ContextFormatter::default(),
            )),
        }
    }

    async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = build_router(state.clone()).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = test_state(Arc::new(ScriptedProvider::replying("ok")));
        let (status, body) = send(&state, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["trackedUsers"], 0);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_json() {
        let state = test_state(Arc::new(ScriptedProvider::replying("ok")));
        let (status, body) = send(&state, "GET", "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_store_then_get_context() {
        let state = test_state(Arc::new(ScriptedProvider::replying("ok")));
        let (status, ack) = send(
            &state,
            "POST",
            "/agent/context",
            Some(json!({
                "userId": "job-search-user",
                "type": "qa",
                "data": {
                    "question": "What type of role are you looking for?",
                    "answer": "Senior Rust engineer"
                }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["success"], true);
        assert!(ack["contextId"].is_string());

        let (status, body) = send(&state, "GET", "/agent/context/job-search-user", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["context"]["qa"][0]["answer"], "Senior Rust engineer");
        assert_eq!(body["context"]["qa"][0]["id"], ack["contextId"]);
        assert_eq!(body["context"]["documents"], json!([]));
    }

    #[tokio::test]
    async fn test_get_context_for_unknown_user_is_empty() {
        let state = test_state(Arc::new(ScriptedProvider::replying("ok")));
        let (status, body) = send(&state, "GET", "/agent/context/stranger", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["context"], json!({ "qa": [], "documents": [] }));
    }

    #[tokio::test]
    async fn test_store_context_rejects_bad_payloads() {
        let state = test_state(Arc::new(ScriptedProvider::replying("ok")));

        let (status, body) = send(
            &state,
            "POST",
            "/agent/context",
            Some(json!({ "userId": "u1", "type": "note", "data": {} })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &state,
            "POST",
            "/agent/context",
            Some(json!({ "userId": "u1", "type": "document", "data": { "title": "CV" } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &state,
            "POST",
            "/agent/context",
            Some(json!({ "type": "qa", "data": { "question": "q", "answer": "a" } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_bodies_are_validation_errors() {
        let state = test_state(Arc::new(ScriptedProvider::replying("ok")));

        let (status, body) = send(
            &state,
            "POST",
            "/agent/context",
            Some(json!({ "userId": ["u1"], "type": "qa", "data": { "question": "q", "answer": "a" } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let req = Request::builder()
            .method("POST")
            .uri("/agent/task")
            .header("content-type", "application/json")
            .body(Body::from("{\"userId\": \"u1\","))
            .unwrap();
        let response = build_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_clear_context() {
        let state = test_state(Arc::new(ScriptedProvider::replying("ok")));
        send(
            &state,
            "POST",
            "/agent/context",
            Some(json!({ "userId": "u1", "type": "document", "data": { "title": "CV", "content": "Rust" } })),
        )
        .await;

        let (status, body) = send(&state, "DELETE", "/agent/context/u1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, body) = send(&state, "GET", "/agent/context/u1", None).await;
        assert_eq!(body["context"]["documents"], json!([]));

        let (status, _) = send(&state, "DELETE", "/agent/context/u1", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_execute_task_and_usage() {
        let provider = Arc::new(ScriptedProvider::replying("Dear Acme team..."));
        let state = test_state(provider.clone());

        let (status, body) = send(
            &state,
            "POST",
            "/agent/task",
            Some(json!({
                "userId": "u1",
                "taskType": "writing",
                "prompt": "Write a cover letter for Acme",
                "options": { "maxTokens": 800 }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["response"], "Dear Acme team...");
        assert_eq!(body["taskType"], "writing");
        assert_eq!(body["cost"]["totalCost"], 0.018);
        assert_eq!(provider.last_max_tokens(), Some(800));

        let (status, body) = send(&state, "GET", "/agent/usage/u1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["usage"]["totalRequests"], 1);
        assert_eq!(body["usage"]["totalTokens"], 2000);
        assert_eq!(body["usage"]["requestHistory"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_is_a_200_with_success_false() {
        let state = test_state(Arc::new(ScriptedProvider::failing(529, "overloaded")));
        let (status, body) = send(
            &state,
            "POST",
            "/agent/task",
            Some(json!({ "userId": "u1", "taskType": "research", "prompt": "Research Acme" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_execute_task_validation() {
        let provider = Arc::new(ScriptedProvider::replying("ok"));
        let state = test_state(provider.clone());

        let cases = [
            json!({ "userId": "u1", "taskType": "summarize", "prompt": "p" }),
            json!({ "userId": "u1", "taskType": "analysis", "prompt": "  " }),
            json!({ "userId": "", "taskType": "analysis", "prompt": "p" }),
            json!({ "userId": "u1", "taskType": "analysis", "prompt": "p", "options": { "maxTokens": 0 } }),
            json!({ "userId": "u1", "taskType": "analysis", "prompt": "p", "options": { "maxTokens": 4001 } }),
            json!({ "userId": "u1", "taskType": "analysis", "prompt": "p", "options": { "maxTokens": -1 } }),
            json!({ "userId": "u1", "taskType": "analysis", "prompt": "p", "options": { "maxTokens": 5000000000u64 } }),
            json!({ "userId": "u1", "taskType": "analysis", "prompt": "p", "options": { "includeContext": "yes" } }),
            json!({ "userId": 42, "taskType": "analysis", "prompt": "p" }),
        ];
        for case in cases {
            let (status, body) = send(&state, "POST", "/agent/task", Some(case.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "case: {case}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_usage_for_unknown_user_is_zeroed() {
        let state = test_state(Arc::new(ScriptedProvider::replying("ok")));
        let (status, body) = send(&state, "GET", "/agent/usage/ghost", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["usage"]["totalRequests"], 0);
        assert_eq!(body["usage"]["totalCost"], 0.0);
    }

    #[tokio::test]
    async fn test_resume_upload_stores_document() {
        let state = test_state(Arc::new(ScriptedProvider::replying("ok")));
        let boundary = "resume-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             Jane Doe CV\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cv.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             Jane Doe\nStaff engineer, 8 years of Rust\r\n\
             --{boundary}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/agent/context/u1/resume")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = build_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let context = state.orchestrator.get_context("u1");
        assert_eq!(context.documents.len(), 1);
        assert_eq!(context.documents[0].title, "Jane Doe CV");
        assert_eq!(
            context.documents[0].content,
            "Jane Doe\nStaff engineer, 8 years of Rust"
        );
    }

    #[tokio::test]
    async fn test_resume_upload_without_file_is_rejected() {
        let state = test_state(Arc::new(ScriptedProvider::replying("ok")));
        let boundary = "b";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nCV\r\n--{boundary}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/agent/context/u1/resume")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = build_router(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.orchestrator.get_context("u1").is_empty());
    }
}
