//! Route handlers. Each one maps a [`Gateway`](crate::gateway::Gateway)
//! outcome onto a JSON envelope.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, warn};

use promptgate_core::utils::timestamp;
use promptgate_core::NormalizedResult;

use crate::envelope::{Batch, Failure, Health, Image, Models, Success};
use crate::gateway::{GatewayError, PromptInput};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AiParams {
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl From<AiParams> for PromptInput {
    fn from(p: AiParams) -> Self {
        PromptInput {
            prompt: p.prompt,
            model: p.model,
            temperature: p.temperature,
            max_tokens: p.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
    pub prompts: Option<Vec<String>>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageParams {
    pub prompt: Option<String>,
}

// ─────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────

/// `GET /ai?prompt=..&model=..`
pub async fn ai_query(
    State(state): State<AppState>,
    params: Result<Query<AiParams>, QueryRejection>,
) -> Response {
    match params {
        Ok(Query(params)) => respond(state.gateway.ask(params.into()).await),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

/// `POST /ai` with a JSON body.
pub async fn ai_body(
    State(state): State<AppState>,
    body: Result<Json<AiParams>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(params)) => respond(state.gateway.ask(params.into()).await),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

/// `POST /batch` with `{prompts: [..], model?}`.
pub async fn batch(
    State(state): State<AppState>,
    body: Result<Json<BatchBody>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let Some(prompts) = body.prompts else {
        return bad_request("Prompts array is required");
    };

    let items = state.gateway.batch(prompts, body.model).await;
    let batch = Batch::from_items(items);
    debug!(
        total = batch.total,
        processed = batch.processed,
        failed = batch.failed,
        "Batch finished"
    );
    Json(batch).into_response()
}

/// `GET /api/models`
pub async fn models(State(state): State<AppState>) -> Json<Models> {
    let gateway = &state.gateway;
    Json(Models::new(gateway.registry(), gateway.default_model()))
}

/// `GET /api/image?prompt=..`
pub async fn image(
    State(state): State<AppState>,
    params: Result<Query<ImageParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    match state.gateway.image(params.prompt.as_deref()).await {
        Ok(result) => Json(Image::from(result)).into_response(),
        Err(e) => failure(&e),
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "online",
        service: format!("promptgate v{}", env!("CARGO_PKG_VERSION")),
        models: state.gateway.registry().len(),
        uptime: state.started.elapsed().as_secs_f64(),
        timestamp: timestamp(),
    })
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(Failure::new("Not found"))).into_response()
}

// ─────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────

fn respond(result: Result<NormalizedResult, GatewayError>) -> Response {
    match result {
        Ok(result) => Json(Success::from(result)).into_response(),
        Err(e) => failure(&e),
    }
}

/// Missing prompts are client errors; everything else is reported in-band.
fn failure(err: &GatewayError) -> Response {
    let status = if err.is_missing_prompt() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    warn!(kind = %err.kind(), error = %err, "Request failed");
    (status, Json(Failure::from(err))).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    let message = message.into();
    debug!(%message, "Rejected malformed request");
    (StatusCode::BAD_REQUEST, Json(Failure::new(message))).into_response()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Gateway;
    use crate::server::build_router;
    use axum::body::{to_bytes, Body};
    use axum::http::header::CONTENT_TYPE;
    use axum::http::Request;
    use axum::Router;
    use promptgate_core::config::schema::{ProvidersConfig, UpstreamConfig};
    use promptgate_core::config::Config;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY_LIMIT: usize = 1_048_576;

    struct TestApp {
        default: MockServer,
        pooled: MockServer,
        image: MockServer,
    }

    impl TestApp {
        async fn start() -> Self {
            Self {
                default: MockServer::start().await,
                pooled: MockServer::start().await,
                image: MockServer::start().await,
            }
        }

        fn router(&self) -> Router {
            let upstream = |base: String| UpstreamConfig {
                api_base: Some(base),
                api_key: Some(String::new()),
                timeout_secs: Some(2),
            };
            let config = Config {
                providers: ProvidersConfig {
                    default: upstream(format!("{}/dtempire-ai", self.default.uri())),
                    pooled: upstream(self.pooled.uri()),
                    image: upstream(format!("{}/api/ai-text", self.image.uri())),
                },
                ..Default::default()
            };
            let gateway = Gateway::from_config(&config).expect("gateway");
            build_router(AppState::new(gateway))
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("parse json")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("build request")
    }

    fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.into()))
            .expect("build request")
    }

    #[tokio::test]
    async fn test_ai_get_success() {
        let app = TestApp::start().await;
        Mock::given(method("GET"))
            .and(path("/deepseek"))
            .and(query_param("prompt", "hello world"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"result": [{"response": "Hi there"}]})),
            )
            .expect(1)
            .mount(&app.pooled)
            .await;

        let response = app
            .router()
            .oneshot(get("/ai?prompt=hello%20world&model=deepseek"))
            .await
            .expect("router call");
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["model"], "deepseek");
        assert_eq!(json["source"], "raqkid_api");
        assert_eq!(json["response"], "Hi there");
        assert!(json.get("fallback_from").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_ai_pooled_failure_falls_back() {
        let app = TestApp::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&app.pooled)
            .await;
        Mock::given(method("GET"))
            .and(path("/dtempire-ai"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Hi"})))
            .expect(1)
            .mount(&app.default)
            .await;

        let response = app
            .router()
            .oneshot(get("/ai?prompt=hello&model=grok"))
            .await
            .expect("router call");
        let json = json_body(response).await;

        assert_eq!(json["success"], true);
        assert_eq!(json["response"], "Hi");
        assert_eq!(json["source"], "dtempire_fallback");
        assert_eq!(json["fallback_from"], "grok");
    }

    #[tokio::test]
    async fn test_ai_both_fail_reports_details() {
        let app = TestApp::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("pool down"))
            .mount(&app.pooled)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("default down"))
            .mount(&app.default)
            .await;

        let response = app
            .router()
            .oneshot(get("/ai?prompt=hello&model=qwen"))
            .await
            .expect("router call");
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        let error = json["error"].as_str().unwrap();
        assert!(error.starts_with("All providers failed for model 'qwen'"));
        let details = json["details"].as_str().unwrap();
        assert!(details.contains("pool down"));
        assert!(details.contains("default down"));
    }

    #[tokio::test]
    async fn test_ai_missing_prompt_is_400() {
        let app = TestApp::start().await;
        for uri in ["/ai", "/ai?prompt=", "/ai?prompt=%20%20&model=grok"] {
            let response = app.router().oneshot(get(uri)).await.expect("router call");
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let json = json_body(response).await;
            assert_eq!(json["success"], false);
            assert_eq!(json["error"], "Please provide a prompt");
        }
    }

    #[tokio::test]
    async fn test_ai_unknown_model_lists_available() {
        let app = TestApp::start().await;
        let response = app
            .router()
            .oneshot(get("/ai?prompt=hi&model=gpt-99"))
            .await
            .expect("router call");
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        let error = json["error"].as_str().unwrap();
        assert!(error.contains("gpt-99"));
        assert!(error.contains("dtempire"));
        assert!(error.contains("img_stable"));
    }

    #[tokio::test]
    async fn test_ai_post_forwards_options() {
        let app = TestApp::start().await;
        Mock::given(method("GET"))
            .and(path("/dtempire-ai"))
            .and(query_param("prompt", "tell me"))
            .and(query_param("temperature", "0.2"))
            .and(query_param("max_tokens", "64"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  told  "))
            .expect(1)
            .mount(&app.default)
            .await;

        let body = json!({"prompt": "tell me", "temperature": 0.2, "max_tokens": 64});
        let response = app
            .router()
            .oneshot(post_json("/ai", body.to_string()))
            .await
            .expect("router call");
        let json = json_body(response).await;
        assert_eq!(json["model"], "dtempire");
        assert_eq!(json["source"], "dtempire_api");
        assert_eq!(json["response"], "told");
    }

    #[tokio::test]
    async fn test_ai_post_malformed_json_is_400() {
        let app = TestApp::start().await;
        let response = app
            .router()
            .oneshot(post_json("/ai", "{not json"))
            .await
            .expect("router call");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_batch_counts_and_order() {
        let app = TestApp::start().await;
        Mock::given(method("GET"))
            .and(path("/dtempire-ai"))
            .and(query_param("prompt", "a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "A"})))
            .mount(&app.default)
            .await;
        Mock::given(method("GET"))
            .and(path("/dtempire-ai"))
            .and(query_param("prompt", "b"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&app.default)
            .await;

        let response = app
            .router()
            .oneshot(post_json("/batch", json!({"prompts": ["a", "b"]}).to_string()))
            .await
            .expect("router call");
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["total"], 2);
        assert_eq!(json["processed"], 1);
        assert_eq!(json["failed"], 1);

        let results = json["results"].as_array().expect("results array");
        assert_eq!(results[0]["prompt"], "a");
        assert_eq!(results[0]["success"], true);
        assert_eq!(results[0]["response"], "A");
        assert_eq!(results[1]["prompt"], "b");
        assert_eq!(results[1]["success"], false);
        assert!(results[1]["error"].as_str().unwrap().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_batch_requires_prompts_array() {
        let app = TestApp::start().await;
        for body in [json!({}), json!({"prompts": "a"})] {
            let response = app
                .router()
                .oneshot(post_json("/batch", body.to_string()))
                .await
                .expect("router call");
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json_body(response).await["success"], false);
        }
    }

    #[tokio::test]
    async fn test_models_lists_registry() {
        let app = TestApp::start().await;
        let response = app
            .router()
            .oneshot(get("/api/models"))
            .await
            .expect("router call");
        let json = json_body(response).await;

        assert_eq!(json["success"], true);
        assert_eq!(json["default_model"], "dtempire");
        let models = json["models"].as_object().expect("models map");
        assert_eq!(models.len(), 15);
        assert!(models.contains_key("gpt5"));
        assert!(models.contains_key("img_flux"));
    }

    #[tokio::test]
    async fn test_image_endpoint() {
        let app = TestApp::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ai-text/"))
            .and(query_param("prompt", "a red fox"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "img://fox"})))
            .expect(1)
            .mount(&app.image)
            .await;

        let response = app
            .router()
            .oneshot(get("/api/image?prompt=a%20red%20fox"))
            .await
            .expect("router call");
        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["source"], "image_api");
        assert_eq!(json["response"], "img://fox");

        let response = app
            .router()
            .oneshot(get("/api/image"))
            .await
            .expect("router call");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::start().await;
        let response = app.router().oneshot(get("/health")).await.expect("router call");
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "online");
        assert!(json["service"].as_str().unwrap().starts_with("promptgate v"));
        assert_eq!(json["models"], 15);
        assert!(json["uptime"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_envelope() {
        let app = TestApp::start().await;
        let response = app.router().oneshot(get("/nope")).await.expect("router call");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["success"], false);
    }
}
