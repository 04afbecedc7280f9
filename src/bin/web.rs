//! Exam Cram Buddy Web UI
//!
//! 启动: cargo run --bin cram-web --features web
//! 浏览器访问 http://127.0.0.1:8501

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use cram::agent::create_controller;
use cram::config::{load_config, resolve_api_key, AppConfig};
use cram::core::{Controller, CramError, Phase, SessionView, TurnOutcome};
use cram::session::SessionStore;
use cram::tutor::ReportCard;

struct AppState {
    config: AppConfig,
    /// 没有 API Key 时为 None；POST /api/credential 之后才有
    controller: RwLock<Option<Arc<Controller>>>,
    store: SessionStore,
}

#[derive(Deserialize)]
struct ChatRequest {
    session_id: Option<String>,
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    session_id: String,
    phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<ReportCard>,
}

#[derive(Deserialize)]
struct SessionQuery {
    session_id: String,
}

#[derive(Deserialize)]
struct CredentialRequest {
    api_key: String,
}

#[derive(Serialize)]
struct StatusResponse {
    title: String,
    credential: bool,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn error_status(e: &CramError) -> StatusCode {
    match e {
        CramError::MissingCredential => StatusCode::PRECONDITION_FAILED,
        CramError::EmptyInput => StatusCode::BAD_REQUEST,
        CramError::SessionTerminated | CramError::HandoffPending => StatusCode::CONFLICT,
        CramError::AgentUnavailable(_)
        | CramError::AgentProtocolError(_)
        | CramError::UnknownCapability(_)
        | CramError::ToolFailed(_) => StatusCode::BAD_GATEWAY,
        CramError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(e: CramError) -> (StatusCode, String) {
    (error_status(&e), e.to_string())
}

async fn controller(state: &AppState) -> Result<Arc<Controller>, (StatusCode, String)> {
    state
        .controller
        .read()
        .await
        .clone()
        .ok_or_else(|| api_error(CramError::MissingCredential))
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/status", get(api_status))
        .route("/api/credential", post(api_credential))
        .route("/api/chat", post(api_chat))
        .route("/api/history", get(api_history))
        .route("/api/session/reset", post(api_session_reset))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cram::observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let controller = match resolve_api_key(&cfg) {
        Some(key) => Some(Arc::new(create_controller(&cfg, &key)?)),
        None => {
            tracing::warn!(
                "{} not set; waiting for an API key from the page",
                cfg.llm.api_key_env
            );
            None
        }
    };

    let state = Arc::new(AppState {
        store: SessionStore::new(cfg.session.idle_timeout_secs),
        controller: RwLock::new(controller),
        config: cfg.clone(),
    });

    // 定期清理空闲会话（每 5 分钟）
    let cleanup_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = cleanup_state.store.cleanup_expired().await;
            if removed > 0 {
                tracing::info!("expired sessions removed: {}", removed);
            }
        }
    });

    let port = std::env::var("CRAM_WEB_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(cfg.web.port);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Exam Cram Web UI: http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// GET /api/status：页面标题与是否已有 API Key
async fn api_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        title: state.config.app.name.clone(),
        credential: state.controller.read().await.is_some(),
    })
}

/// POST /api/credential：页面输入的 API Key，成功后构建控制器
async fn api_credential(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let controller = create_controller(&state.config, &req.api_key).map_err(api_error)?;
    *state.controller.write().await = Some(Arc::new(controller));
    tracing::info!("API key provided from page");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/history：返回会话记录；新会话在这里拿到开场问候
async fn api_history(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SessionQuery>,
) -> ApiResult<SessionView> {
    let controller = controller(&state).await?;
    let session = state.store.get_or_create(&q.session_id).await;
    let mut guard = session.lock().await;
    controller.ensure_started(&mut guard).await.map_err(api_error)?;
    Ok(Json(guard.view()))
}

/// POST /api/chat：一轮对话；失败时记录里只保留用户消息
async fn api_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    let controller = controller(&state).await?;
    let session_id = req
        .session_id
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let session = state.store.get_or_create(&session_id).await;
    let mut guard = session.lock().await;

    let outcome = controller
        .submit(&mut guard, &req.message)
        .await
        .map_err(api_error)?;
    let (reply, report) = match outcome {
        TurnOutcome::Reply(text) => (Some(text), None),
        TurnOutcome::Report(card) => (None, Some(card)),
    };
    Ok(Json(ChatResponse {
        session_id,
        phase: guard.phase(),
        reply,
        report,
    }))
}

/// POST /api/session/reset：清空记录并重新问候
async fn api_session_reset(
    State(state): State<Arc<AppState>>,
    Json(q): Json<SessionQuery>,
) -> ApiResult<SessionView> {
    let controller = controller(&state).await?;
    let session = state.store.get_or_create(&q.session_id).await;
    let mut guard = session.lock().await;
    controller.reset(&mut guard).await.map_err(api_error)?;
    Ok(Json(guard.view()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use cram::agent::create_controller_with;
    use cram::llm::MockLlmClient;
    use tower::ServiceExt;

    fn state_with(controller: Option<Controller>) -> Arc<AppState> {
        Arc::new(AppState {
            config: AppConfig::default(),
            controller: RwLock::new(controller.map(Arc::new)),
            store: SessionStore::default(),
        })
    }

    fn mock_state(tutor: &Arc<MockLlmClient>, grader: &Arc<MockLlmClient>) -> Arc<AppState> {
        state_with(Some(create_controller_with(
            &AppConfig::default(),
            tutor.clone(),
            grader.clone(),
        )))
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_chat_without_credential_is_blocked() {
        let app = router(state_with(None));
        let (status, _) = post_json(app, "/api/chat", serde_json::json!({"message": "hi"})).await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    }

    #[tokio::test]
    async fn test_chat_round_and_report() {
        let tutor = Arc::new(MockLlmClient::with_replies(["What subject?", "Name an organelle."]));
        let grader = Arc::new(MockLlmClient::with_replies(["Subject: Biology\nFinal Grade: B"]));
        let state = state_with(Some(create_controller_with(&AppConfig::default(), tutor, grader)));

        let (status, body) = post_json(
            router(state.clone()),
            "/api/chat",
            serde_json::json!({"session_id": "web-1", "message": "Biology"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Name an organelle.");
        assert_eq!(body["phase"], "awaiting_input");

        let (status, body) = post_json(
            router(state.clone()),
            "/api/chat",
            serde_json::json!({"session_id": "web-1", "message": "finish"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "terminated");
        assert_eq!(body["report"]["grade"], "B");

        let (status, _) = post_json(
            router(state),
            "/api/chat",
            serde_json::json!({"session_id": "web-1", "message": "again"}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_credential_builds_controller() {
        let state = state_with(None);
        let (_, body) = get_json(router(state.clone()), "/api/status").await;
        assert_eq!(body["credential"], false);
        assert_eq!(body["title"], "Exam Cram Buddy");

        let (status, _) = post_json(
            router(state.clone()),
            "/api/credential",
            serde_json::json!({"api_key": "   "}),
        )
        .await;
        assert_eq!(status, StatusCode::PRECONDITION_FAILED);

        let (status, _) = post_json(
            router(state.clone()),
            "/api/credential",
            serde_json::json!({"api_key": "test-key"}),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = get_json(router(state), "/api/status").await;
        assert_eq!(body["credential"], true);
    }

    #[tokio::test]
    async fn test_history_greets_new_session() {
        let tutor = Arc::new(MockLlmClient::with_replies(["Hello! What subject are we studying?"]));
        let grader = Arc::new(MockLlmClient::new());
        let state = mock_state(&tutor, &grader);

        let (status, body) = get_json(router(state.clone()), "/api/history?session_id=web-2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session_id"], "web-2");
        assert_eq!(body["phase"], "awaiting_input");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "agent");
        assert_eq!(messages[0]["content"], "Hello! What subject are we studying?");

        // 再次读取不会重复问候
        let (_, body) = get_json(router(state), "/api/history?session_id=web-2").await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(tutor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_reset_leaves_only_fresh_greeting() {
        let tutor = Arc::new(MockLlmClient::with_replies([
            "What subject?",
            "Define osmosis.",
            "Fresh start! What subject?",
        ]));
        let grader = Arc::new(MockLlmClient::new());
        let state = mock_state(&tutor, &grader);

        let (status, _) = post_json(
            router(state.clone()),
            "/api/chat",
            serde_json::json!({"session_id": "web-3", "message": "Biology"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = post_json(
            router(state),
            "/api/session/reset",
            serde_json::json!({"session_id": "web-3"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "awaiting_input");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["content"], "Fresh start! What subject?");
    }

    #[tokio::test]
    async fn test_failed_turn_returns_bad_gateway_and_keeps_user_message() {
        let tutor = Arc::new(MockLlmClient::with_replies(["What subject?"]));
        tutor.push_failure("503 service unavailable");
        let grader = Arc::new(MockLlmClient::new());
        let state = mock_state(&tutor, &grader);

        let (status, _) = post_json(
            router(state.clone()),
            "/api/chat",
            serde_json::json!({"session_id": "web-4", "message": "Chemistry"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, body) = get_json(router(state), "/api/history?session_id=web-4").await;
        assert_eq!(status, StatusCode::OK);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Chemistry");
    }
}
