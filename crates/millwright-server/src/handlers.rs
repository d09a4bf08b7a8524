//! HTTP request handlers for the query agent.
//!
//! Implements the query and health endpoints using axum.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use millwright_agent::{Agent, AgentError};
use millwright_data::SqliteDataStore;
use millwright_domain::traits::DataAccess;
use millwright_domain::AgentResponse;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The query orchestrator
    pub agent: Arc<Agent>,
    /// Data handle, used by the health check
    pub data: Arc<Mutex<SqliteDataStore>>,
    /// Number of registered capabilities, reported by the health check
    pub capability_count: usize,
}

/// Query request body
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// The user's question
    pub message: String,

    /// Optional conversation identifier, echoed for the caller's own
    /// correlation; the server keeps no session state
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Number of registered capabilities
    pub capability_count: usize,
    /// Whether the data layer answered a probe query
    pub data_reachable: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed request input
    BadRequest(String),
    /// The orchestrator could not produce any response
    Agent(AgentError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Agent(AgentError::NoSectionsCompleted(secs)) => (
                StatusCode::GATEWAY_TIMEOUT,
                format!("no tool section completed within the {}s budget", secs),
            ),
            AppError::Agent(err @ AgentError::AllSectionsUnavailable) => {
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            AppError::Agent(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<AgentError> for AppError {
    fn from(e: AgentError) -> Self {
        AppError::Agent(e)
    }
}

/// POST /query - answer a plant question
async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<AgentResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    if let Some(conversation_id) = &request.conversation_id {
        tracing::debug!(conversation_id, "query received");
    }

    let response = state.agent.handle(&request.message).await?;
    Ok(Json(response))
}

/// GET /health - registry size and data-layer reachability
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let data = Arc::clone(&state.data);
    let data_reachable = tokio::task::spawn_blocking(move || {
        data.lock()
            .map(|store| store.get_similar_assets("health probe", 1).is_ok())
            .unwrap_or(false)
    })
    .await
    .unwrap_or(false);

    let status = if data_reachable { "healthy" } else { "degraded" };

    Json(HealthCheckResponse {
        status: status.to_string(),
        capability_count: state.capability_count,
        data_reachable,
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/health", get(health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use millwright_tools::ToolRegistry;
    use tower::ServiceExt; // for oneshot

    fn create_test_state() -> AppState {
        let store = SqliteDataStore::open_seeded().unwrap();
        let data = Arc::new(Mutex::new(store));
        let registry = Arc::new(ToolRegistry::builtin(Arc::clone(&data)));
        let capability_count = registry.len();

        AppState {
            agent: Arc::new(Agent::new(registry)),
            data,
            capability_count,
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_query_returns_response() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/query")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"message": "Is Grinder 5 on track?", "conversation_id": "shift-a"}"#,
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_message_is_bad_request() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/query")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"message": "   "}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = create_router(create_test_state());

        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
