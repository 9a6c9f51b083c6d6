use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};

use crate::config::{EngineConfig, ServerConfig};
use crate::data::{AssignmentResult, InstanceInput, SolveRequest};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::instance::Instance;
use crate::validator::ValidationReport;

type HandlerError = (StatusCode, String);

fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Instance(_) | EngineError::Config(_) => StatusCode::BAD_REQUEST,
        EngineError::Invalid(_)
        | EngineError::RequiredUnsatisfied(_)
        | EngineError::LoadBalanceTooLarge { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: EngineError) -> HandlerError {
    let body = match &err {
        EngineError::Invalid(report) => {
            serde_json::to_string(report).unwrap_or_else(|_| err.to_string())
        }
        _ => err.to_string(),
    };
    (status_for(&err), body)
}

fn run(instance: InstanceInput, config: EngineConfig) -> Result<AssignmentResult, EngineError> {
    let instance = Instance::try_from(instance)?;
    Engine::new(config)?.solve(&instance)
}

async fn solve_handler(
    Json(request): Json<SolveRequest>,
) -> Result<Json<AssignmentResult>, HandlerError> {
    // Solving is CPU bound; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || run(request.instance, request.config))
        .await
        .map_err(|e| {
            error!("Solve task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    outcome.map(Json).map_err(reject)
}

async fn validate_handler(
    Json(input): Json<InstanceInput>,
) -> Result<Json<ValidationReport>, HandlerError> {
    let instance = Instance::try_from(input).map_err(|e| reject(e.into()))?;
    Ok(Json(crate::validator::validate(&instance)))
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn router() -> Router {
    Router::new()
        .route("/v1/assignment/solve", post(solve_handler))
        .route("/v1/assignment/validate", post(validate_handler))
        .route("/health", get(health_handler))
}

pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, router()).await
}
