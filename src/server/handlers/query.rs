use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::core::errors::ApiError;
use crate::rag::orchestrator::QueryRequest;
use crate::state::AppState;

pub async fn run_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.orchestrator.handle(payload).await?;
    Ok(Json(response))
}
