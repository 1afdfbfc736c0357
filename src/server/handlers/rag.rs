use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.query.trim().is_empty() && payload.keywords.is_empty() {
        return Err(ApiError::BadRequest(
            "query or keywords is required".to_string(),
        ));
    }

    let result = state
        .rag
        .search_all(&payload.query, &payload.keywords)
        .await?;
    Ok(Json(result))
}

pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.rag.status())
}

pub async fn reload(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let collections = state.rag.reload().await?;
    Ok(Json(json!({
        "status": "reloaded",
        "procedures": collections.procedures.len(),
        "standards": collections.standards.len(),
        "exams": collections.exams.len(),
    })))
}
