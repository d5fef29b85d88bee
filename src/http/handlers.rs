use crate::alloc::{Allocation, AllocationEngine, CategoryStats};
use crate::error::AllocError;
use crate::http::AppState;
use crate::http::response::ApiError;
use crate::inventory::{ContactRecord, InventoryStore};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    pub topic: String,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct IssuedQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct IssuedRecords {
    pub records: Vec<ContactRecord>,
}

#[derive(Debug, Serialize)]
pub struct Categories {
    pub categories: Vec<CategoryStats>,
}

type Engine = AllocationEngine<Arc<dyn InventoryStore>>;

/// The engine blocks on the store; keep it off the async workers.
async fn run_blocking<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Engine) -> Result<T, AllocError> + Send + 'static,
    T: Send + 'static,
{
    let engine = Arc::clone(&state.engine);
    let joined = tokio::task::spawn_blocking(move || f(&engine)).await;
    match joined {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            error!(error = %e, "engine task failed");
            Err(ApiError::Internal)
        }
    }
}

pub(crate) async fn health_handler() -> Json<Value> {
    Json(json!({"status": "ok", "service": "inventory-alloc"}))
}

pub(crate) async fn allocate_handler(
    State(state): State<AppState>,
    payload: Result<Json<AllocateRequest>, JsonRejection>,
) -> Result<Json<Allocation>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidInput(e.body_text()))?;
    let allocation = run_blocking(&state, move |engine| engine.allocate(&req.topic, req.count)).await?;
    Ok(Json(allocation))
}

pub(crate) async fn issued_records_handler(
    State(state): State<AppState>,
    query: Result<Query<IssuedQuery>, QueryRejection>,
) -> Result<Json<IssuedRecords>, ApiError> {
    let Query(q) = query.map_err(|e| ApiError::InvalidInput(e.body_text()))?;
    let records = run_blocking(&state, move |engine| engine.issued_records(q.year, q.month)).await?;
    Ok(Json(IssuedRecords { records }))
}

pub(crate) async fn categories_handler(
    State(state): State<AppState>,
) -> Result<Json<Categories>, ApiError> {
    let categories = run_blocking(&state, |engine| engine.category_stats()).await?;
    Ok(Json(Categories { categories }))
}
