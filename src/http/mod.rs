pub mod handlers;
pub mod response;

use crate::alloc::AllocationEngine;
use crate::inventory::InventoryStore;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

pub type SharedEngine = Arc<AllocationEngine<Arc<dyn InventoryStore>>>;

#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
}

impl AppState {
    pub fn new(engine: AllocationEngine<Arc<dyn InventoryStore>>) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/allocate", post(handlers::allocate_handler))
        .route("/issued-records", get(handlers::issued_records_handler))
        .route("/categories", get(handlers::categories_handler))
        .with_state(state)
}
