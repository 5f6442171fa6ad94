pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod services;
pub mod validation;

use axum::{Router, routing::{get, post}};
use crate::services::orders::OrderService;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub orders: OrderService,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/orders", post(handlers::orders::place_order))
        .route("/orders/:id", get(handlers::orders::get_order))
        .with_state(state)
}
