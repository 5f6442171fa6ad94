use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Product {0} not found")]
    ProductNotFound(i64),

    #[error("Insufficient stock for product {0}")]
    InsufficientStock(i64),

    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("Timed out waiting for a product row lock")]
    LockTimeout,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ProductNotFound(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            AppError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            AppError::LockTimeout => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_status_code() {
        let error = AppError::Validation("items must not be empty".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_insufficient_stock_status_code() {
        let error = AppError::InsufficientStock(42);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_insufficient_stock_names_product() {
        let error = AppError::InsufficientStock(7);
        assert_eq!(error.to_string(), "Insufficient stock for product 7");
    }

    #[test]
    fn test_product_not_found_status_code() {
        let error = AppError::ProductNotFound(9);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_order_not_found_status_code() {
        let error = AppError::OrderNotFound(1);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_database_error_status_code() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_lock_timeout_status_code() {
        let error = AppError::LockTimeout;
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let error = AppError::Validation("quantity must be positive".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_database_error_response() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
