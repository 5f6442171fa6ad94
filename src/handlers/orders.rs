use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::AppState;
use crate::db::models::{OrderItem, OrderStatus};
use crate::db::queries;
use crate::error::AppError;
use crate::services::orders::OrderLine;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceOrderRequest {
    pub customer_id: i64,
    pub items: Vec<LineItemPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineItemPayload {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order_id: i64,
    pub customer_id: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

pub async fn place_order(
    State(state): State<AppState>,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    // A body that does not parse into the typed request is a validation
    // failure, reported in the same error shape as every other rejection.
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.to_string()))?;

    let lines: Vec<OrderLine> = payload
        .items
        .iter()
        .map(|item| OrderLine {
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect();

    let order_id = state.orders.place_order(payload.customer_id, &lines).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order placed",
            "order_id": order_id,
        })),
    ))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let order = queries::get_order(&state.db, id)
        .await?
        .ok_or(AppError::OrderNotFound(id))?;

    let items = queries::list_order_items(&state.db, id).await?;

    Ok(Json(OrderDetail {
        order_id: order.order_id,
        customer_id: order.customer_id,
        status: order.status,
        created_at: order.created_at,
        items,
    }))
}
