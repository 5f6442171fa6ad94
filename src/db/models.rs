use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::BigDecimal;

#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub product_id: i64,
    pub name: String,
    pub description: String,
    pub unit_price: BigDecimal,
    pub stock_quantity: i32,
}

/// An order is inserted in `Processing` and flipped to `Completed` inside the
/// same transaction that reserves its stock. There is no failed state: a
/// placement that cannot be satisfied is rolled back and leaves no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Completed,
}

#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub customer_id: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_item_id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    /// Product price captured at reservation time; later price edits do not
    /// touch it.
    pub unit_price: BigDecimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Completed).unwrap(),
            r#""completed""#
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            r#""processing""#
        );
    }
}
