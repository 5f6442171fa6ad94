use sqlx::PgPool;

use crate::db::models::OrderStatus;
use crate::db::queries;
use crate::error::AppError;
use crate::validation;

/// One requested line of an order: a product and how many units of it.
#[derive(Debug, Clone, Copy)]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i32,
}

/// Coordinates order placement: reserves stock for every line item inside a
/// single transaction, so an order either commits fully stocked or leaves no
/// trace. Serialization of conflicting placements is delegated to row locks
/// taken with `SELECT ... FOR UPDATE`; orders touching disjoint products do
/// not block each other.
#[derive(Clone)]
pub struct OrderService {
    pool: PgPool,
    lock_timeout_ms: u64,
}

impl OrderService {
    pub fn new(pool: PgPool, lock_timeout_ms: u64) -> Self {
        Self {
            pool,
            lock_timeout_ms,
        }
    }

    /// Places an order for `customer_id`. On success every requested quantity
    /// has been decremented from stock and the committed order id is
    /// returned. On any rejection the store is left exactly as it was.
    pub async fn place_order(
        &self,
        customer_id: i64,
        items: &[OrderLine],
    ) -> Result<i64, AppError> {
        // Validation happens before a transaction is opened.
        validation::validate_customer_id(customer_id)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let pairs: Vec<(i64, i32)> = items
            .iter()
            .map(|line| (line.product_id, line.quantity))
            .collect();
        validation::validate_line_items(&pairs)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        // Lock rows in ascending product id, so two multi-item orders can
        // never wait on each other's locks in opposite order.
        let mut items = items.to_vec();
        items.sort_by_key(|line| line.product_id);

        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        // SET LOCAL scopes the bound to this transaction only.
        sqlx::query(&format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_timeout_ms
        ))
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        let order_id = queries::insert_order(&mut tx, customer_id)
            .await
            .map_err(map_sqlx)?;

        for line in &items {
            let product = queries::get_product_for_update(&mut tx, line.product_id)
                .await
                .map_err(map_sqlx)?;

            let product = match product {
                Some(product) => product,
                None => {
                    tx.rollback().await.map_err(map_sqlx)?;
                    return Err(AppError::ProductNotFound(line.product_id));
                }
            };

            if product.stock_quantity < line.quantity {
                tx.rollback().await.map_err(map_sqlx)?;
                return Err(AppError::InsufficientStock(line.product_id));
            }

            queries::decrement_stock(&mut tx, line.product_id, line.quantity)
                .await
                .map_err(map_sqlx)?;

            // Snapshot the unit price read under the row lock; later price
            // edits must not reach this line item.
            queries::insert_order_item(
                &mut tx,
                order_id,
                line.product_id,
                line.quantity,
                &product.unit_price,
            )
            .await
            .map_err(map_sqlx)?;
        }

        queries::set_order_status(&mut tx, order_id, OrderStatus::Completed)
            .await
            .map_err(map_sqlx)?;

        tx.commit().await.map_err(map_sqlx)?;

        tracing::info!(
            "Placed order {} for customer {} ({} line items)",
            order_id,
            customer_id,
            items.len()
        );

        Ok(order_id)
    }
}

/// Postgres reports a lock_timeout expiry as SQLSTATE 55P03; surface it as a
/// retryable fault instead of a generic database error.
fn map_sqlx(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.code().as_deref() == Some("55P03") {
            return AppError::LockTimeout;
        }
    }

    AppError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_sort_by_product_id() {
        let mut lines = vec![
            OrderLine {
                product_id: 9,
                quantity: 1,
            },
            OrderLine {
                product_id: 2,
                quantity: 4,
            },
            OrderLine {
                product_id: 5,
                quantity: 2,
            },
        ];
        lines.sort_by_key(|line| line.product_id);

        let ids: Vec<i64> = lines.iter().map(|line| line.product_id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn generic_sqlx_error_maps_to_database() {
        let mapped = map_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(mapped, AppError::Database(_)));
    }
}
