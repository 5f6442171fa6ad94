use sqlx::{PgPool, Postgres, Result, Transaction as SqlxTransaction};
use sqlx::types::BigDecimal;
use crate::db::models::{Order, OrderItem, OrderStatus, Product};

// --- Product queries ---

/// Fetches a product row and holds an exclusive lock on it for the rest of
/// the enclosing transaction. Concurrent reservations of the same product
/// serialize here.
pub async fn get_product_for_update(
    executor: &mut SqlxTransaction<'_, Postgres>,
    product_id: i64,
) -> Result<Option<Product>> {
    sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE product_id = $1 FOR UPDATE",
    )
    .bind(product_id)
    .fetch_optional(&mut **executor)
    .await
}

/// Caller must hold the row lock from `get_product_for_update`.
pub async fn decrement_stock(
    executor: &mut SqlxTransaction<'_, Postgres>,
    product_id: i64,
    quantity: i32,
) -> Result<()> {
    sqlx::query(
        "UPDATE products SET stock_quantity = stock_quantity - $2 WHERE product_id = $1",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(&mut **executor)
    .await?;

    Ok(())
}

pub async fn get_product(pool: &PgPool, product_id: i64) -> Result<Option<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE product_id = $1")
        .bind(product_id)
        .fetch_optional(pool)
        .await
}

// --- Order queries ---

/// Inserts an order in `processing` status and returns its assigned id.
/// The row only becomes visible outside the transaction on commit.
pub async fn insert_order(
    executor: &mut SqlxTransaction<'_, Postgres>,
    customer_id: i64,
) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (customer_id, status) VALUES ($1, 'processing') RETURNING order_id",
    )
    .bind(customer_id)
    .fetch_one(&mut **executor)
    .await
}

pub async fn insert_order_item(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: i64,
    product_id: i64,
    quantity: i32,
    unit_price: &BigDecimal,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_id, quantity, unit_price)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(unit_price)
    .execute(&mut **executor)
    .await?;

    Ok(())
}

pub async fn set_order_status(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: i64,
    status: OrderStatus,
) -> Result<()> {
    sqlx::query("UPDATE orders SET status = $2 WHERE order_id = $1")
        .bind(order_id)
        .bind(status)
        .execute(&mut **executor)
        .await?;

    Ok(())
}

pub async fn get_order(pool: &PgPool, order_id: i64) -> Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_order_items(pool: &PgPool, order_id: i64) -> Result<Vec<OrderItem>> {
    sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY order_item_id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
}
