use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::models::order::Order;

use super::order_repository::OrderRepository;

pub struct PostgresOrderRepository {
    pub pool: PgPool,
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn count_orders(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await
    }

    async fn total_revenue(&self) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar("SELECT COALESCE(SUM(total_amount), 0) FROM orders")
            .fetch_one(&self.pool)
            .await
    }

    async fn orders_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, total_amount, created_at
            FROM orders
            WHERE created_at BETWEEN $1 AND $2
            ORDER BY created_at
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }
}
