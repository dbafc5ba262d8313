use async_trait::async_trait;
use time::OffsetDateTime;

use crate::models::order::Order;

/// Read-only view over orders; writes happen in the external payment flow.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn count_orders(&self) -> Result<i64, sqlx::Error>;
    async fn total_revenue(&self) -> Result<f64, sqlx::Error>;
    async fn orders_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Order>, sqlx::Error>;
}
