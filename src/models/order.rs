use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Orders are written by the payment flow, which lives outside this service.
/// Analytics only ever reads them.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct Order {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub total_amount: f64,
    pub created_at: time::OffsetDateTime,
}
