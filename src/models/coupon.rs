use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user-scoped, time-bounded percentage discount. A user has at most one
/// active coupon at a time, enforced by a partial unique index on
/// `coupons (user_id) WHERE is_active`.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct Coupon {
    pub id: uuid::Uuid,
    pub code: String,
    #[serde(rename = "discountPercentage")]
    pub discount_percentage: f64,
    #[serde(rename = "expirationDate", with = "time::serde::rfc3339")]
    pub expiration_date: time::OffsetDateTime,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "userId")]
    pub user_id: uuid::Uuid,
}
