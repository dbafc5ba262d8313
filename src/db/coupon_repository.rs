use async_trait::async_trait;
use uuid::Uuid;

use crate::models::coupon::Coupon;

#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// The caller's single active coupon, if any.
    async fn find_active_coupon(&self, user_id: Uuid) -> Result<Option<Coupon>, sqlx::Error>;
    /// Matches on `{code, user_id, is_active: true}` only.
    async fn find_active_coupon_by_code(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<Option<Coupon>, sqlx::Error>;
    async fn deactivate_coupon(&self, coupon_id: Uuid) -> Result<(), sqlx::Error>;
}
