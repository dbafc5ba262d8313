use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::coupon::Coupon;

use super::coupon_repository::CouponRepository;

pub struct PostgresCouponRepository {
    pub pool: PgPool,
}

#[async_trait]
impl CouponRepository for PostgresCouponRepository {
    async fn find_active_coupon(&self, user_id: Uuid) -> Result<Option<Coupon>, sqlx::Error> {
        sqlx::query_as::<_, Coupon>(
            r#"
            SELECT id, code, discount_percentage, expiration_date, is_active, user_id
            FROM coupons
            WHERE user_id = $1 AND is_active
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_active_coupon_by_code(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<Option<Coupon>, sqlx::Error> {
        sqlx::query_as::<_, Coupon>(
            r#"
            SELECT id, code, discount_percentage, expiration_date, is_active, user_id
            FROM coupons
            WHERE user_id = $1 AND code = $2 AND is_active
            "#,
        )
        .bind(user_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
    }

    async fn deactivate_coupon(&self, coupon_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE coupons SET is_active = FALSE WHERE id = $1")
            .bind(coupon_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
