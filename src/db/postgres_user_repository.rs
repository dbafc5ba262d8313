use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    cart::CartLine,
    user::{PublicUser, User},
};

use super::user_repository::UserRepository;

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, role, created_at
            FROM users
            WHERE email = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_public_user_by_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PublicUser>, sqlx::Error> {
        sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, email, name, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, LOWER($2), $3, 'customer'::user_role)
            RETURNING id, email, name, password_hash, role, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }

    async fn count_users(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
    }

    async fn cart_lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, sqlx::Error> {
        sqlx::query_as::<_, CartLine>(
            r#"
            SELECT product_id, quantity
            FROM cart_items
            WHERE user_id = $1
            ORDER BY added_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn add_cart_line(&self, user_id: Uuid, product_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + 1
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_cart_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<bool, sqlx::Error> {
        // Zero-quantity lines are deleted, never stored.
        let result = if quantity == 0 {
            sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?
        } else {
            sqlx::query(
                r#"
                UPDATE cart_items
                SET quantity = $3
                WHERE user_id = $1 AND product_id = $2
                "#,
            )
            .bind(user_id)
            .bind(product_id)
            .bind(quantity)
            .execute(&self.pool)
            .await?
        };
        Ok(result.rows_affected() > 0)
    }

    async fn remove_cart_line(&self, user_id: Uuid, product_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_cart(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
