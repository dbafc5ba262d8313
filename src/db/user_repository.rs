use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    cart::CartLine,
    user::{PublicUser, User},
};

/// Credential store plus the cart snapshot embedded in the user record.
///
/// Cart mutations read-modify-write against the user's lines with no
/// optimistic concurrency check; two concurrent edits from the same user can
/// lose an update. Callers needing stronger guarantees must add a version
/// column.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_public_user_by_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PublicUser>, sqlx::Error>;
    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error>;
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error>;
    async fn count_users(&self) -> Result<i64, sqlx::Error>;

    /// Lines in insertion order.
    async fn cart_lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, sqlx::Error>;
    /// Existing line gains one unit; otherwise a new line starts at 1.
    async fn add_cart_line(&self, user_id: Uuid, product_id: Uuid) -> Result<(), sqlx::Error>;
    /// Returns false when no line matched (the caller maps that to 404).
    async fn set_cart_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<bool, sqlx::Error>;
    async fn remove_cart_line(&self, user_id: Uuid, product_id: Uuid) -> Result<(), sqlx::Error>;
    async fn clear_cart(&self, user_id: Uuid) -> Result<(), sqlx::Error>;
}
