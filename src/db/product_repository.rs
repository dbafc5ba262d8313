use async_trait::async_trait;
use uuid::Uuid;

use crate::models::product::{NewProduct, Product, RecommendedProduct};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn all_products(&self) -> Result<Vec<Product>, sqlx::Error>;
    async fn featured_products(&self) -> Result<Vec<Product>, sqlx::Error>;
    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, sqlx::Error>;
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, sqlx::Error>;
    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>, sqlx::Error>;
    /// Random sample of `count` rows for the recommendations rail.
    async fn sample_products(&self, count: i64) -> Result<Vec<RecommendedProduct>, sqlx::Error>;
    async fn create_product(
        &self,
        payload: &NewProduct,
        image_url: &str,
    ) -> Result<Product, sqlx::Error>;
    async fn delete_product(&self, id: Uuid) -> Result<(), sqlx::Error>;
    async fn set_featured(&self, id: Uuid, is_featured: bool) -> Result<Product, sqlx::Error>;
    async fn count_products(&self) -> Result<i64, sqlx::Error>;
}
