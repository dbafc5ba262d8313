use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::product::{NewProduct, Product, RecommendedProduct};

use super::product_repository::ProductRepository;

const PRODUCT_COLUMNS: &str = "id, name, description, price, image, category, is_featured, created_at";

pub struct PostgresProductRepository {
    pub pool: PgPool,
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn all_products(&self) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn featured_products(&self) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_featured ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category = $1 ORDER BY created_at DESC"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
    }

    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn sample_products(&self, count: i64) -> Result<Vec<RecommendedProduct>, sqlx::Error> {
        sqlx::query_as::<_, RecommendedProduct>(
            r#"
            SELECT id, name, description, image, price
            FROM products
            ORDER BY RANDOM()
            LIMIT $1
            "#,
        )
        .bind(count)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_product(
        &self,
        payload: &NewProduct,
        image_url: &str,
    ) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (name, description, price, image, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(image_url)
        .bind(&payload.category)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_featured(&self, id: Uuid, is_featured: bool) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET is_featured = $2
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_featured)
        .fetch_one(&self.pool)
        .await
    }

    async fn count_products(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
    }
}
