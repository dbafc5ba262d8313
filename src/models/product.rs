use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    pub id: uuid::Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub category: String,
    #[serde(rename = "isFeatured")]
    pub is_featured: bool,
    pub created_at: time::OffsetDateTime,
}

/// Trimmed projection served by /products/recommendations.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct RecommendedProduct {
    pub id: uuid::Uuid,
    pub name: String,
    pub description: String,
    pub image: String,
    pub price: f64,
}

#[derive(Deserialize, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Optional base64 data URI; uploaded to the media host before insert.
    #[serde(default)]
    pub image: Option<String>,
    pub category: String,
}
