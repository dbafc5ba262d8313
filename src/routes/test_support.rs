use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::{Config, MediaSettings};
use crate::db::key_value_store::MemoryKeyValueStore;
use crate::db::mock_db::MockDb;
use crate::models::product::Product;
use crate::models::user::{User, UserRole};
use crate::services::media::mock_media::MockMediaStore;
use crate::services::tokens::TokenService;
use crate::state::AppState;
use crate::utils::jwt::JwtKeys;

pub fn sample_user() -> User {
    User {
        id: Uuid::new_v4(),
        email: "test@example.com".into(),
        name: "Test User".into(),
        password_hash: "hash".into(),
        role: UserRole::Customer,
        created_at: OffsetDateTime::now_utc(),
    }
}

pub fn admin_user() -> User {
    User {
        role: UserRole::Admin,
        email: "admin@example.com".into(),
        ..sample_user()
    }
}

pub fn sample_product(name: &str, price: f64) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.into(),
        description: format!("{} description", name),
        price,
        image: "https://media.test/products/sample.png".into(),
        category: "gadgets".into(),
        is_featured: false,
        created_at: OffsetDateTime::now_utc(),
    }
}

fn test_config() -> Config {
    Config {
        database_url: String::new(),
        frontend_origin: "http://localhost".into(),
        auth_cookie_secure: true,
        port: 0,
        media: MediaSettings {
            cloud_name: "stub".into(),
            api_key: "stub".into(),
            api_secret: "stub".into(),
        },
    }
}

pub fn test_state(db: MockDb) -> AppState {
    test_state_with_media(db, MockMediaStore::new())
}

/// One `MockDb` backs every repository trait; the KV store backs both the
/// refresh-token registry and the featured cache, exactly like production.
pub fn test_state_with_media(db: MockDb, media: MockMediaStore) -> AppState {
    let db = Arc::new(db);
    let cache = Arc::new(MemoryKeyValueStore::new());

    let access = JwtKeys::from_secret("0123456789abcdef0123456789abcdef")
        .expect("test access secret should be valid");
    let refresh = JwtKeys::from_secret("fedcba9876543210fedcba9876543210")
        .expect("test refresh secret should be valid");
    let tokens = TokenService::new(Arc::new(access), Arc::new(refresh), cache.clone());

    AppState {
        db: db.clone(),
        products: db.clone(),
        coupons: db.clone(),
        orders: db,
        cache,
        media: Arc::new(media),
        tokens,
        config: Arc::new(test_config()),
    }
}
