use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::models::product::{NewProduct, Product};
use crate::responses::JsonResponse;
use crate::routes::auth::session::{require_admin, AuthSession};
use crate::services::media::public_id_from_url;
use crate::state::AppState;

pub const FEATURED_CACHE_KEY: &str = "featured_products";

const RECOMMENDATION_COUNT: i64 = 3;

/// Admin listing of the full catalog.
pub async fn get_all_products(State(state): State<AppState>, session: AuthSession) -> Response {
    if let Err(denied) = require_admin(&state, &session).await {
        return denied;
    }

    match state.products.all_products().await {
        Ok(products) => Json(json!({ "products": products })).into_response(),
        Err(err) => {
            tracing::error!(?err, "failed to list products");
            JsonResponse::server_error("Failed to load products").into_response()
        }
    }
}

/// Featured products, served from the cache when it is warm. A cache miss
/// or an unreadable entry falls through to the database and repopulates.
pub async fn get_featured_products(State(state): State<AppState>) -> Response {
    if let Ok(Some(cached)) = state.cache.get(FEATURED_CACHE_KEY).await {
        if let Ok(products) = serde_json::from_str::<Vec<Product>>(&cached) {
            return Json(products).into_response();
        }
    }

    match state.products.featured_products().await {
        Ok(products) => {
            refresh_featured_cache(&state, &products).await;
            Json(products).into_response()
        }
        Err(err) => {
            tracing::error!(?err, "failed to load featured products");
            JsonResponse::server_error("Failed to load featured products").into_response()
        }
    }
}

async fn refresh_featured_cache(state: &AppState, products: &[Product]) {
    match serde_json::to_string(products) {
        Ok(serialized) => {
            if let Err(err) = state.cache.set(FEATURED_CACHE_KEY, &serialized, None).await {
                tracing::warn!(?err, "failed to refresh featured products cache");
            }
        }
        Err(err) => tracing::warn!(?err, "failed to serialize featured products"),
    }
}

pub async fn get_products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Response {
    match state.products.products_by_category(&category).await {
        Ok(products) => Json(json!({ "products": products })).into_response(),
        Err(err) => {
            tracing::error!(?err, "failed to load category");
            JsonResponse::server_error("Failed to load products").into_response()
        }
    }
}

/// A small random sample of the catalog, trimmed to the fields the
/// storefront needs.
pub async fn get_recommended_products(State(state): State<AppState>) -> Response {
    match state.products.sample_products(RECOMMENDATION_COUNT).await {
        Ok(products) => Json(products).into_response(),
        Err(err) => {
            tracing::error!(?err, "failed to sample products");
            JsonResponse::server_error("Failed to load recommendations").into_response()
        }
    }
}

pub async fn create_product(
    State(state): State<AppState>,
    session: AuthSession,
    Json(payload): Json<NewProduct>,
) -> Response {
    if let Err(denied) = require_admin(&state, &session).await {
        return denied;
    }

    let image_url = match &payload.image {
        Some(data_uri) => match state.media.upload_image(data_uri).await {
            Ok(uploaded) => uploaded.url,
            Err(err) => {
                tracing::error!(?err, "image upload failed");
                return JsonResponse::server_error("Failed to upload product image")
                    .into_response();
            }
        },
        None => String::new(),
    };

    match state.products.create_product(&payload, &image_url).await {
        Ok(product) => (axum::http::StatusCode::CREATED, Json(product)).into_response(),
        Err(err) => {
            tracing::error!(?err, "failed to create product");
            JsonResponse::server_error("Failed to create product").into_response()
        }
    }
}

pub async fn delete_product(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(denied) = require_admin(&state, &session).await {
        return denied;
    }

    let product = match state.products.find_product_by_id(id).await {
        Ok(Some(product)) => product,
        Ok(None) => return JsonResponse::not_found("Product not found").into_response(),
        Err(err) => {
            tracing::error!(?err, "failed to load product");
            return JsonResponse::server_error("Failed to delete product").into_response();
        }
    };

    // Media cleanup is best effort. A dangling image is acceptable, a
    // product that survives deletion is not.
    if let Some(public_id) = public_id_from_url(&product.image) {
        if let Err(err) = state.media.delete_image(&public_id).await {
            tracing::warn!(?err, %public_id, "failed to delete product image");
        }
    }

    match state.products.delete_product(id).await {
        Ok(()) => JsonResponse::success("Product deleted successfully").into_response(),
        Err(err) => {
            tracing::error!(?err, "failed to delete product");
            JsonResponse::server_error("Failed to delete product").into_response()
        }
    }
}

/// Flips the featured flag and rewrites the cache so readers never see a
/// stale listing after a toggle.
pub async fn toggle_featured_product(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(denied) = require_admin(&state, &session).await {
        return denied;
    }

    let current = match state.products.find_product_by_id(id).await {
        Ok(Some(product)) => product,
        Ok(None) => return JsonResponse::not_found("Product not found").into_response(),
        Err(err) => {
            tracing::error!(?err, "failed to load product");
            return JsonResponse::server_error("Failed to update product").into_response();
        }
    };

    let updated = match state
        .products
        .set_featured(id, !current.is_featured)
        .await
    {
        Ok(product) => product,
        Err(err) => {
            tracing::error!(?err, "failed to toggle featured flag");
            return JsonResponse::server_error("Failed to update product").into_response();
        }
    };

    match state.products.featured_products().await {
        Ok(products) => refresh_featured_cache(&state, &products).await,
        Err(err) => tracing::warn!(?err, "failed to reload featured products for cache"),
    }

    Json(updated).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        extract::Request,
        http::{header, StatusCode},
        routing::{get, patch},
        Router,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::db::mock_db::MockDb;
    use crate::models::user::User;
    use crate::routes::auth::cookies::ACCESS_COOKIE;
    use crate::routes::test_support::{
        admin_user, sample_product, sample_user, test_state, test_state_with_media,
    };
    use crate::services::media::mock_media::MockMediaStore;
    use crate::state::AppState;

    use super::{
        create_product, delete_product, get_all_products, get_featured_products,
        get_recommended_products, toggle_featured_product, FEATURED_CACHE_KEY,
    };

    fn build_app(state: AppState) -> Router {
        Router::new()
            .route("/products", get(get_all_products).post(create_product))
            .route("/products/featured", get(get_featured_products))
            .route("/products/recommendations", get(get_recommended_products))
            .route(
                "/products/{id}",
                patch(toggle_featured_product).delete(delete_product),
            )
            .with_state(state)
    }

    fn access_cookie(state: &AppState, user: &User) -> String {
        let pair = state.tokens.issue(user.id).unwrap();
        format!("{}={}", ACCESS_COOKIE, pair.access_token)
    }

    async fn send(
        app: &Router,
        cookie: &str,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };
        app.clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn catalog_listing_requires_admin() {
        let user = sample_user();
        let state = test_state(MockDb::with_user(user.clone()));
        let app = build_app(state.clone());
        let cookie = access_cookie(&state, &user);

        let res = send(&app, &cookie, "GET", "/products", None).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn featured_listing_is_served_from_cache_when_warm() {
        let admin = admin_user();
        let db = MockDb::with_user(admin.clone());
        let mut featured = sample_product("Live", 10.0);
        featured.is_featured = true;
        db.products.lock().unwrap().push(featured);
        let state = test_state(db);
        let app = build_app(state.clone());

        // First read misses and populates the cache.
        let res = app
            .clone()
            .oneshot(
                Request::get("/products/featured")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(state
            .cache
            .get(FEATURED_CACHE_KEY)
            .await
            .unwrap()
            .is_some());

        // Poison the database path: a warm cache means the db is not hit.
        state.cache.set(FEATURED_CACHE_KEY, "[]", None).await.unwrap();
        let res = app
            .oneshot(
                Request::get("/products/featured")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(res).await;
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggling_featured_rewrites_the_cache() {
        let admin = admin_user();
        let db = MockDb::with_user(admin.clone());
        let product = sample_product("Widget", 10.0);
        db.products.lock().unwrap().push(product.clone());
        let state = test_state(db);
        let app = build_app(state.clone());
        let cookie = access_cookie(&state, &admin);

        let res = send(
            &app,
            &cookie,
            "PATCH",
            &format!("/products/{}", product.id),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["isFeatured"], true);

        let cached = state.cache.get(FEATURED_CACHE_KEY).await.unwrap().unwrap();
        let cached: serde_json::Value = serde_json::from_str(&cached).unwrap();
        assert_eq!(cached.as_array().unwrap().len(), 1);
        assert_eq!(cached[0]["name"], "Widget");
    }

    #[tokio::test]
    async fn creating_a_product_uploads_its_image() {
        let admin = admin_user();
        let db = MockDb::with_user(admin.clone());
        let media = MockMediaStore::new();
        let state = test_state_with_media(db, media.clone());
        let app = build_app(state.clone());
        let cookie = access_cookie(&state, &admin);

        let payload = serde_json::json!({
            "name": "Mug",
            "description": "A mug",
            "price": 12.5,
            "image": "data:image/png;base64,AAAA",
            "category": "kitchen",
        });
        let res = send(&app, &cookie, "POST", "/products", Some(payload)).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let json = body_json(res).await;
        assert_eq!(json["name"], "Mug");
        assert!(json["image"]
            .as_str()
            .unwrap()
            .starts_with("https://media.test/products/"));
        assert_eq!(media.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_product_removes_its_image_by_public_id() {
        let admin = admin_user();
        let db = MockDb::with_user(admin.clone());
        let mut product = sample_product("Widget", 10.0);
        product.image = "https://media.test/products/widget-1.png".into();
        db.products.lock().unwrap().push(product.clone());
        let media = MockMediaStore::new();
        let state = test_state_with_media(db, media.clone());
        let app = build_app(state.clone());
        let cookie = access_cookie(&state, &admin);

        let res = send(
            &app,
            &cookie,
            "DELETE",
            &format!("/products/{}", product.id),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            media.deletes.lock().unwrap().as_slice(),
            ["products/widget-1"]
        );
    }

    #[tokio::test]
    async fn deleting_a_missing_product_is_not_found() {
        let admin = admin_user();
        let state = test_state(MockDb::with_user(admin.clone()));
        let app = build_app(state.clone());
        let cookie = access_cookie(&state, &admin);

        let res = send(
            &app,
            &cookie,
            "DELETE",
            &format!("/products/{}", Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn recommendations_return_at_most_three_products() {
        let user = sample_user();
        let db = MockDb::with_user(user.clone());
        for i in 0..5 {
            db.products
                .lock()
                .unwrap()
                .push(sample_product(&format!("P{}", i), 1.0));
        }
        let state = test_state(db);
        let app = build_app(state.clone());

        let res = app
            .oneshot(
                Request::get("/products/recommendations")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json.as_array().unwrap().len(), 3);
    }
}
