mod config;
mod db;
mod models;
mod responses;
mod routes;
mod services;
mod state;
pub mod utils;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::{
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use config::Config;
use db::key_value_store::MemoryKeyValueStore;
use db::postgres_coupon_repository::PostgresCouponRepository;
use db::postgres_order_repository::PostgresOrderRepository;
use db::postgres_product_repository::PostgresProductRepository;
use db::postgres_user_repository::PostgresUserRepository;
use responses::JsonResponse;
use routes::analytics::get_analytics;
use routes::auth::{handle_login, handle_logout, handle_profile, handle_refresh, handle_signup};
use routes::cart::{add_to_cart, get_cart, remove_from_cart, update_quantity};
use routes::coupon::{get_coupon, validate_coupon};
use routes::products::{
    create_product, delete_product, get_all_products, get_featured_products,
    get_products_by_category, get_recommended_products, toggle_featured_product,
};
use services::media::cloudinary::CloudinaryMediaStore;
use services::tokens::TokenService;
use sqlx::PgPool;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use utils::jwt::JwtKeys;

use crate::db::{
    coupon_repository::CouponRepository, order_repository::OrderRepository,
    product_repository::ProductRepository, user_repository::UserRepository,
};
use crate::state::AppState;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let rate_limit_ms: u64 = std::env::var("RATE_LIMITER_MILLISECONDS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        // Default: 200ms/token (~5 req/sec)
        .unwrap_or(200);
    let rate_limit_burst: u32 = std::env::var("RATE_LIMITER_BURST")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(20);
    let global_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(rate_limit_ms)
            .burst_size(rate_limit_burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .unwrap(),
    );

    let rate_limit_auth_s: u64 = std::env::var("RATE_LIMITER_AUTH_SECONDS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1);
    let rate_limit_auth_burst: u32 = std::env::var("RATE_LIMITER_AUTH_BURST")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(10);
    // Stricter limiter for /api/auth/*
    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(rate_limit_auth_s)
            .burst_size(rate_limit_auth_burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .unwrap(),
    );

    // Background task to cleanup old IPs
    let global_limiter = global_governor_conf.limiter().clone();
    let auth_limiter = auth_governor_conf.limiter().clone();
    std::thread::spawn(move || {
        let interval = std::time::Duration::from_secs(60);
        loop {
            std::thread::sleep(interval);
            global_limiter.retain_recent();
            auth_limiter.retain_recent();
        }
    });

    let config = Arc::new(Config::from_env());

    let pg_pool = establish_connection(&config.database_url).await;
    let user_repo = Arc::new(PostgresUserRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn UserRepository>;
    let product_repo = Arc::new(PostgresProductRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn ProductRepository>;
    let coupon_repo = Arc::new(PostgresCouponRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn CouponRepository>;
    let order_repo = Arc::new(PostgresOrderRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn OrderRepository>;

    let access_keys =
        Arc::new(JwtKeys::from_env("ACCESS_TOKEN_SECRET").expect("Invalid ACCESS_TOKEN_SECRET"));
    let refresh_keys =
        Arc::new(JwtKeys::from_env("REFRESH_TOKEN_SECRET").expect("Invalid REFRESH_TOKEN_SECRET"));

    // One keyed store backs both the refresh-token registry and the
    // featured-products cache.
    let kv_store = Arc::new(MemoryKeyValueStore::new());
    let tokens = TokenService::new(access_keys, refresh_keys, kv_store.clone());

    let media = Arc::new(CloudinaryMediaStore::new(
        reqwest::Client::new(),
        &config.media,
    ));

    let state = AppState {
        db: user_repo,
        products: product_repo,
        coupons: coupon_repo,
        orders: order_repo,
        cache: kv_store,
        media,
        tokens,
        config: config.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(config.frontend_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    let auth_routes = Router::new()
        .route("/signup", post(handle_signup))
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/refresh-token", post(handle_refresh))
        .route("/profile", get(handle_profile))
        .layer(GovernorLayer {
            config: auth_governor_conf.clone(),
        });

    let product_routes = Router::new()
        .route("/", get(get_all_products).post(create_product))
        .route("/featured", get(get_featured_products))
        .route("/category/{category}", get(get_products_by_category))
        .route("/recommendations", get(get_recommended_products))
        .route(
            "/{id}",
            axum::routing::patch(toggle_featured_product).delete(delete_product),
        );

    let cart_routes = Router::new()
        .route(
            "/",
            get(get_cart).post(add_to_cart).delete(remove_from_cart),
        )
        .route("/{id}", put(update_quantity));

    let coupon_routes = Router::new()
        .route("/", get(get_coupon))
        .route("/validate", get(validate_coupon));

    let app = Router::new()
        .route("/", get(root))
        .nest("/api/auth", auth_routes)
        .nest("/api/products", product_routes)
        .nest("/api/cart", cart_routes)
        .nest("/api/coupon", coupon_routes)
        .route("/api/analytics", get(get_analytics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer {
            config: global_governor_conf.clone(),
        })
        .layer(cors);

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    let listener = TcpListener::bind(addr).await.unwrap();
    info!("Listening on http://{}", addr);
    axum::serve(listener, make_service).await.unwrap();
}

/// A simple root route.
async fn root() -> Response {
    JsonResponse::success("Oxcart API is running").into_response()
}

/// Establish a connection to the database and verify it.
async fn establish_connection(database_url: &str) -> PgPool {
    let pool = PgPool::connect(database_url)
        .await
        .expect("Failed to connect to the database");

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .expect("Failed to verify database connection");

    info!("Successfully connected to the database");
    pool
}
