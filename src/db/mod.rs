pub mod coupon_repository;
pub mod key_value_store;
pub mod mock_db;
pub mod order_repository;
pub mod postgres_coupon_repository;
pub mod postgres_order_repository;
pub mod postgres_product_repository;
pub mod postgres_user_repository;
pub mod product_repository;
pub mod user_repository;
