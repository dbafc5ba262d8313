use crate::config::Config;
use crate::db::{
    coupon_repository::CouponRepository, key_value_store::KeyValueStore,
    order_repository::OrderRepository, product_repository::ProductRepository,
    user_repository::UserRepository,
};
use crate::services::{media::MediaStore, tokens::TokenService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub coupons: Arc<dyn CouponRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub cache: Arc<dyn KeyValueStore>,
    pub media: Arc<dyn MediaStore>,
    pub tokens: TokenService,
    pub config: Arc<Config>,
}
