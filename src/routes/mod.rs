pub mod analytics;
pub mod auth;
pub mod cart;
pub mod coupon;
pub mod products;

#[cfg(test)]
pub mod test_support;
