use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{
    cart::CartLine,
    coupon::Coupon,
    order::Order,
    product::{NewProduct, Product, RecommendedProduct},
    user::{PublicUser, User, UserRole},
};

use super::{
    coupon_repository::CouponRepository, order_repository::OrderRepository,
    product_repository::ProductRepository, user_repository::UserRepository,
};

/// Hand-rolled in-memory stand-in for every repository trait. Handler tests
/// seed the fields they care about and leave the rest defaulted.
#[derive(Default)]
pub struct MockDb {
    pub find_user_result: Option<User>,
    pub email_taken: bool,
    pub should_fail: bool,
    pub created_users: Mutex<Vec<User>>,
    pub cart: Mutex<Vec<CartLine>>,
    pub products: Mutex<Vec<Product>>,
    pub coupons: Mutex<Vec<Coupon>>,
    pub orders: Mutex<Vec<Order>>,
}

impl MockDb {
    pub fn with_user(user: User) -> Self {
        MockDb {
            find_user_result: Some(user),
            ..Default::default()
        }
    }

    fn fail_check(&self) -> Result<(), sqlx::Error> {
        if self.should_fail {
            return Err(sqlx::Error::Protocol("Mock DB failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .find_user_result
            .as_ref()
            .filter(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_public_user_by_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PublicUser>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .find_user_result
            .as_ref()
            .filter(|user| user.id == user_id)
            .map(PublicUser::from))
    }

    async fn is_email_taken(&self, _email: &str) -> Result<bool, sqlx::Error> {
        self.fail_check()?;
        Ok(self.email_taken)
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        self.fail_check()?;
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_lowercase(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            role: UserRole::Customer,
            created_at: OffsetDateTime::now_utc(),
        };
        self.created_users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn count_users(&self) -> Result<i64, sqlx::Error> {
        self.fail_check()?;
        let created = self.created_users.lock().unwrap().len() as i64;
        Ok(created + i64::from(self.find_user_result.is_some()))
    }

    async fn cart_lines(&self, _user_id: Uuid) -> Result<Vec<CartLine>, sqlx::Error> {
        self.fail_check()?;
        Ok(self.cart.lock().unwrap().clone())
    }

    async fn add_cart_line(&self, _user_id: Uuid, product_id: Uuid) -> Result<(), sqlx::Error> {
        self.fail_check()?;
        let mut cart = self.cart.lock().unwrap();
        match cart.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => line.quantity += 1,
            None => cart.push(CartLine {
                product_id,
                quantity: 1,
            }),
        }
        Ok(())
    }

    async fn set_cart_quantity(
        &self,
        _user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<bool, sqlx::Error> {
        self.fail_check()?;
        let mut cart = self.cart.lock().unwrap();
        let Some(line) = cart.iter_mut().find(|line| line.product_id == product_id) else {
            return Ok(false);
        };
        if quantity == 0 {
            cart.retain(|line| line.product_id != product_id);
        } else {
            line.quantity = quantity;
        }
        Ok(true)
    }

    async fn remove_cart_line(&self, _user_id: Uuid, product_id: Uuid) -> Result<(), sqlx::Error> {
        self.fail_check()?;
        self.cart
            .lock()
            .unwrap()
            .retain(|line| line.product_id != product_id);
        Ok(())
    }

    async fn clear_cart(&self, _user_id: Uuid) -> Result<(), sqlx::Error> {
        self.fail_check()?;
        self.cart.lock().unwrap().clear();
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MockDb {
    async fn all_products(&self) -> Result<Vec<Product>, sqlx::Error> {
        self.fail_check()?;
        Ok(self.products.lock().unwrap().clone())
    }

    async fn featured_products(&self) -> Result<Vec<Product>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|product| product.is_featured)
            .cloned()
            .collect())
    }

    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|product| product.category == category)
            .cloned()
            .collect())
    }

    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|product| ids.contains(&product.id))
            .cloned()
            .collect())
    }

    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|product| product.id == id)
            .cloned())
    }

    async fn sample_products(&self, count: i64) -> Result<Vec<RecommendedProduct>, sqlx::Error> {
        self.fail_check()?;
        // Deterministic "sample" so tests can assert on contents.
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .take(count as usize)
            .map(|product| RecommendedProduct {
                id: product.id,
                name: product.name.clone(),
                description: product.description.clone(),
                image: product.image.clone(),
                price: product.price,
            })
            .collect())
    }

    async fn create_product(
        &self,
        payload: &NewProduct,
        image_url: &str,
    ) -> Result<Product, sqlx::Error> {
        self.fail_check()?;
        let product = Product {
            id: Uuid::new_v4(),
            name: payload.name.clone(),
            description: payload.description.clone(),
            price: payload.price,
            image: image_url.to_string(),
            category: payload.category.clone(),
            is_featured: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), sqlx::Error> {
        self.fail_check()?;
        self.products
            .lock()
            .unwrap()
            .retain(|product| product.id != id);
        Ok(())
    }

    async fn set_featured(&self, id: Uuid, is_featured: bool) -> Result<Product, sqlx::Error> {
        self.fail_check()?;
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or(sqlx::Error::RowNotFound)?;
        product.is_featured = is_featured;
        Ok(product.clone())
    }

    async fn count_products(&self) -> Result<i64, sqlx::Error> {
        self.fail_check()?;
        Ok(self.products.lock().unwrap().len() as i64)
    }
}

#[async_trait]
impl CouponRepository for MockDb {
    async fn find_active_coupon(&self, user_id: Uuid) -> Result<Option<Coupon>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .coupons
            .lock()
            .unwrap()
            .iter()
            .find(|coupon| coupon.user_id == user_id && coupon.is_active)
            .cloned())
    }

    async fn find_active_coupon_by_code(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<Option<Coupon>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .coupons
            .lock()
            .unwrap()
            .iter()
            .find(|coupon| coupon.user_id == user_id && coupon.code == code && coupon.is_active)
            .cloned())
    }

    async fn deactivate_coupon(&self, coupon_id: Uuid) -> Result<(), sqlx::Error> {
        self.fail_check()?;
        if let Some(coupon) = self
            .coupons
            .lock()
            .unwrap()
            .iter_mut()
            .find(|coupon| coupon.id == coupon_id)
        {
            coupon.is_active = false;
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MockDb {
    async fn count_orders(&self) -> Result<i64, sqlx::Error> {
        self.fail_check()?;
        Ok(self.orders.lock().unwrap().len() as i64)
    }

    async fn total_revenue(&self) -> Result<f64, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .map(|order| order.total_amount)
            .sum())
    }

    async fn orders_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Order>, sqlx::Error> {
        self.fail_check()?;
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|order| order.created_at >= start && order.created_at <= end)
            .cloned()
            .collect())
    }
}
