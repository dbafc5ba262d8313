use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::product::Product;

/// One (product, quantity) pair from the user's cart snapshot. Quantity is
/// always >= 1 in storage; a line dropped to 0 is deleted instead.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CartLine {
    #[serde(rename = "productId")]
    pub product_id: uuid::Uuid,
    pub quantity: i32,
}

/// A cart line resolved against the catalog, as served to clients.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CartTotals {
    pub subtotal: f64,
    pub total: f64,
}

/// Discount inputs for [`compute_totals`]; produced by coupon validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedDiscount {
    pub percentage: f64,
}

/// Derives subtotal/total from the resolved cart. Pure: totals are never
/// persisted, only recomputed after each mutation.
pub fn compute_totals(items: &[CartItem], discount: Option<AppliedDiscount>) -> CartTotals {
    let subtotal: f64 = items
        .iter()
        .map(|item| item.product.price * f64::from(item.quantity))
        .sum();

    let total = match discount {
        Some(d) => subtotal * (1.0 - d.percentage / 100.0),
        None => subtotal,
    };

    CartTotals { subtotal, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn item(price: f64, quantity: i32) -> CartItem {
        CartItem {
            product: Product {
                id: Uuid::new_v4(),
                name: "Widget".into(),
                description: "A widget".into(),
                price,
                image: String::new(),
                category: "widgets".into(),
                is_featured: false,
                created_at: OffsetDateTime::now_utc(),
            },
            quantity,
        }
    }

    #[test]
    fn subtotal_sums_price_times_quantity() {
        let totals = compute_totals(&[item(10.0, 3), item(5.0, 2)], None);
        assert_eq!(totals.subtotal, 40.0);
        assert_eq!(totals.total, 40.0);
    }

    #[test]
    fn ten_percent_off_one_hundred_is_ninety() {
        let totals = compute_totals(
            &[item(25.0, 4)],
            Some(AppliedDiscount { percentage: 10.0 }),
        );
        assert_eq!(totals.subtotal, 100.0);
        assert_eq!(totals.total, 90.0);
    }

    #[test]
    fn no_coupon_means_total_equals_subtotal() {
        let totals = compute_totals(&[item(19.99, 1)], None);
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        let totals = compute_totals(&[], Some(AppliedDiscount { percentage: 50.0 }));
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.total, 0.0);
    }
}
