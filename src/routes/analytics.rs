use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use time::{Date, Duration, OffsetDateTime};

use crate::models::order::Order;
use crate::responses::JsonResponse;
use crate::routes::auth::session::{require_admin, AuthSession};
use crate::state::AppState;

const DAILY_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Serialize, PartialEq)]
pub struct DailySales {
    pub date: String,
    pub sales: i64,
    pub revenue: f64,
}

fn format_day(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Buckets orders into one entry per calendar day over `[start, start + days)`,
/// UTC. Days without orders appear with zero sales so charts have no gaps.
pub fn daily_sales(orders: &[Order], start: Date, days: i64) -> Vec<DailySales> {
    (0..days)
        .map(|offset| {
            let day = start + Duration::days(offset);
            let (sales, revenue) = orders
                .iter()
                .filter(|order| order.created_at.date() == day)
                .fold((0i64, 0f64), |(sales, revenue), order| {
                    (sales + 1, revenue + order.total_amount)
                });
            DailySales {
                date: format_day(day),
                sales,
                revenue,
            }
        })
        .collect()
}

pub async fn get_analytics(State(state): State<AppState>, session: AuthSession) -> Response {
    if let Err(denied) = require_admin(&state, &session).await {
        return denied;
    }

    let end = OffsetDateTime::now_utc();
    let start = end - Duration::days(DAILY_WINDOW_DAYS);

    let users = state.db.count_users().await;
    let products = state.products.count_products().await;
    let total_sales = state.orders.count_orders().await;
    let total_revenue = state.orders.total_revenue().await;
    let recent_orders = state.orders.orders_between(start, end).await;

    match (users, products, total_sales, total_revenue, recent_orders) {
        (Ok(users), Ok(products), Ok(total_sales), Ok(total_revenue), Ok(recent_orders)) => {
            // The window starts the day after `start` so exactly seven full
            // days are reported, ending today.
            let first_day = (start + Duration::days(1)).date();
            Json(json!({
                "analyticsData": {
                    "users": users,
                    "products": products,
                    "totalSales": total_sales,
                    "totalRevenue": total_revenue,
                },
                "dailySalesData": daily_sales(&recent_orders, first_day, DAILY_WINDOW_DAYS),
            }))
            .into_response()
        }
        _ => {
            tracing::error!("failed to aggregate analytics");
            JsonResponse::server_error("Failed to load analytics").into_response()
        }
    }
}
