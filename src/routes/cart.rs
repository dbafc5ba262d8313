use axum::{
    extract::{Json, Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::cart::{compute_totals, AppliedDiscount, CartItem};
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::routes::coupon::{validate_for_user, CouponFailure};
use crate::state::AppState;

/// Cart payload returned by every cart endpoint. Totals are computed
/// server side so the client never has to price anything itself.
#[derive(Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub subtotal: f64,
    pub total: f64,
}

async fn load_cart_view(
    state: &AppState,
    user_id: Uuid,
    discount: Option<AppliedDiscount>,
) -> Result<CartView, sqlx::Error> {
    let lines = state.db.cart_lines(user_id).await?;
    let ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
    let products = state.products.products_by_ids(&ids).await?;

    // Preserve insertion order from the cart, not the product query.
    let items: Vec<CartItem> = lines
        .iter()
        .filter_map(|line| {
            products
                .iter()
                .find(|p| p.id == line.product_id)
                .map(|product| CartItem {
                    product: product.clone(),
                    quantity: line.quantity,
                })
        })
        .collect();

    let totals = compute_totals(&items, discount);
    Ok(CartView {
        items,
        subtotal: totals.subtotal,
        total: totals.total,
    })
}

fn cart_response(view: Result<CartView, sqlx::Error>) -> Response {
    match view {
        Ok(view) => Json(view).into_response(),
        Err(err) => {
            tracing::error!(?err, "failed to load cart");
            JsonResponse::server_error("Failed to load cart").into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct CartQuery {
    pub code: Option<String>,
}

pub async fn get_cart(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<CartQuery>,
) -> Response {
    let discount = match query.code {
        Some(code) => {
            match validate_for_user(&state.coupons, session.user_id, &code).await {
                Ok(coupon) => Some(AppliedDiscount {
                    percentage: coupon.discount_percentage,
                }),
                // An expired or unknown code prices the cart without it.
                Err(CouponFailure::NotFound) | Err(CouponFailure::Expired) => None,
                Err(CouponFailure::Upstream(err)) => {
                    tracing::error!(?err, "coupon lookup failed while pricing cart");
                    return JsonResponse::server_error("Failed to load cart").into_response();
                }
            }
        }
        None => None,
    };

    cart_response(load_cart_view(&state, session.user_id, discount).await)
}

#[derive(Deserialize)]
pub struct AddToCartPayload {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    session: AuthSession,
    Json(payload): Json<AddToCartPayload>,
) -> Response {
    match state.products.find_product_by_id(payload.product_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return JsonResponse::not_found("Product not found").into_response(),
        Err(err) => {
            tracing::error!(?err, "product lookup failed");
            return JsonResponse::server_error("Failed to add to cart").into_response();
        }
    }

    if let Err(err) = state
        .db
        .add_cart_line(session.user_id, payload.product_id)
        .await
    {
        tracing::error!(?err, "failed to add cart line");
        return JsonResponse::server_error("Failed to add to cart").into_response();
    }

    cart_response(load_cart_view(&state, session.user_id, None).await)
}

#[derive(Deserialize, Default)]
pub struct RemoveFromCartPayload {
    #[serde(rename = "productId")]
    pub product_id: Option<Uuid>,
}

/// With a product id the matching line is removed; without one the whole
/// cart is emptied.
pub async fn remove_from_cart(
    State(state): State<AppState>,
    session: AuthSession,
    payload: Option<Json<RemoveFromCartPayload>>,
) -> Response {
    let product_id = payload.and_then(|Json(p)| p.product_id);

    let result = match product_id {
        Some(product_id) => state.db.remove_cart_line(session.user_id, product_id).await,
        None => state.db.clear_cart(session.user_id).await,
    };

    if let Err(err) = result {
        tracing::error!(?err, "failed to remove from cart");
        return JsonResponse::server_error("Failed to remove from cart").into_response();
    }

    cart_response(load_cart_view(&state, session.user_id, None).await)
}

#[derive(Deserialize)]
pub struct UpdateQuantityPayload {
    pub quantity: i32,
}

pub async fn update_quantity(
    State(state): State<AppState>,
    session: AuthSession,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityPayload>,
) -> Response {
    if payload.quantity < 0 {
        return JsonResponse::bad_request("Quantity cannot be negative").into_response();
    }

    match state
        .db
        .set_cart_quantity(session.user_id, product_id, payload.quantity)
        .await
    {
        Ok(true) => cart_response(load_cart_view(&state, session.user_id, None).await),
        Ok(false) => JsonResponse::not_found("Item not found in cart").into_response(),
        Err(err) => {
            tracing::error!(?err, "failed to update cart quantity");
            JsonResponse::server_error("Failed to update cart").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        extract::Request,
        http::{header, StatusCode},
        routing::{get, put},
        Router,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::db::mock_db::MockDb;
    use crate::models::user::User;
    use crate::routes::auth::cookies::ACCESS_COOKIE;
    use crate::routes::test_support::{sample_product, sample_user, test_state};
    use crate::state::AppState;

    use super::{add_to_cart, get_cart, remove_from_cart, update_quantity};

    fn build_app(state: AppState) -> Router {
        Router::new()
            .route("/cart", get(get_cart).post(add_to_cart).delete(remove_from_cart))
            .route("/cart/{id}", put(update_quantity))
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
    async fn adding_same_product_twice_increments_quantity() {
        let user = sample_user();
        let db = MockDb::with_user(user.clone());
        let product = sample_product("Widget", 25.0);
        db.products.lock().unwrap().push(product.clone());
        let state = test_state(db);
        let app = build_app(state.clone());
        let cookie = access_cookie(&state, &user);

        let payload = serde_json::json!({ "productId": product.id });
        send(&app, &cookie, "POST", "/cart", Some(payload.clone())).await;
        let res = send(&app, &cookie, "POST", "/cart", Some(payload)).await;

        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["items"].as_array().unwrap().len(), 1);
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["subtotal"], 50.0);
        assert_eq!(json["total"], 50.0);
    }

    #[tokio::test]
    async fn adding_unknown_product_is_not_found() {
        let user = sample_user();
        let state = test_state(MockDb::with_user(user.clone()));
        let app = build_app(state.clone());
        let cookie = access_cookie(&state, &user);

        let payload = serde_json::json!({ "productId": Uuid::new_v4() });
        let res = send(&app, &cookie, "POST", "/cart", Some(payload)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_with_id_removes_one_line_without_id_clears_all() {
        let user = sample_user();
        let db = MockDb::with_user(user.clone());
        let keep = sample_product("Keep", 10.0);
        let drop = sample_product("Drop", 20.0);
        db.products.lock().unwrap().push(keep.clone());
        db.products.lock().unwrap().push(drop.clone());
        let state = test_state(db);
        let app = build_app(state.clone());
        let cookie = access_cookie(&state, &user);

        for p in [&keep, &drop] {
            send(
                &app,
                &cookie,
                "POST",
                "/cart",
                Some(serde_json::json!({ "productId": p.id })),
            )
            .await;
        }

        let res = send(
            &app,
            &cookie,
            "DELETE",
            "/cart",
            Some(serde_json::json!({ "productId": drop.id })),
        )
        .await;
        let json = body_json(res).await;
        assert_eq!(json["items"].as_array().unwrap().len(), 1);
        assert_eq!(json["items"][0]["name"], "Keep");

        let res = send(&app, &cookie, "DELETE", "/cart", None).await;
        let json = body_json(res).await;
        assert!(json["items"].as_array().unwrap().is_empty());
        assert_eq!(json["subtotal"], 0.0);
    }

    #[tokio::test]
    async fn setting_quantity_to_zero_drops_the_line() {
        let user = sample_user();
        let db = MockDb::with_user(user.clone());
        let product = sample_product("Widget", 10.0);
        db.products.lock().unwrap().push(product.clone());
        let state = test_state(db);
        let app = build_app(state.clone());
        let cookie = access_cookie(&state, &user);

        send(
            &app,
            &cookie,
            "POST",
            "/cart",
            Some(serde_json::json!({ "productId": product.id })),
        )
        .await;

        let res = send(
            &app,
            &cookie,
            "PUT",
            &format!("/cart/{}", product.id),
            Some(serde_json::json!({ "quantity": 0 })),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert!(json["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn updating_a_missing_line_is_not_found() {
        let user = sample_user();
        let state = test_state(MockDb::with_user(user.clone()));
        let app = build_app(state.clone());
        let cookie = access_cookie(&state, &user);

        let res = send(
            &app,
            &cookie,
            "PUT",
            &format!("/cart/{}", Uuid::new_v4()),
            Some(serde_json::json!({ "quantity": 3 })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn negative_quantity_is_rejected() {
        let user = sample_user();
        let state = test_state(MockDb::with_user(user.clone()));
        let app = build_app(state.clone());
        let cookie = access_cookie(&state, &user);

        let res = send(
            &app,
            &cookie,
            "PUT",
            &format!("/cart/{}", Uuid::new_v4()),
            Some(serde_json::json!({ "quantity": -1 })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn valid_coupon_code_discounts_the_total() {
        let user = sample_user();
        let db = MockDb::with_user(user.clone());
        let product = sample_product("Widget", 100.0);
        db.products.lock().unwrap().push(product.clone());
        db.coupons.lock().unwrap().push(crate::models::coupon::Coupon {
            id: Uuid::new_v4(),
            code: "SAVE10".into(),
            discount_percentage: 10.0,
            expiration_date: time::OffsetDateTime::now_utc() + time::Duration::days(1),
            is_active: true,
            user_id: user.id,
        });
        let state = test_state(db);
        let app = build_app(state.clone());
        let cookie = access_cookie(&state, &user);

        send(
            &app,
            &cookie,
            "POST",
            "/cart",
            Some(serde_json::json!({ "productId": product.id })),
        )
        .await;

        let res = send(&app, &cookie, "GET", "/cart?code=SAVE10", None).await;
        let json = body_json(res).await;
        assert_eq!(json["subtotal"], 100.0);
        assert_eq!(json["total"], 90.0);
    }
}
