use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::coupon_repository::CouponRepository;
use crate::models::coupon::Coupon;
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

pub enum CouponFailure {
    NotFound,
    Expired,
    Upstream(sqlx::Error),
}

/// Looks up `{code, user, active}` and enforces expiry. Deactivation on
/// expiry is a side effect of validation; there is no scheduled sweep, so an
/// expired coupon stays active until somebody tries to use it.
pub async fn validate_for_user(
    coupons: &Arc<dyn CouponRepository>,
    user_id: Uuid,
    code: &str,
) -> Result<Coupon, CouponFailure> {
    let coupon = coupons
        .find_active_coupon_by_code(user_id, code)
        .await
        .map_err(CouponFailure::Upstream)?
        .ok_or(CouponFailure::NotFound)?;

    if coupon.expiration_date < OffsetDateTime::now_utc() {
        coupons
            .deactivate_coupon(coupon.id)
            .await
            .map_err(CouponFailure::Upstream)?;
        return Err(CouponFailure::Expired);
    }

    Ok(coupon)
}

pub fn coupon_failure_response(failure: CouponFailure) -> Response {
    match failure {
        CouponFailure::NotFound => JsonResponse::not_found("Coupon not found").into_response(),
        CouponFailure::Expired => JsonResponse::bad_request("Coupon has expired").into_response(),
        CouponFailure::Upstream(err) => {
            tracing::error!(?err, "coupon lookup failed");
            JsonResponse::server_error("Failed to validate coupon").into_response()
        }
    }
}

/// The caller's active coupon, or JSON `null` when there is none.
pub async fn get_coupon(State(state): State<AppState>, session: AuthSession) -> Response {
    match state.coupons.find_active_coupon(session.user_id).await {
        Ok(coupon) => Json(coupon).into_response(),
        Err(err) => {
            tracing::error!(?err, "failed to load coupon");
            JsonResponse::server_error("Failed to get coupon").into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct ValidateCouponQuery {
    pub code: String,
}

pub async fn validate_coupon(
    State(state): State<AppState>,
    session: AuthSession,
    Query(query): Query<ValidateCouponQuery>,
) -> Response {
    match validate_for_user(&state.coupons, session.user_id, &query.code).await {
        Ok(coupon) => Json(json!({
            "message": "Coupon is valid",
            "code": coupon.code,
            "discountPercentage": coupon.discount_percentage,
        }))
        .into_response(),
        Err(failure) => coupon_failure_response(failure),
    }
}
