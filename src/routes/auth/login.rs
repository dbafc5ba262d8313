use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::user::PublicUser;
use crate::responses::JsonResponse;
use crate::routes::auth::cookies::session_cookies;
use crate::state::AppState;
use crate::utils::password::verify_password;

#[derive(Deserialize, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub async fn handle_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Response {
    let email = payload.email.trim().to_lowercase();

    let user = match state.db.find_user_by_email(&email).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return JsonResponse::unauthorized("Invalid email or password").into_response()
        }
        Err(err) => {
            tracing::error!(?err, "failed to load user for login");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return JsonResponse::unauthorized("Invalid email or password").into_response()
        }
        Err(err) => {
            tracing::error!(?err, "password verification error");
            return JsonResponse::server_error("Internal error").into_response();
        }
    }

    let pair = match state.tokens.issue(user.id) {
        Ok(pair) => pair,
        Err(err) => {
            tracing::error!(?err, %user.id, "failed to issue tokens at login");
            return JsonResponse::server_error("Token generation failed").into_response();
        }
    };

    if let Err(err) = state
        .tokens
        .persist_refresh_token(user.id, &pair.refresh_token)
        .await
    {
        tracing::error!(?err, %user.id, "failed to persist refresh token at login");
        return JsonResponse::server_error("Token generation failed").into_response();
    }

    let headers = session_cookies(
        pair.access_token,
        pair.refresh_token,
        state.config.auth_cookie_secure,
    );

    (
        StatusCode::OK,
        headers,
        Json(json!({
            "message": "Login successful",
            "user": PublicUser::from(&user),
        })),
    )
        .into_response()
}
