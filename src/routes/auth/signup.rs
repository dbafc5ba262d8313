use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::models::signup::SignupPayload;
use crate::models::user::PublicUser;
use crate::responses::JsonResponse;
use crate::routes::auth::cookies::session_cookies;
use crate::state::AppState;
use crate::utils::password::hash_password;

pub async fn handle_signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Response {
    let mut payload = payload;
    payload.email = payload.email.trim().to_lowercase();

    if let Err(errors) = payload.validate() {
        // Field errors are structured; the API surfaces the first message.
        return JsonResponse::bad_request(&errors[0].message).into_response();
    }

    match state.db.is_email_taken(&payload.email).await {
        Ok(true) => return JsonResponse::bad_request("User already exists").into_response(),
        Ok(false) => {}
        Err(err) => {
            tracing::error!(?err, "failed to check for existing email");
            return JsonResponse::server_error("Database error").into_response();
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(_) => return JsonResponse::server_error("Password hashing failed").into_response(),
    };

    let user = match state
        .db
        .create_user(payload.name.trim(), &payload.email, &password_hash)
        .await
    {
        Ok(user) => user,
        Err(err) => {
            tracing::error!(?err, "failed to insert user");
            return JsonResponse::server_error("Could not create user").into_response();
        }
    };

    let pair = match state.tokens.issue(user.id) {
        Ok(pair) => pair,
        Err(err) => {
            tracing::error!(?err, %user.id, "failed to issue tokens at signup");
            return JsonResponse::server_error("Token generation failed").into_response();
        }
    };

    if let Err(err) = state
        .tokens
        .persist_refresh_token(user.id, &pair.refresh_token)
        .await
    {
        tracing::error!(?err, %user.id, "failed to persist refresh token at signup");
        return JsonResponse::server_error("Token generation failed").into_response();
    }

    let headers = session_cookies(
        pair.access_token,
        pair.refresh_token,
        state.config.auth_cookie_secure,
    );

    (
        StatusCode::CREATED,
        headers,
        Json(json!({
            "message": "User created successfully",
            "user": PublicUser::from(&user),
        })),
    )
        .into_response()
}
