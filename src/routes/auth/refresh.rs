use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::responses::JsonResponse;
use crate::routes::auth::cookies::{access_cookie_headers, REFRESH_COOKIE};
use crate::services::tokens::TokenError;
use crate::state::AppState;

/// Mints a new access token against the presented refresh token. Failures
/// never clear cookies; the client decides whether to fall back to login.
pub async fn handle_refresh(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(cookie) = jar.get(REFRESH_COOKIE) else {
        return JsonResponse::unauthorized("No refresh token provided").into_response();
    };

    match state.tokens.rotate_access(cookie.value()).await {
        Ok(access_token) => {
            let headers = access_cookie_headers(access_token, state.config.auth_cookie_secure);
            (headers, JsonResponse::success("Token refreshed successfully")).into_response()
        }
        Err(TokenError::Revoked) => {
            // Registry mismatch: logged out elsewhere or superseded by a
            // newer login.
            JsonResponse::forbidden("Invalid refresh token").into_response()
        }
        Err(TokenError::Expired) => {
            JsonResponse::unauthorized("Refresh token has expired").into_response()
        }
        Err(TokenError::Invalid) => {
            JsonResponse::unauthorized("Invalid refresh token").into_response()
        }
        Err(err) => {
            tracing::error!(?err, "refresh token rotation failed");
            JsonResponse::server_error("Error refreshing token").into_response()
        }
    }
}
