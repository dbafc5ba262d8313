use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::models::user::{PublicUser, UserRole};
use crate::responses::JsonResponse;
use crate::routes::auth::claims::Claims;
use crate::services::tokens::TokenError;
use crate::state::AppState;

/// Authenticated caller, extracted from the `accessToken` cookie.
#[derive(Debug)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(super::cookies::ACCESS_COOKIE) else {
            return Err(JsonResponse::unauthorized("Access token is missing").into_response());
        };

        let claims = state.tokens.verify_access(token.value()).map_err(|err| {
            let message = match err {
                TokenError::Expired => "Access token has expired",
                _ => "Invalid access token",
            };
            JsonResponse::unauthorized(message).into_response()
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| JsonResponse::unauthorized("Invalid access token").into_response())?;

        Ok(AuthSession { user_id, claims })
    }
}

/// Loads the caller and rejects anyone who is not an admin.
pub async fn require_admin(
    state: &AppState,
    session: &AuthSession,
) -> Result<PublicUser, Response> {
    match state.db.find_public_user_by_id(session.user_id).await {
        Ok(Some(user)) if user.role == UserRole::Admin => Ok(user),
        Ok(Some(_)) => Err(JsonResponse::forbidden("Access denied. Admins only.").into_response()),
        Ok(None) => Err(JsonResponse::unauthorized("User not found").into_response()),
        Err(err) => {
            tracing::error!(?err, "failed to load user for admin check");
            Err(JsonResponse::server_error("Database error").into_response())
        }
    }
}
