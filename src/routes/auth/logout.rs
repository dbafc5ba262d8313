use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::responses::JsonResponse;
use crate::routes::auth::cookies::{clear_session_cookies, REFRESH_COOKIE};
use crate::state::AppState;

/// Always succeeds from the caller's perspective: revocation is best-effort,
/// cookie clearing is unconditional.
pub async fn handle_logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        if let Some(claims) = state.tokens.try_decode_refresh(cookie.value()) {
            if let Err(err) = state.tokens.revoke(&claims.sub).await {
                tracing::error!(?err, user_id = %claims.sub, "failed to revoke refresh token");
            }
        }
    }

    let headers = clear_session_cookies(state.config.auth_cookie_secure);
    (headers, JsonResponse::success("Logged out successfully")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        extract::Request,
        http::{header, StatusCode},
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    use crate::db::mock_db::MockDb;
    use crate::routes::auth::cookies::REFRESH_COOKIE;
    use crate::routes::test_support::{sample_user, test_state};
    use crate::state::AppState;

    use super::handle_logout;

    fn build_app(state: AppState) -> Router {
        Router::new()
            .route("/logout", post(handle_logout))
            .with_state(state)
    }

    fn cookie_header(token: &str) -> String {
        format!("{}={}", REFRESH_COOKIE, token)
    }

    fn assert_clears_both_cookies(res: &axum::response::Response) {
        let cookies: Vec<String> = res
            .headers()
            .get_all("set-cookie")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(cookies
            .iter()
            .any(|c| c.starts_with("accessToken=") && c.contains("Max-Age=0")));
        assert!(cookies
            .iter()
            .any(|c| c.starts_with("refreshToken=") && c.contains("Max-Age=0")));
    }

    #[tokio::test]
    async fn logout_revokes_registry_entry_and_clears_cookies() {
        let user = sample_user();
        let state = test_state(MockDb::with_user(user.clone()));

        let pair = state.tokens.issue(user.id).unwrap();
        state
            .tokens
            .persist_refresh_token(user.id, &pair.refresh_token)
            .await
            .unwrap();

        let app = build_app(state.clone());
        let res = app
            .oneshot(
                Request::post("/logout")
                    .header(header::COOKIE, cookie_header(&pair.refresh_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_clears_both_cookies(&res);
        assert!(state.tokens.rotate_access(&pair.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn undecodable_cookie_still_clears_cookies() {
        let state = test_state(MockDb::default());
        let app = build_app(state);

        let res = app
            .oneshot(
                Request::post("/logout")
                    .header(header::COOKIE, cookie_header("not.a.jwt"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_clears_both_cookies(&res);
    }

    #[tokio::test]
    async fn logout_without_cookie_succeeds() {
        let state = test_state(MockDb::default());
        let app = build_app(state);

        let res = app
            .oneshot(Request::post("/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_clears_both_cookies(&res);
    }
}
