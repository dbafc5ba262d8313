use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};

use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

pub async fn handle_profile(State(state): State<AppState>, session: AuthSession) -> Response {
    match state.db.find_public_user_by_id(session.user_id).await {
        Ok(Some(user)) => Json(user).into_response(),
        Ok(None) => JsonResponse::unauthorized("User not found").into_response(),
        Err(err) => {
            tracing::error!(?err, "failed to load profile");
            JsonResponse::server_error("Error fetching profile").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        extract::Request,
        http::{header, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    use crate::db::mock_db::MockDb;
    use crate::routes::auth::cookies::ACCESS_COOKIE;
    use crate::routes::test_support::{sample_user, test_state};
    use crate::state::AppState;

    use super::handle_profile;

    fn build_app(state: AppState) -> Router {
        Router::new()
            .route("/profile", get(handle_profile))
            .with_state(state)
    }

    #[tokio::test]
    async fn profile_returns_public_user_for_valid_session() {
        let user = sample_user();
        let state = test_state(MockDb::with_user(user.clone()));
        let pair = state.tokens.issue(user.id).unwrap();

        let res = build_app(state)
            .oneshot(
                Request::get("/profile")
                    .header(
                        header::COOKIE,
                        format!("{}={}", ACCESS_COOKIE, pair.access_token),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["email"], user.email);
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn profile_without_cookie_is_unauthorized() {
        let state = test_state(MockDb::default());
        let res = build_app(state)
            .oneshot(Request::get("/profile").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
