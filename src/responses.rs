use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct JsonResponse {
    pub status: String,
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    fn build(status: StatusCode, success: bool, msg: &str) -> impl IntoResponse {
        (
            status,
            Json(JsonResponse {
                status: if success { "success" } else { "error" }.to_string(),
                success,
                message: msg.to_string(),
            }),
        )
    }

    pub fn success(msg: &str) -> impl IntoResponse {
        Self::build(StatusCode::OK, true, msg)
    }

    pub fn created(msg: &str) -> impl IntoResponse {
        Self::build(StatusCode::CREATED, true, msg)
    }

    pub fn bad_request(msg: &str) -> impl IntoResponse {
        Self::build(StatusCode::BAD_REQUEST, false, msg)
    }

    pub fn unauthorized(msg: &str) -> impl IntoResponse {
        Self::build(StatusCode::UNAUTHORIZED, false, msg)
    }

    pub fn forbidden(msg: &str) -> impl IntoResponse {
        Self::build(StatusCode::FORBIDDEN, false, msg)
    }

    pub fn not_found(msg: &str) -> impl IntoResponse {
        Self::build(StatusCode::NOT_FOUND, false, msg)
    }

    pub fn too_many_requests(msg: &str) -> impl IntoResponse {
        Self::build(StatusCode::TOO_MANY_REQUESTS, false, msg)
    }

    pub fn server_error(msg: &str) -> impl IntoResponse {
        Self::build(StatusCode::INTERNAL_SERVER_ERROR, false, msg)
    }
}
