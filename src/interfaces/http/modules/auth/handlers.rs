//! Authentication API handlers

use axum::{extract::State, Json};

use super::dto::{LoginRequest, LoginResponse, UserInfo};
use crate::interfaces::http::common::{ApiResult, ErrorBody, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::router::AppState;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 400, description = "Email or password missing", body = ErrorBody),
        (status = 401, description = "Invalid email or password", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let auth = state
        .identity
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: auth.token,
        user: auth.user.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "The authenticated user", body = UserInfo),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(user: AuthenticatedUser) -> Json<UserInfo> {
    Json(user.into())
}
