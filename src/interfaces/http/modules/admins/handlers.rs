//! Admin management handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::dto::{AdminResponse, CreateAdminRequest};
use crate::interfaces::http::common::{ApiResult, ErrorBody, IdPath, OkResponse, ValidatedJson};
use crate::interfaces::http::middleware::RequireAdmin;
use crate::interfaces::http::router::AppState;

#[utoipa::path(
    get,
    path = "/api/admins",
    tag = "Admins",
    responses((status = 200, description = "Admins, newest first", body = [AdminResponse])),
    security(("bearer_auth" = []))
)]
pub async fn list_admins(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Json<Vec<AdminResponse>>> {
    let admins = state.identity.list_admins().await?;
    Ok(Json(admins.into_iter().map(AdminResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admins",
    tag = "Admins",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = AdminResponse),
        (status = 400, description = "name, email and password are required", body = ErrorBody),
        (status = 409, description = "Email already exists", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(body): ValidatedJson<CreateAdminRequest>,
) -> ApiResult<(StatusCode, Json<AdminResponse>)> {
    let user = state
        .identity
        .create_admin(&body.name, &body.email, &body.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    delete,
    path = "/api/admins/{id}",
    tag = "Admins",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Admin deleted", body = OkResponse),
        (status = 400, description = "Self-deletion, last admin or not an admin", body = ErrorBody),
        (status = 404, description = "Admin not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_admin(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    IdPath(id): IdPath,
) -> ApiResult<Json<OkResponse>> {
    state.identity.delete_admin(admin.user_id, id).await?;
    Ok(OkResponse::json())
}
