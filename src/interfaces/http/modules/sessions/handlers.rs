//! Session API handlers

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::dto::{SessionListQuery, SessionRequest, SessionResponse};
use crate::interfaces::http::common::{
    ApiError, ApiResult, ErrorBody, IdPath, OkResponse, PageParams, PageResponse, ValidatedJson,
};
use crate::interfaces::http::middleware::RequireAdmin;
use crate::interfaces::http::router::AppState;
use crate::shared::PerPagePolicy;

#[utoipa::path(
    get,
    path = "/api/sessions",
    tag = "Sessions",
    params(SessionListQuery, PageParams),
    responses(
        (status = 200, description = "One page of sessions", body = PageResponse<SessionResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionListQuery>,
    Query(paging): Query<PageParams>,
) -> ApiResult<Json<PageResponse<SessionResponse>>> {
    let page = state
        .repos
        .sessions()
        .list(query.into_filter(), paging.window(PerPagePolicy::LIST))
        .await?;
    Ok(Json(PageResponse::from_result(page)))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    tag = "Sessions",
    params(("id" = i32, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session with attendance totals", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_session(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<SessionResponse>> {
    let session = state
        .repos
        .sessions()
        .find_with_counts(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    Ok(Json(session.into()))
}

#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Sessions",
    request_body = SessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 400, description = "Title and session_date are required", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_session(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(body): ValidatedJson<SessionRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let created = state.repos.sessions().create(body.into_input()?).await?;
    info!(session_id = created.session.id, "Session created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/sessions/{id}",
    tag = "Sessions",
    params(("id" = i32, Path, description = "Session id")),
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session updated", body = OkResponse),
        (status = 400, description = "Title and session_date are required", body = ErrorBody),
        (status = 404, description = "Session not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_session(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    IdPath(id): IdPath,
    ValidatedJson(body): ValidatedJson<SessionRequest>,
) -> ApiResult<Json<OkResponse>> {
    state.repos.sessions().update(id, body.into_input()?).await?;
    Ok(OkResponse::json())
}

#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    tag = "Sessions",
    params(("id" = i32, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session and its attendance deleted", body = OkResponse),
        (status = 404, description = "Session not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_session(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    IdPath(id): IdPath,
) -> ApiResult<Json<OkResponse>> {
    state.repos.sessions().delete(id).await?;
    info!(session_id = id, "Session deleted");
    Ok(OkResponse::json())
}
