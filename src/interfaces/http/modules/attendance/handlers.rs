//! Attendance API handlers

use axum::extract::{Query, State};
use axum::Json;
use tracing::info;

use super::dto::{AttendanceResponse, MarkRequest, RosterQuery, SeedResponse};
use crate::infrastructure::spreadsheet::exports::attendance_workbook;
use crate::interfaces::http::common::{
    ApiError, ApiResult, ErrorBody, IdPath, OkResponse, PageParams, PageResponse, ValidatedJson,
    XlsxDownload,
};
use crate::interfaces::http::middleware::RequireAdmin;
use crate::interfaces::http::router::AppState;
use crate::shared::PerPagePolicy;

async fn ensure_session(state: &AppState, session_id: i32) -> ApiResult<()> {
    if state.repos.sessions().exists(session_id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found("Session not found"))
    }
}

#[utoipa::path(
    get,
    path = "/api/attendance/session/{session_id}",
    tag = "Attendance",
    params(("session_id" = i32, Path, description = "Session id"), RosterQuery, PageParams),
    responses(
        (status = 200, description = "One page of the session roster", body = PageResponse<AttendanceResponse>),
        (status = 404, description = "Session not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_for_session(
    State(state): State<AppState>,
    IdPath(session_id): IdPath,
    Query(query): Query<RosterQuery>,
    Query(paging): Query<PageParams>,
) -> ApiResult<Json<PageResponse<AttendanceResponse>>> {
    ensure_session(&state, session_id).await?;
    let page = state
        .repos
        .attendance()
        .list_for_session(
            session_id,
            query.into_filter(),
            paging.window(PerPagePolicy::LIST),
        )
        .await?;
    Ok(Json(PageResponse::from_result(page)))
}

#[utoipa::path(
    post,
    path = "/api/attendance/seed/{session_id}",
    tag = "Attendance",
    params(("session_id" = i32, Path, description = "Session id")),
    responses(
        (status = 200, description = "Missing students recorded as Absent", body = SeedResponse),
        (status = 404, description = "Session not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn seed_absent(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    IdPath(session_id): IdPath,
) -> ApiResult<Json<SeedResponse>> {
    ensure_session(&state, session_id).await?;
    let inserted = state.repos.attendance().seed_absent(session_id).await?;
    info!(session_id, inserted, "Seeded absent attendance");
    Ok(Json(SeedResponse { ok: true, inserted }))
}

#[utoipa::path(
    post,
    path = "/api/attendance/mark",
    tag = "Attendance",
    request_body = MarkRequest,
    responses(
        (status = 200, description = "Attendance recorded", body = OkResponse),
        (status = 400, description = "session_id, student_id, and valid status are required", body = ErrorBody),
        (status = 404, description = "Session or student not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(body): ValidatedJson<MarkRequest>,
) -> ApiResult<Json<OkResponse>> {
    state.repos.attendance().mark(body.into_mark()?).await?;
    Ok(OkResponse::json())
}

#[utoipa::path(
    get,
    path = "/api/attendance/export/session/{session_id}",
    tag = "Attendance",
    params(("session_id" = i32, Path, description = "Session id")),
    responses(
        (status = 200, description = "attendance_session_{id}.xlsx", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 404, description = "Session not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn export_session(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    IdPath(session_id): IdPath,
) -> ApiResult<XlsxDownload> {
    ensure_session(&state, session_id).await?;
    let rows = state
        .repos
        .attendance()
        .export_for_session(session_id)
        .await?;
    let bytes = attendance_workbook(&rows)?;
    Ok(XlsxDownload::new(
        format!("attendance_session_{}.xlsx", session_id),
        bytes,
    ))
}
