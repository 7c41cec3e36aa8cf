//! Student API handlers

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::dto::{
    CreatedResponse, ImportResponse, NotesRequest, StudentListQuery, StudentRequest,
    StudentResponse, StudentSessionResponse,
};
use crate::application::roster;
use crate::infrastructure::spreadsheet::exports::{students_workbook, template_workbook};
use crate::infrastructure::spreadsheet::read_first_sheet;
use crate::interfaces::http::common::{
    ApiError, ApiResult, ErrorBody, IdPath, OkResponse, PageParams, PageResponse, ValidatedJson,
    XlsxDownload,
};
use crate::interfaces::http::middleware::RequireAdmin;
use crate::interfaces::http::router::AppState;
use crate::shared::{normalize_text, PerPagePolicy};

/// Largest accepted import upload
pub const IMPORT_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[utoipa::path(
    get,
    path = "/api/students",
    tag = "Students",
    params(StudentListQuery, PageParams),
    responses(
        (status = 200, description = "One page of students", body = PageResponse<StudentResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<StudentListQuery>,
    Query(paging): Query<PageParams>,
) -> ApiResult<Json<PageResponse<StudentResponse>>> {
    let page = state
        .repos
        .students()
        .list(query.into_filter(), paging.window(PerPagePolicy::LIST))
        .await?;
    Ok(Json(PageResponse::from_result(page)))
}

#[utoipa::path(
    post,
    path = "/api/students",
    tag = "Students",
    request_body = StudentRequest,
    responses(
        (status = 201, description = "Student created", body = CreatedResponse),
        (status = 400, description = "Name and phone are required", body = ErrorBody),
        (status = 409, description = "Duplicate (phone) detected", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_student(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(body): ValidatedJson<StudentRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let id = state.repos.students().create(body.into_input()).await?;
    info!(student_id = id, "Student created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    tag = "Students",
    params(("id" = i32, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student with attendance totals", body = StudentResponse),
        (status = 404, description = "Student not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_student(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<StudentResponse>> {
    let student = state
        .repos
        .students()
        .find_with_counts(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;
    Ok(Json(student.into()))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    tag = "Students",
    params(("id" = i32, Path, description = "Student id")),
    request_body = StudentRequest,
    responses(
        (status = 200, description = "Student updated", body = OkResponse),
        (status = 400, description = "Name and phone are required", body = ErrorBody),
        (status = 404, description = "Student not found", body = ErrorBody),
        (status = 409, description = "Duplicate (phone) detected", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_student(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    IdPath(id): IdPath,
    ValidatedJson(body): ValidatedJson<StudentRequest>,
) -> ApiResult<Json<OkResponse>> {
    state.repos.students().update(id, body.into_input()).await?;
    Ok(OkResponse::json())
}

#[utoipa::path(
    put,
    path = "/api/students/{id}/notes",
    tag = "Students",
    params(("id" = i32, Path, description = "Student id")),
    request_body = NotesRequest,
    responses(
        (status = 200, description = "Notes replaced", body = OkResponse),
        (status = 404, description = "Student not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_notes(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    IdPath(id): IdPath,
    ValidatedJson(body): ValidatedJson<NotesRequest>,
) -> ApiResult<Json<OkResponse>> {
    let notes = normalize_text(body.notes.as_deref());
    state.repos.students().update_notes(id, notes).await?;
    Ok(OkResponse::json())
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    tag = "Students",
    params(("id" = i32, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student and their attendance deleted", body = OkResponse),
        (status = 404, description = "Student not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_student(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    IdPath(id): IdPath,
) -> ApiResult<Json<OkResponse>> {
    state.repos.students().delete(id).await?;
    info!(student_id = id, "Student deleted");
    Ok(OkResponse::json())
}

#[utoipa::path(
    get,
    path = "/api/students/{id}/sessions",
    tag = "Students",
    params(("id" = i32, Path, description = "Student id"), PageParams),
    responses(
        (status = 200, description = "Attendance history, most recent first", body = PageResponse<StudentSessionResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn student_sessions(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    Query(paging): Query<PageParams>,
) -> ApiResult<Json<PageResponse<StudentSessionResponse>>> {
    let page = state
        .repos
        .students()
        .sessions_for_student(id, paging.window(PerPagePolicy::LIST))
        .await?;
    Ok(Json(PageResponse::from_result(page)))
}

#[utoipa::path(
    get,
    path = "/api/students/export",
    tag = "Students",
    responses(
        (status = 200, description = "students.xlsx", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    ),
    security(("bearer_auth" = []))
)]
pub async fn export_students(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<XlsxDownload> {
    let students = state.repos.students().all().await?;
    let bytes = students_workbook(&students)?;
    Ok(XlsxDownload::new("students.xlsx", bytes))
}

#[utoipa::path(
    get,
    path = "/api/students/template",
    tag = "Students",
    responses(
        (status = 200, description = "students_template.xlsx", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_template(RequireAdmin(_admin): RequireAdmin) -> ApiResult<XlsxDownload> {
    let bytes = template_workbook()?;
    Ok(XlsxDownload::new("students_template.xlsx", bytes))
}

#[utoipa::path(
    post,
    path = "/api/students/import",
    tag = "Students",
    request_body(content_type = "multipart/form-data", description = "Workbook in the `file` field"),
    responses(
        (status = 200, description = "Per-row outcome counters", body = ImportResponse),
        (status = 400, description = "File is required / Empty file", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn import_students(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportResponse>> {
    let bytes = read_upload(multipart)
        .await?
        .ok_or_else(|| ApiError::bad_request("File is required"))?;

    let rows = read_first_sheet(&bytes)?;
    let report = roster::import_students(state.repos.students(), &rows).await;
    Ok(Json(report.into()))
}

/// Bytes of the `file` field, `None` when the form has no such field.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Option<Vec<u8>>> {
    let Ok(mut multipart) = multipart else {
        return Ok(None);
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
            return Ok(Some(bytes.to_vec()));
        }
    }
    Ok(None)
}
