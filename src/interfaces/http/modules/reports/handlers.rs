//! Report API handlers. Every report is admin only.

use axum::extract::{Query, State};
use axum::Json;

use super::dto::{
    BirthYearCount, BirthdayResponse, CountQuery, CountReportResponse, GenderCountResponse,
    GraduationYearCount, MonthQuery, SummaryResponse, TallyResponse,
};
use crate::infrastructure::spreadsheet::exports::birthdays_workbook;
use crate::interfaces::http::common::{
    ApiResult, ErrorBody, PageParams, PageResponse, XlsxDownload,
};
use crate::interfaces::http::middleware::RequireAdmin;
use crate::interfaces::http::router::AppState;
use crate::shared::PerPagePolicy;

#[utoipa::path(
    get,
    path = "/api/reports/summary",
    tag = "Reports",
    responses((status = 200, description = "Dashboard totals", body = SummaryResponse)),
    security(("bearer_auth" = []))
)]
pub async fn summary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Json<SummaryResponse>> {
    let summary = state.repos.reports().summary().await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/api/reports/students-by-birthyear",
    tag = "Reports",
    responses((status = 200, description = "Students per birth year", body = [BirthYearCount])),
    security(("bearer_auth" = []))
)]
pub async fn students_by_birth_year(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Json<Vec<BirthYearCount>>> {
    let rows = state.repos.reports().students_by_birth_year().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/reports/students-by-graduation-year",
    tag = "Reports",
    responses((status = 200, description = "Students per graduation year", body = [GraduationYearCount])),
    security(("bearer_auth" = []))
)]
pub async fn students_by_graduation_year(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Json<Vec<GraduationYearCount>>> {
    let rows = state.repos.reports().students_by_graduation_year().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/reports/gender-distribution",
    tag = "Reports",
    responses((status = 200, description = "Students per gender", body = [GenderCountResponse])),
    security(("bearer_auth" = []))
)]
pub async fn gender_distribution(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Json<Vec<GenderCountResponse>>> {
    let rows = state.repos.reports().gender_distribution().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/reports/birthdays",
    tag = "Reports",
    params(MonthQuery, PageParams),
    responses(
        (status = 200, description = "Students born in the month", body = PageResponse<BirthdayResponse>),
        (status = 400, description = "month must be 1-12", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn birthdays(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<MonthQuery>,
    Query(paging): Query<PageParams>,
) -> ApiResult<Json<PageResponse<BirthdayResponse>>> {
    let month = query.month()?;
    let page = state
        .repos
        .reports()
        .birthdays(month, paging.window(PerPagePolicy::LIST))
        .await?;
    Ok(Json(PageResponse::from_result(page)))
}

#[utoipa::path(
    get,
    path = "/api/reports/birthdays/export",
    tag = "Reports",
    params(MonthQuery),
    responses(
        (status = 200, description = "birthdays_month_{m}.xlsx", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "month must be 1-12", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn export_birthdays(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<MonthQuery>,
) -> ApiResult<XlsxDownload> {
    let month = query.month()?;
    let rows = state.repos.reports().birthdays_for_export(month).await?;
    let bytes = birthdays_workbook(&rows)?;
    Ok(XlsxDownload::new(
        format!("birthdays_month_{}.xlsx", month),
        bytes,
    ))
}

#[utoipa::path(
    get,
    path = "/api/reports/students-by-count",
    tag = "Reports",
    params(CountQuery, PageParams),
    responses(
        (status = 200, description = "Students with exactly these totals", body = CountReportResponse),
        (status = 400, description = "present and absent must be non-negative integers", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn students_by_count(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<CountQuery>,
    Query(paging): Query<PageParams>,
) -> ApiResult<Json<CountReportResponse>> {
    let (present, absent) = query.counts()?;
    let page = state
        .repos
        .reports()
        .students_by_count(present, absent, paging.window(PerPagePolicy::REPORT))
        .await?;

    Ok(Json(CountReportResponse {
        present,
        absent,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        total_pages: page.total_pages,
        rows: page.rows.into_iter().map(TallyResponse::from).collect(),
    }))
}
