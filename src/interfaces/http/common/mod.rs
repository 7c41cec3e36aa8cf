//! Types shared by every HTTP module: the error envelope, the page shape
//! and spreadsheet download responses.

pub mod validated_json;

pub use validated_json::{not_blank, ValidatedJson};

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::domain::DomainError;
use crate::infrastructure::spreadsheet::{SpreadsheetError, XLSX_CONTENT_TYPE};
use crate::shared::{PageRequest, PaginatedResult, PerPagePolicy};

// ── Error envelope ─────────────────────────────────────────────

/// Body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// An HTTP status plus the message sent as `{ "error": ... }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => ApiError::not_found(e.to_string()),
            DomainError::Validation(msg) => ApiError::bad_request(msg),
            DomainError::Conflict(msg) => ApiError::new(StatusCode::CONFLICT, msg),
            DomainError::Unauthorized(msg) => ApiError::unauthorized(msg),
            DomainError::Forbidden(msg) => ApiError::forbidden(msg),
            DomainError::Database(_) | DomainError::Internal(_) => {
                error!(error = %e, "Request failed");
                ApiError::internal()
            }
        }
    }
}

impl From<SpreadsheetError> for ApiError {
    fn from(e: SpreadsheetError) -> Self {
        match e {
            SpreadsheetError::Empty => ApiError::bad_request("Empty file"),
            SpreadsheetError::Read(_) => ApiError::bad_request(e.to_string()),
            SpreadsheetError::Write(_) => {
                error!(error = %e, "Failed to build workbook");
                ApiError::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// ── Request shapes ─────────────────────────────────────────────

/// Numeric `{id}` path segment; anything else answers 400 `Invalid id`.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("Invalid id"))?;
        raw.trim()
            .parse()
            .map(IdPath)
            .map_err(|_| ApiError::bad_request("Invalid id"))
    }
}

/// Raw `page` / `per_page` query values, coerced leniently
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl PageParams {
    pub fn window(&self, policy: PerPagePolicy) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.per_page.as_deref(), policy)
    }
}

// ── Success shapes ─────────────────────────────────────────────

/// `{ "ok": true }`
#[derive(Debug, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn json() -> Json<Self> {
        Json(Self { ok: true })
    }
}

/// One page of a list endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct PageResponse<T> {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
    pub rows: Vec<T>,
}

impl<T> PageResponse<T> {
    pub fn from_result<D>(result: PaginatedResult<D>) -> Self
    where
        T: From<D>,
    {
        Self {
            page: result.page,
            per_page: result.per_page,
            total: result.total,
            total_pages: result.total_pages,
            rows: result.rows.into_iter().map(T::from).collect(),
        }
    }
}

/// An `.xlsx` attachment
pub struct XlsxDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl XlsxDownload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

impl IntoResponse for XlsxDownload {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        let Ok(disposition) = HeaderValue::from_str(&disposition) else {
            return ApiError::internal().into_response();
        };
        (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}
