//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::IdentityService;
use crate::config::ServerConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ApiError, ErrorBody, OkResponse};
use crate::interfaces::http::middleware::auth_middleware;
use crate::interfaces::http::modules::health::HealthState;
use crate::interfaces::http::modules::metrics::{http_metrics_middleware, MetricsState};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{
    admins, attendance, auth, health, metrics, reports, sessions, students,
};

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub identity: Arc<IdentityService>,
    pub jwt_config: JwtConfig,
    pub db: DatabaseConnection,
    pub metrics: PrometheusHandle,
    pub started_at: Arc<Instant>,
}

impl AppState {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        identity: Arc<IdentityService>,
        db: DatabaseConnection,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            jwt_config: identity.jwt_config().clone(),
            repos,
            identity,
            db,
            metrics,
            started_at: Arc::new(Instant::now()),
        }
    }
}

// -- FromRef implementations so infrastructure handlers keep a narrow state --

impl FromRef<AppState> for HealthState {
    fn from_ref(s: &AppState) -> Self {
        HealthState {
            db: s.db.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

impl FromRef<AppState> for MetricsState {
    fn from_ref(s: &AppState) -> Self {
        MetricsState {
            handle: s.metrics.clone(),
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::me,
        // Students
        students::list_students,
        students::create_student,
        students::get_student,
        students::update_student,
        students::update_notes,
        students::delete_student,
        students::student_sessions,
        students::export_students,
        students::download_template,
        students::import_students,
        // Sessions
        sessions::list_sessions,
        sessions::get_session,
        sessions::create_session,
        sessions::update_session,
        sessions::delete_session,
        // Attendance
        attendance::list_for_session,
        attendance::seed_absent,
        attendance::mark,
        attendance::export_session,
        // Reports
        reports::summary,
        reports::students_by_birth_year,
        reports::students_by_graduation_year,
        reports::gender_distribution,
        reports::birthdays,
        reports::export_birthdays,
        reports::students_by_count,
        // Admins
        admins::list_admins,
        admins::create_admin,
        admins::delete_admin,
    ),
    components(
        schemas(
            ErrorBody,
            OkResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            students::StudentRequest,
            students::NotesRequest,
            students::StudentResponse,
            students::CreatedResponse,
            students::StudentSessionResponse,
            students::ImportResponse,
            sessions::SessionRequest,
            sessions::SessionResponse,
            attendance::MarkRequest,
            attendance::AttendanceResponse,
            attendance::SeedResponse,
            reports::SummaryResponse,
            reports::BirthYearCount,
            reports::GraduationYearCount,
            reports::GenderCountResponse,
            reports::BirthdayResponse,
            reports::TallyResponse,
            reports::CountReportResponse,
            admins::CreateAdminRequest,
            admins::AdminResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Login (JWT) and the current user"),
        (name = "Students", description = "Student records, history, export and import"),
        (name = "Sessions", description = "Class sessions"),
        (name = "Attendance", description = "Per-session attendance: roster, seeding, marking"),
        (name = "Reports", description = "Aggregate reports (admin only)"),
        (name = "Admins", description = "Admin account management"),
    ),
    info(
        title = "Attendance Service API",
        version = "0.1.0",
        description = "REST API for students, class sessions and attendance"
    )
)]
pub struct ApiDoc;

/// CORS for the configured origins; an empty list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(allowed))
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

/// Build the full HTTP router.
///
/// Everything under `/api` needs a valid token except login and health.
/// Role checks happen per handler through the `RequireAdmin` extractor.
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/health", get(health::health_check));

    let protected_routes = Router::new()
        // Auth
        .route("/api/auth/me", get(auth::me))
        // Students
        .route(
            "/api/students",
            get(students::list_students).post(students::create_student),
        )
        .route("/api/students/export", get(students::export_students))
        .route("/api/students/template", get(students::download_template))
        .route(
            "/api/students/import",
            post(students::import_students)
                .layer(DefaultBodyLimit::max(students::IMPORT_BODY_LIMIT)),
        )
        .route(
            "/api/students/{id}",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        .route("/api/students/{id}/notes", put(students::update_notes))
        .route("/api/students/{id}/sessions", get(students::student_sessions))
        // Sessions
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/api/sessions/{id}",
            get(sessions::get_session)
                .put(sessions::update_session)
                .delete(sessions::delete_session),
        )
        // Attendance
        .route(
            "/api/attendance/session/{session_id}",
            get(attendance::list_for_session),
        )
        .route(
            "/api/attendance/seed/{session_id}",
            post(attendance::seed_absent),
        )
        .route("/api/attendance/mark", post(attendance::mark))
        .route(
            "/api/attendance/export/session/{session_id}",
            get(attendance::export_session),
        )
        // Reports
        .route("/api/reports/summary", get(reports::summary))
        .route(
            "/api/reports/students-by-birthyear",
            get(reports::students_by_birth_year),
        )
        .route(
            "/api/reports/students-by-graduation-year",
            get(reports::students_by_graduation_year),
        )
        .route(
            "/api/reports/gender-distribution",
            get(reports::gender_distribution),
        )
        .route("/api/reports/birthdays", get(reports::birthdays))
        .route(
            "/api/reports/birthdays/export",
            get(reports::export_birthdays),
        )
        .route(
            "/api/reports/students-by-count",
            get(reports::students_by_count),
        )
        // Admins
        .route(
            "/api/admins",
            get(admins::list_admins).post(admins::create_admin),
        )
        .route("/api/admins/{id}", delete(admins::delete_admin))
        .route_layer(middleware::from_fn_with_state(
            state.jwt_config.clone(),
            auth_middleware,
        ));

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .route("/metrics", get(metrics::prometheus_metrics))
        .fallback(not_found)
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&server.cors_origins))
        .with_state(state)
}
