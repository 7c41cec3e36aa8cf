//! Router-level tests: auth, role checks and the main request flows

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::{create_router, AppState};
use crate::application::IdentityService;
use crate::config::ServerConfig;
use crate::domain::{NewUser, RepositoryProvider, UserRole};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::hash_password;
use crate::infrastructure::database::SeaOrmRepositoryProvider;
use crate::infrastructure::spreadsheet::{Cell, SheetSpec, XLSX_CONTENT_TYPE};
use crate::test_support::test_db;

struct TestApp {
    router: Router,
    admin_token: String,
    viewer_token: String,
}

impl TestApp {
    async fn new() -> Self {
        let db = test_db().await;
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let identity = Arc::new(IdentityService::new(
            repos.clone(),
            JwtConfig::default(),
            4,
        ));

        let admin = identity
            .create_admin("Root", "root@example.com", "secret")
            .await
            .unwrap();
        let viewer = repos
            .users()
            .create(NewUser {
                name: "Viewer".into(),
                email: "viewer@example.com".into(),
                password_hash: hash_password("secret", 4).unwrap(),
                role: UserRole::Viewer,
            })
            .await
            .unwrap();

        let metrics = PrometheusBuilder::new().build_recorder().handle();
        let state = AppState::new(repos, identity, db, metrics);
        let admin_token = create_token(&admin, &state.jwt_config).unwrap();
        let viewer_token = create_token(&viewer, &state.jwt_config).unwrap();

        Self {
            router: create_router(state, &ServerConfig::default()),
            admin_token,
            viewer_token,
        }
    }

    async fn raw(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.raw(request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn admin(&self) -> String {
        format!("Bearer {}", self.admin_token)
    }

    fn viewer(&self) -> String {
        format!("Bearer {}", self.viewer_token)
    }

    async fn create_student(&self, name: &str, phone: &str) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/students",
                Some(&self.admin()),
                Some(json!({ "name": name, "phone": phone })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    async fn create_session(&self, title: &str, date: &str) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/sessions",
                Some(&self.admin()),
                Some(json!({ "title": title, "session_date": date })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    async fn mark(&self, session_id: i64, student_id: i64, status: &str) -> StatusCode {
        self.call(
            Method::POST,
            "/api/attendance/mark",
            Some(&self.admin()),
            Some(json!({ "session_id": session_id, "student_id": student_id, "status": status })),
        )
        .await
        .0
    }
}

// ── Auth ───────────────────────────────────────────────────────

#[tokio::test]
async fn protected_routes_need_a_token() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/api/students", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing token");

    let (status, body) = app
        .call(Method::GET, "/api/students", Some("Bearer nope"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn bare_token_is_accepted() {
    let app = TestApp::new().await;
    let token = app.admin_token.clone();

    let (status, body) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "root@example.com");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": " ROOT@example.com ", "password": "secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["name"], "Root");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "root@example.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, _) = app
        .call(Method::POST, "/api/auth/login", None, Some(json!({ "email": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn viewers_can_read_but_not_write() {
    let app = TestApp::new().await;
    let viewer = app.viewer();

    let (status, _) = app.call(Method::GET, "/api/students", Some(&viewer), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/students",
            Some(&viewer),
            Some(json!({ "name": "Sara", "phone": "0790" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin only");

    let (status, _) = app
        .call(Method::GET, "/api/reports/summary", Some(&viewer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn public_routes_and_fallback() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"]["status"], "ok");

    let (status, body) = app.call(Method::GET, "/api/nothing-here", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

// ── Students ───────────────────────────────────────────────────

#[tokio::test]
async fn student_create_rules() {
    let app = TestApp::new().await;
    let admin = app.admin();

    app.create_student("Sara", "0790").await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/students",
            Some(&admin),
            Some(json!({ "name": "Other", "phone": " 0790 " })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/students",
            Some(&admin),
            Some(json!({ "name": "   ", "phone": "0791" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and phone are required");

    let (status, body) = app
        .call(Method::GET, "/api/students/abc", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid id");

    let (status, body) = app
        .call(Method::GET, "/api/students/999", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Student not found");
}

#[tokio::test]
async fn student_list_is_paged() {
    let app = TestApp::new().await;
    for i in 0..25 {
        app.create_student(&format!("Student {i:02}"), &format!("07{i:02}"))
            .await;
    }

    let (status, body) = app
        .call(
            Method::GET,
            "/api/students?page=3&per_page=10",
            Some(&app.viewer()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 25);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["page"], 3);
    assert_eq!(body["rows"].as_array().unwrap().len(), 5);
    assert_eq!(body["rows"][0]["name"], "Student 20");

    let (_, body) = app
        .call(
            Method::GET,
            "/api/students?page=x&per_page=0",
            Some(&app.viewer()),
            None,
        )
        .await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 10);
}

#[tokio::test]
async fn student_import_counts_rows() {
    let app = TestApp::new().await;
    app.create_student("Old name", "0790").await;

    let mut sheet = SheetSpec::new("Students", &["Name", "Phone"]);
    sheet.push_row(vec![Cell::Text("Sara".into()), Cell::Text("0790".into())]);
    sheet.push_row(vec![Cell::Text("Omar".into()), Cell::Text("0791".into())]);
    sheet.push_row(vec![Cell::Empty, Cell::Text("0792".into())]);
    let workbook = sheet.to_xlsx().unwrap();

    let boundary = "XLSXBOUNDARY";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"students.xlsx\"\r\nContent-Type: {XLSX_CONTENT_TYPE}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(&workbook);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/students/import")
        .header(header::AUTHORIZATION, app.admin())
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.raw(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let report: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(report["inserted"], 1);
    assert_eq!(report["updated"], 1);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["errors"][0], "Row 4: missing name or phone");
}

#[tokio::test]
async fn import_without_file_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(Method::POST, "/api/students/import", Some(&app.admin()), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "File is required");
}

#[tokio::test]
async fn export_sends_a_workbook() {
    let app = TestApp::new().await;
    app.create_student("Sara", "0790").await;

    let request = Request::builder()
        .uri("/api/students/export")
        .header(header::AUTHORIZATION, app.admin())
        .body(Body::empty())
        .unwrap();
    let response = app.raw(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"students.xlsx\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"PK"));
}

// ── Attendance ─────────────────────────────────────────────────

#[tokio::test]
async fn seeding_is_idempotent() {
    let app = TestApp::new().await;
    app.create_student("Sara", "0790").await;
    app.create_student("Omar", "0791").await;
    let session = app.create_session("Week 1", "2026-03-02").await;
    let uri = format!("/api/attendance/seed/{session}");

    let (status, body) = app.call(Method::POST, &uri, Some(&app.admin()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 2);

    let (_, body) = app.call(Method::POST, &uri, Some(&app.admin()), None).await;
    assert_eq!(body["inserted"], 0);

    let (status, body) = app
        .call(Method::POST, "/api/attendance/seed/404", Some(&app.admin()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found");
}

#[tokio::test]
async fn marking_checks_its_input() {
    let app = TestApp::new().await;
    let student = app.create_student("Sara", "0790").await;
    let session = app.create_session("Week 1", "2026-03-02").await;

    assert_eq!(app.mark(session, student, "present").await, StatusCode::BAD_REQUEST);
    assert_eq!(app.mark(session, 999, "Present").await, StatusCode::NOT_FOUND);
    assert_eq!(app.mark(999, student, "Present").await, StatusCode::NOT_FOUND);
    assert_eq!(app.mark(session, student, "Present").await, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/attendance/session/{session}"),
            Some(&app.viewer()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"][0]["status"], "Present");
    assert!(body["rows"][0]["marked_at"].is_string());
}

// ── Reports ────────────────────────────────────────────────────

#[tokio::test]
async fn students_by_count_matches_exact_totals() {
    let app = TestApp::new().await;
    let sara = app.create_student("Sara", "0790").await;
    let omar = app.create_student("Omar", "0791").await;
    let first = app.create_session("Week 1", "2026-03-02").await;
    let second = app.create_session("Week 2", "2026-03-09").await;

    app.mark(first, sara, "Present").await;
    app.mark(second, sara, "Absent").await;
    app.mark(first, omar, "Present").await;
    app.mark(second, omar, "Present").await;

    let (status, body) = app
        .call(
            Method::GET,
            "/api/reports/students-by-count?present=1&absent=1",
            Some(&app.admin()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["present"], 1);
    assert_eq!(body["absent"], 1);
    assert_eq!(body["total"], 1);
    assert_eq!(body["rows"][0]["name"], "Sara");
    assert_eq!(body["rows"][0]["percent_present"], 50);

    let (status, body) = app
        .call(
            Method::GET,
            "/api/reports/students-by-count?present=-1&absent=0",
            Some(&app.admin()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "present and absent must be non-negative integers");
}

#[tokio::test]
async fn birthdays_need_a_valid_month() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(
            Method::GET,
            "/api/reports/birthdays?month=13",
            Some(&app.admin()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "month must be 1-12");
}

// ── Admins ─────────────────────────────────────────────────────

#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let app = TestApp::new().await;
    let (_, admins) = app
        .call(Method::GET, "/api/admins", Some(&app.admin()), None)
        .await;
    let own_id = admins[0]["id"].as_i64().unwrap();

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/admins/{own_id}"),
            Some(&app.admin()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/admins",
            Some(&app.admin()),
            Some(json!({ "name": "Second", "email": "ROOT@example.com", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already exists");
}
