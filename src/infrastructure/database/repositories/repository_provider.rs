//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::attendance::AttendanceRepository;
use crate::domain::report::ReportRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::session::SessionRepository;
use crate::domain::student::StudentRepository;
use crate::domain::user::UserRepository;

use super::attendance_repository::SeaOrmAttendanceRepository;
use super::report_repository::SeaOrmReportRepository;
use super::session_repository::SeaOrmSessionRepository;
use super::student_repository::SeaOrmStudentRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
pub struct SeaOrmRepositoryProvider {
    db: DatabaseConnection,
    students: SeaOrmStudentRepository,
    sessions: SeaOrmSessionRepository,
    attendance: SeaOrmAttendanceRepository,
    reports: SeaOrmReportRepository,
    users: SeaOrmUserRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            students: SeaOrmStudentRepository::new(db.clone()),
            sessions: SeaOrmSessionRepository::new(db.clone()),
            attendance: SeaOrmAttendanceRepository::new(db.clone()),
            reports: SeaOrmReportRepository::new(db.clone()),
            users: SeaOrmUserRepository::new(db.clone()),
            db,
        }
    }

    /// Underlying pool, used for health checks and shutdown
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn students(&self) -> &dyn StudentRepository {
        &self.students
    }

    fn sessions(&self) -> &dyn SessionRepository {
        &self.sessions
    }

    fn attendance(&self) -> &dyn AttendanceRepository {
        &self.attendance
    }

    fn reports(&self) -> &dyn ReportRepository {
        &self.reports
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }
}
