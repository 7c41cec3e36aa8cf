//! SeaORM implementation of AttendanceRepository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    Order, PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, Set,
};
use tracing::debug;

use super::db_err;
use crate::domain::attendance::{
    AttendanceEntry, AttendanceExportRow, AttendanceFilter, AttendanceRepository,
    AttendanceStatus, MarkAttendance,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{attendance, session, student};
use crate::infrastructure::database::list_query::ListQuery;
use crate::shared::{PageRequest, PaginatedResult};

pub struct SeaOrmAttendanceRepository {
    db: DatabaseConnection,
}

impl SeaOrmAttendanceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Query rows ──────────────────────────────────────────────────

#[derive(Debug, FromQueryResult)]
struct RosterRow {
    session_id: i32,
    student_id: i32,
    name: String,
    phone: String,
    status: attendance::Status,
    marked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromQueryResult)]
struct ExportRow {
    student_id: i32,
    name: String,
    phone: String,
    status: attendance::Status,
    marked_at: Option<DateTime<Utc>>,
    session_title: String,
    session_date: NaiveDate,
}

impl From<RosterRow> for AttendanceEntry {
    fn from(r: RosterRow) -> Self {
        AttendanceEntry {
            session_id: r.session_id,
            student_id: r.student_id,
            name: r.name,
            phone: r.phone,
            status: r.status.into(),
            marked_at: r.marked_at,
        }
    }
}

impl From<ExportRow> for AttendanceExportRow {
    fn from(r: ExportRow) -> Self {
        AttendanceExportRow {
            student_id: r.student_id,
            name: r.name,
            phone: r.phone,
            status: r.status.into(),
            marked_at: r.marked_at,
            session_title: r.session_title,
            session_date: r.session_date,
        }
    }
}

fn roster(session_id: i32) -> ListQuery<attendance::Entity> {
    let select = attendance::Entity::find()
        .select_only()
        .columns([
            attendance::Column::SessionId,
            attendance::Column::StudentId,
            attendance::Column::Status,
            attendance::Column::MarkedAt,
        ])
        .column_as(student::Column::Name, "name")
        .column_as(student::Column::Phone, "phone")
        .join(JoinType::InnerJoin, attendance::Relation::Student.def());

    ListQuery::new(select).filter(attendance::Column::SessionId.eq(session_id))
}

// ── AttendanceRepository impl ───────────────────────────────────

#[async_trait]
impl AttendanceRepository for SeaOrmAttendanceRepository {
    async fn list_for_session(
        &self,
        session_id: i32,
        filter: AttendanceFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<AttendanceEntry>> {
        let result = roster(session_id)
            .contains(student::Column::Name, filter.name.as_deref())
            .contains(student::Column::Phone, filter.phone.as_deref())
            .eq(
                attendance::Column::Status,
                filter.status.map(attendance::Status::from),
            )
            .order_by(student::Column::Name, Order::Asc)
            .order_by(attendance::Column::StudentId, Order::Asc)
            .fetch_page::<RosterRow>(&self.db, page)
            .await
            .map_err(db_err)?;
        Ok(result.map(AttendanceEntry::from))
    }

    async fn seed_absent(&self, session_id: i32) -> DomainResult<u64> {
        // INSERT INTO attendance (session_id, student_id, status)
        // SELECT ?, s.id, 'Absent' FROM students s WHERE NOT EXISTS (...)
        let already_present = Query::select()
            .expr(Expr::val(1))
            .from(attendance::Entity)
            .and_where(Expr::col((attendance::Entity, attendance::Column::SessionId)).eq(session_id))
            .and_where(
                Expr::col((attendance::Entity, attendance::Column::StudentId))
                    .equals((student::Entity, student::Column::Id)),
            )
            .to_owned();

        let missing_students = Query::select()
            .expr(Expr::val(session_id))
            .column((student::Entity, student::Column::Id))
            .expr(Expr::val(AttendanceStatus::Absent.as_str()))
            .from(student::Entity)
            .and_where(Expr::exists(already_present).not())
            .to_owned();

        let insert = Query::insert()
            .into_table(attendance::Entity)
            .columns([
                attendance::Column::SessionId,
                attendance::Column::StudentId,
                attendance::Column::Status,
            ])
            .select_from(missing_students)
            .map_err(|e| DomainError::Internal(e.to_string()))?
            .to_owned();

        let backend = self.db.get_database_backend();
        let result = self
            .db
            .execute(backend.build(&insert))
            .await
            .map_err(db_err)?;

        debug!(
            "Seeded {} absent rows for session {}",
            result.rows_affected(),
            session_id
        );
        Ok(result.rows_affected())
    }

    async fn mark(&self, mark: MarkAttendance) -> DomainResult<()> {
        let session_found = session::Entity::find_by_id(mark.session_id)
            .count(&self.db)
            .await
            .map_err(db_err)?;
        if session_found == 0 {
            return Err(DomainError::not_found("Session", mark.session_id));
        }

        let student_found = student::Entity::find_by_id(mark.student_id)
            .count(&self.db)
            .await
            .map_err(db_err)?;
        if student_found == 0 {
            return Err(DomainError::not_found("Student", mark.student_id));
        }

        let model = attendance::ActiveModel {
            session_id: Set(mark.session_id),
            student_id: Set(mark.student_id),
            status: Set(mark.status.into()),
            marked_at: Set(Some(Utc::now())),
            ..Default::default()
        };

        attendance::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([attendance::Column::SessionId, attendance::Column::StudentId])
                    .update_columns([attendance::Column::Status, attendance::Column::MarkedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        debug!(
            "Marked student {} as {} in session {}",
            mark.student_id, mark.status, mark.session_id
        );
        Ok(())
    }

    async fn export_for_session(&self, session_id: i32) -> DomainResult<Vec<AttendanceExportRow>> {
        let select = attendance::Entity::find()
            .select_only()
            .columns([
                attendance::Column::StudentId,
                attendance::Column::Status,
                attendance::Column::MarkedAt,
            ])
            .column_as(student::Column::Name, "name")
            .column_as(student::Column::Phone, "phone")
            .column_as(session::Column::Title, "session_title")
            .column_as(session::Column::SessionDate, "session_date")
            .join(JoinType::InnerJoin, attendance::Relation::Student.def())
            .join(JoinType::InnerJoin, attendance::Relation::Session.def());

        let rows = ListQuery::new(select)
            .filter(attendance::Column::SessionId.eq(session_id))
            .order_by(student::Column::Name, Order::Asc)
            .order_by(attendance::Column::StudentId, Order::Asc)
            .fetch_all::<ExportRow>(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(AttendanceExportRow::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::{SessionInput, SessionRepository};
    use crate::domain::student::{StudentInput, StudentRepository};
    use crate::infrastructure::database::repositories::session_repository::SeaOrmSessionRepository;
    use crate::infrastructure::database::repositories::student_repository::SeaOrmStudentRepository;
    use crate::test_support::test_db;

    struct Fixture {
        attendance: SeaOrmAttendanceRepository,
        students: SeaOrmStudentRepository,
        session_id: i32,
        student_ids: Vec<i32>,
    }

    async fn fixture(student_count: usize) -> Fixture {
        let db = test_db().await;
        let sessions = SeaOrmSessionRepository::new(db.clone());
        let students = SeaOrmStudentRepository::new(db.clone());

        let session_id = sessions
            .create(SessionInput {
                title: "Morning".into(),
                session_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            })
            .await
            .unwrap()
            .session
            .id;

        let mut student_ids = Vec::new();
        for i in 0..student_count {
            let id = students
                .create(StudentInput {
                    name: format!("Student {}", (b'A' + i as u8) as char),
                    phone: format!("09{}", i),
                    ..Default::default()
                })
                .await
                .unwrap();
            student_ids.push(id);
        }

        Fixture {
            attendance: SeaOrmAttendanceRepository::new(db),
            students,
            session_id,
            student_ids,
        }
    }

    fn mark(session_id: i32, student_id: i32, status: AttendanceStatus) -> MarkAttendance {
        MarkAttendance {
            session_id,
            student_id,
            status,
        }
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let f = fixture(4).await;

        assert_eq!(f.attendance.seed_absent(f.session_id).await.unwrap(), 4);
        assert_eq!(f.attendance.seed_absent(f.session_id).await.unwrap(), 0);

        let page = f
            .attendance
            .list_for_session(f.session_id, AttendanceFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 4);
        assert!(page
            .rows
            .iter()
            .all(|r| r.status == AttendanceStatus::Absent && r.marked_at.is_none()));
    }

    #[tokio::test]
    async fn seeding_skips_already_marked_students() {
        let f = fixture(3).await;
        f.attendance
            .mark(mark(f.session_id, f.student_ids[1], AttendanceStatus::Present))
            .await
            .unwrap();

        assert_eq!(f.attendance.seed_absent(f.session_id).await.unwrap(), 2);

        let present = f
            .attendance
            .list_for_session(
                f.session_id,
                AttendanceFilter {
                    status: Some(AttendanceStatus::Present),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(present.total, 1);
        assert_eq!(present.rows[0].student_id, f.student_ids[1]);
    }

    #[tokio::test]
    async fn last_mark_wins() {
        let f = fixture(1).await;
        let student_id = f.student_ids[0];

        for status in [
            AttendanceStatus::Present,
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
        ] {
            f.attendance
                .mark(mark(f.session_id, student_id, status))
                .await
                .unwrap();
        }

        let page = f
            .attendance
            .list_for_session(f.session_id, AttendanceFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].status, AttendanceStatus::Absent);
        assert!(page.rows[0].marked_at.is_some());

        let counts = f.students.find_with_counts(student_id).await.unwrap().unwrap();
        assert_eq!((counts.present_count, counts.absent_count), (0, 1));
    }

    #[tokio::test]
    async fn marking_unknown_rows_is_not_found() {
        let f = fixture(1).await;

        let err = f
            .attendance
            .mark(mark(f.session_id + 1, f.student_ids[0], AttendanceStatus::Present))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Session", .. }));

        let err = f
            .attendance
            .mark(mark(f.session_id, 999, AttendanceStatus::Present))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Student", .. }));
    }

    #[tokio::test]
    async fn roster_filters_by_name_and_exports_in_name_order() {
        let f = fixture(3).await;
        f.attendance.seed_absent(f.session_id).await.unwrap();

        let page = f
            .attendance
            .list_for_session(
                f.session_id,
                AttendanceFilter {
                    name: Some("student b".into()),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].name, "Student B");

        let export = f.attendance.export_for_session(f.session_id).await.unwrap();
        let names: Vec<_> = export.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Student A", "Student B", "Student C"]);
        assert_eq!(export[0].session_title, "Morning");
    }
}
