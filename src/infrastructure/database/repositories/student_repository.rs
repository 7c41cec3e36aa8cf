//! SeaORM implementation of StudentRepository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
    Set,
};
use tracing::debug;

use super::{db_err, write_err};
use crate::domain::student::{
    Student, StudentFilter, StudentInput, StudentRepository, StudentSessionEntry, StudentSort,
    StudentWithCounts, UpsertOutcome,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{attendance, session, student};
use crate::infrastructure::database::list_query::{ListQuery, ABSENT_SUM, PRESENT_SUM};
use crate::shared::{PageRequest, PaginatedResult};

const DUPLICATE_PHONE: &str = "Duplicate (phone) detected";

pub struct SeaOrmStudentRepository {
    db: DatabaseConnection,
}

impl SeaOrmStudentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Query rows ──────────────────────────────────────────────────

#[derive(Debug, FromQueryResult)]
struct StudentCountsRow {
    id: i32,
    name: String,
    father_name: Option<String>,
    last_name: Option<String>,
    address: Option<String>,
    phone: String,
    birthdate: Option<NaiveDate>,
    gender: Option<String>,
    source: Option<String>,
    graduation_year: Option<i32>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    present_count: i64,
    absent_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct SessionHistoryRow {
    session_id: i32,
    title: String,
    session_date: NaiveDate,
    status: attendance::Status,
    marked_at: Option<DateTime<Utc>>,
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: student::Model) -> Student {
    Student {
        id: m.id,
        name: m.name,
        father_name: m.father_name,
        last_name: m.last_name,
        address: m.address,
        phone: m.phone,
        birthdate: m.birthdate,
        gender: m.gender,
        source: m.source,
        graduation_year: m.graduation_year,
        notes: m.notes,
        created_at: m.created_at,
    }
}

fn counts_row_to_domain(r: StudentCountsRow) -> StudentWithCounts {
    StudentWithCounts {
        student: Student {
            id: r.id,
            name: r.name,
            father_name: r.father_name,
            last_name: r.last_name,
            address: r.address,
            phone: r.phone,
            birthdate: r.birthdate,
            gender: r.gender,
            source: r.source,
            graduation_year: r.graduation_year,
            notes: r.notes,
            created_at: r.created_at,
        },
        present_count: r.present_count,
        absent_count: r.absent_count,
    }
}

fn history_row_to_domain(r: SessionHistoryRow) -> StudentSessionEntry {
    StudentSessionEntry {
        session_id: r.session_id,
        title: r.title,
        session_date: r.session_date,
        status: r.status.into(),
        marked_at: r.marked_at,
    }
}

/// Active model carrying every writable field; `id` and `created_at` are
/// left for the caller.
fn input_to_active(input: StudentInput) -> student::ActiveModel {
    student::ActiveModel {
        id: NotSet,
        name: Set(input.name),
        father_name: Set(input.father_name),
        last_name: Set(input.last_name),
        address: Set(input.address),
        phone: Set(input.phone),
        birthdate: Set(input.birthdate),
        gender: Set(input.gender),
        source: Set(input.source),
        graduation_year: Set(input.graduation_year),
        notes: Set(input.notes),
        created_at: NotSet,
    }
}

/// Students LEFT JOIN attendance, grouped per student, with totals
pub(crate) fn students_with_counts() -> Select<student::Entity> {
    student::Entity::find()
        .select_only()
        .columns([
            student::Column::Id,
            student::Column::Name,
            student::Column::FatherName,
            student::Column::LastName,
            student::Column::Address,
            student::Column::Phone,
            student::Column::Birthdate,
            student::Column::Gender,
            student::Column::Source,
            student::Column::GraduationYear,
            student::Column::Notes,
            student::Column::CreatedAt,
        ])
        .column_as(Expr::cust(PRESENT_SUM), "present_count")
        .column_as(Expr::cust(ABSENT_SUM), "absent_count")
        .join(JoinType::LeftJoin, student::Relation::Attendance.def())
        .group_by(student::Column::Id)
}

fn apply_sort(query: ListQuery<student::Entity>, sort: StudentSort) -> ListQuery<student::Entity> {
    match sort {
        StudentSort::NameAsc => query
            .order_by(student::Column::Name, Order::Asc)
            .order_by(student::Column::Id, Order::Asc),
        StudentSort::NameDesc => query
            .order_by(student::Column::Name, Order::Desc)
            .order_by(student::Column::Id, Order::Desc),
        StudentSort::IdAsc => query.order_by(student::Column::Id, Order::Asc),
        StudentSort::IdDesc => query.order_by(student::Column::Id, Order::Desc),
    }
}

// ── StudentRepository impl ──────────────────────────────────────

#[async_trait]
impl StudentRepository for SeaOrmStudentRepository {
    async fn list(
        &self,
        filter: StudentFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<StudentWithCounts>> {
        let query = ListQuery::new(students_with_counts())
            .contains_any(
                &[
                    student::Column::Name,
                    student::Column::FatherName,
                    student::Column::LastName,
                ],
                filter.name.as_deref(),
            )
            .contains(student::Column::Phone, filter.phone.as_deref())
            .eq(student::Column::Gender, filter.gender)
            .eq(student::Column::GraduationYear, filter.graduation_year);

        let result = apply_sort(query, filter.sort)
            .fetch_page::<StudentCountsRow>(&self.db, page)
            .await
            .map_err(db_err)?;
        Ok(result.map(counts_row_to_domain))
    }

    async fn find_with_counts(&self, id: i32) -> DomainResult<Option<StudentWithCounts>> {
        let row = students_with_counts()
            .filter(student::Column::Id.eq(id))
            .into_model::<StudentCountsRow>()
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(counts_row_to_domain))
    }

    async fn find_by_phone(&self, phone: &str) -> DomainResult<Option<Student>> {
        let model = student::Entity::find()
            .filter(student::Column::Phone.eq(phone))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn create(&self, input: StudentInput) -> DomainResult<i32> {
        debug!("Creating student with phone {}", input.phone);

        let mut model = input_to_active(input);
        model.created_at = Set(Utc::now());
        let saved = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, DUPLICATE_PHONE))?;
        Ok(saved.id)
    }

    async fn update(&self, id: i32, input: StudentInput) -> DomainResult<()> {
        debug!("Updating student {}", id);

        let result = student::Entity::update_many()
            .set(input_to_active(input))
            .filter(student::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| write_err(e, DUPLICATE_PHONE))?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Student", id));
        }
        Ok(())
    }

    async fn update_notes(&self, id: i32, notes: Option<String>) -> DomainResult<()> {
        let result = student::Entity::update_many()
            .col_expr(student::Column::Notes, Expr::value(notes))
            .filter(student::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Student", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        debug!("Deleting student {}", id);

        // Two statements, not a transaction.
        attendance::Entity::delete_many()
            .filter(attendance::Column::StudentId.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        let result = student::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Student", id));
        }
        Ok(())
    }

    async fn sessions_for_student(
        &self,
        student_id: i32,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<StudentSessionEntry>> {
        let select = attendance::Entity::find()
            .select_only()
            .column_as(session::Column::Id, "session_id")
            .column_as(session::Column::Title, "title")
            .column_as(session::Column::SessionDate, "session_date")
            .column(attendance::Column::Status)
            .column(attendance::Column::MarkedAt)
            .join(JoinType::InnerJoin, attendance::Relation::Session.def());

        let result = ListQuery::new(select)
            .filter(attendance::Column::StudentId.eq(student_id))
            .order_by(session::Column::SessionDate, Order::Desc)
            .order_by(session::Column::Id, Order::Desc)
            .fetch_page::<SessionHistoryRow>(&self.db, page)
            .await
            .map_err(db_err)?;
        Ok(result.map(history_row_to_domain))
    }

    async fn all(&self) -> DomainResult<Vec<Student>> {
        let models = student::Entity::find()
            .order_by_asc(student::Column::Name)
            .order_by_asc(student::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn upsert_by_phone(&self, input: StudentInput) -> DomainResult<UpsertOutcome> {
        match self.find_by_phone(&input.phone).await? {
            Some(existing) => {
                let mut model = input_to_active(input);
                // Phone is the match key and never changes here.
                model.phone = NotSet;
                student::Entity::update_many()
                    .set(model)
                    .filter(student::Column::Id.eq(existing.id))
                    .exec(&self.db)
                    .await
                    .map_err(db_err)?;
                Ok(UpsertOutcome::Updated(existing.id))
            }
            None => self.create(input).await.map(UpsertOutcome::Inserted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn input(name: &str, phone: &str) -> StudentInput {
        StudentInput {
            name: name.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        }
    }

    async fn repo() -> SeaOrmStudentRepository {
        SeaOrmStudentRepository::new(test_db().await)
    }

    #[tokio::test]
    async fn create_then_find_has_zero_counts() {
        let repo = repo().await;
        let id = repo.create(input("Lina", "555-1")).await.unwrap();

        let found = repo.find_with_counts(id).await.unwrap().unwrap();
        assert_eq!(found.student.name, "Lina");
        assert_eq!(found.present_count, 0);
        assert_eq!(found.absent_count, 0);
        assert!(repo.find_with_counts(id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_phone_is_a_conflict() {
        let repo = repo().await;
        repo.create(input("A", "555")).await.unwrap();
        let other = repo.create(input("B", "777")).await.unwrap();

        let err = repo.create(input("C", "555")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ref m) if m == DUPLICATE_PHONE));

        let err = repo.update(other, input("B", "555")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn name_filter_matches_any_name_part() {
        let repo = repo().await;
        repo.create(StudentInput {
            father_name: Some("Karim".into()),
            ..input("Omar", "1")
        })
        .await
        .unwrap();
        repo.create(StudentInput {
            last_name: Some("Karimi".into()),
            ..input("Sara", "2")
        })
        .await
        .unwrap();
        repo.create(input("Yusuf", "3")).await.unwrap();

        let filter = StudentFilter {
            name: Some("karim".into()),
            ..Default::default()
        };
        let page = repo.list(filter, PageRequest::default()).await.unwrap();
        let names: Vec<_> = page.rows.iter().map(|r| r.student.name.as_str()).collect();
        assert_eq!(names, vec!["Omar", "Sara"]);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn sort_keys_order_rows() {
        let repo = repo().await;
        for (name, phone) in [("Bea", "1"), ("Adam", "2"), ("Cyrus", "3")] {
            repo.create(input(name, phone)).await.unwrap();
        }

        assert_eq!(sorted_names(&repo, StudentSort::NameAsc).await, ["Adam", "Bea", "Cyrus"]);
        assert_eq!(sorted_names(&repo, StudentSort::NameDesc).await, ["Cyrus", "Bea", "Adam"]);
        assert_eq!(sorted_names(&repo, StudentSort::IdDesc).await, ["Cyrus", "Adam", "Bea"]);
    }

    async fn sorted_names(repo: &SeaOrmStudentRepository, sort: StudentSort) -> Vec<String> {
        let filter = StudentFilter {
            sort,
            ..Default::default()
        };
        repo.list(filter, PageRequest::default())
            .await
            .unwrap()
            .rows
            .into_iter()
            .map(|r| r.student.name)
            .collect()
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let repo = repo().await;
        assert!(matches!(
            repo.update(9, input("X", "9")).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            repo.update_notes(9, None).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(repo.delete(9).await, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn notes_update_only_touches_notes() {
        let repo = repo().await;
        let id = repo.create(input("Noor", "42")).await.unwrap();
        repo.update_notes(id, Some("front row".into())).await.unwrap();

        let found = repo.find_with_counts(id).await.unwrap().unwrap();
        assert_eq!(found.student.notes.as_deref(), Some("front row"));
        assert_eq!(found.student.phone, "42");
    }

    #[tokio::test]
    async fn upsert_inserts_then_updates_by_phone() {
        let repo = repo().await;
        let first = repo.upsert_by_phone(input("Old", "100")).await.unwrap();
        let UpsertOutcome::Inserted(id) = first else {
            panic!("expected insert, got {:?}", first);
        };

        let second = repo
            .upsert_by_phone(StudentInput {
                graduation_year: Some(2027),
                ..input("New", "100")
            })
            .await
            .unwrap();
        assert_eq!(second, UpsertOutcome::Updated(id));

        let all = repo.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "New");
        assert_eq!(all[0].graduation_year, Some(2027));
    }
}
