//! SeaORM implementation of ReportRepository

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use super::db_err;
use super::student_repository::students_with_counts;
use crate::domain::report::model::age_on;
use crate::domain::report::{
    AttendanceTally, BirthdayEntry, GenderCount, ReportRepository, Summary, YearCount,
};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::{attendance, session, student};
use crate::infrastructure::database::list_query::{
    day_of, month_of, year_of, ListQuery, ABSENT_SUM, PRESENT_SUM,
};
use crate::shared::{PageRequest, PaginatedResult};

const BIRTHDATE_COLUMN: &str = "students.birthdate";

pub struct SeaOrmReportRepository {
    db: DatabaseConnection,
}

impl SeaOrmReportRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn birthdays_query(&self, month: u32) -> ListQuery<student::Entity> {
        let backend = self.db.get_database_backend();
        let month_expr = month_of(backend, BIRTHDATE_COLUMN);
        let day_expr = day_of(backend, BIRTHDATE_COLUMN);

        ListQuery::new(student::Entity::find())
            .filter(student::Column::Birthdate.is_not_null())
            .filter(Expr::expr(Expr::cust(&month_expr)).eq(month as i32))
            .order_by(Expr::cust(&day_expr), Order::Asc)
            .order_by(student::Column::Name, Order::Asc)
            .order_by(student::Column::Id, Order::Asc)
    }
}

#[derive(Debug, FromQueryResult)]
struct TallyRow {
    id: i32,
    name: String,
    phone: String,
    present_count: i64,
    absent_count: i64,
}

fn birthday_entry(m: student::Model, today: NaiveDate) -> Option<BirthdayEntry> {
    let birthdate = m.birthdate?;
    Some(BirthdayEntry {
        id: m.id,
        name: m.name,
        phone: m.phone,
        address: m.address,
        birthdate,
        gender: m.gender,
        graduation_year: m.graduation_year,
        age: age_on(birthdate, today),
    })
}

#[async_trait]
impl ReportRepository for SeaOrmReportRepository {
    async fn summary(&self) -> DomainResult<Summary> {
        let total_students = student::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let total_sessions = session::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)?;
        let total_attendance = attendance::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(Summary {
            total_students,
            total_sessions,
            total_attendance,
        })
    }

    async fn students_by_birth_year(&self) -> DomainResult<Vec<YearCount>> {
        let year_expr = year_of(self.db.get_database_backend(), BIRTHDATE_COLUMN);

        let rows: Vec<(i32, i64)> = student::Entity::find()
            .select_only()
            .column_as(Expr::cust(&year_expr), "year")
            .column_as(Expr::col(student::Column::Id).count(), "count")
            .filter(student::Column::Birthdate.is_not_null())
            .group_by(Expr::cust(&year_expr))
            .order_by(Expr::cust(&year_expr), Order::Asc)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(year, count)| YearCount {
                year,
                count: count.max(0) as u64,
            })
            .collect())
    }

    async fn students_by_graduation_year(&self) -> DomainResult<Vec<YearCount>> {
        let rows: Vec<(i32, i64)> = student::Entity::find()
            .select_only()
            .column(student::Column::GraduationYear)
            .column_as(Expr::col(student::Column::Id).count(), "count")
            .filter(student::Column::GraduationYear.is_not_null())
            .group_by(student::Column::GraduationYear)
            .order_by_asc(student::Column::GraduationYear)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(year, count)| YearCount {
                year,
                count: count.max(0) as u64,
            })
            .collect())
    }

    async fn gender_distribution(&self) -> DomainResult<Vec<GenderCount>> {
        let rows: Vec<(String, i64)> = student::Entity::find()
            .select_only()
            .column(student::Column::Gender)
            .column_as(Expr::col(student::Column::Id).count(), "count")
            .filter(student::Column::Gender.is_not_null())
            .group_by(student::Column::Gender)
            .order_by_asc(student::Column::Gender)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(gender, count)| GenderCount {
                gender,
                count: count.max(0) as u64,
            })
            .collect())
    }

    async fn birthdays(
        &self,
        month: u32,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<BirthdayEntry>> {
        let result = self
            .birthdays_query(month)
            .fetch_page::<student::Model>(&self.db, page)
            .await
            .map_err(db_err)?;

        let today = Utc::now().date_naive();
        let rows = result
            .rows
            .into_iter()
            .filter_map(|m| birthday_entry(m, today))
            .collect();
        Ok(PaginatedResult {
            rows,
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            total_pages: result.total_pages,
        })
    }

    async fn birthdays_for_export(&self, month: u32) -> DomainResult<Vec<BirthdayEntry>> {
        let models = self
            .birthdays_query(month)
            .fetch_all::<student::Model>(&self.db)
            .await
            .map_err(db_err)?;

        let today = Utc::now().date_naive();
        Ok(models
            .into_iter()
            .filter_map(|m| birthday_entry(m, today))
            .collect())
    }

    async fn students_by_count(
        &self,
        present: i64,
        absent: i64,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<AttendanceTally>> {
        let result = ListQuery::new(students_with_counts())
            .having_eq(PRESENT_SUM, Some(present))
            .having_eq(ABSENT_SUM, Some(absent))
            .order_by(student::Column::Name, Order::Asc)
            .order_by(student::Column::Id, Order::Asc)
            .fetch_page::<TallyRow>(&self.db, page)
            .await
            .map_err(db_err)?;

        Ok(result.map(|r| AttendanceTally {
            id: r.id,
            name: r.name,
            phone: r.phone,
            present_count: r.present_count,
            absent_count: r.absent_count,
        }))
    }
}
