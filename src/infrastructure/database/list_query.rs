//! Paginated, filtered list queries
//!
//! Every list endpoint goes through [`ListQuery`]: a base `SELECT` (often
//! grouped, with attendance aggregates) is narrowed by optional filters,
//! counted, ordered and sliced into one page.
//!
//! Filters that receive `None` add nothing, so an empty filter set matches
//! every row. The total is counted from the same filtered select that
//! produces the rows (wrapped as a sub-query), which keeps it correct for
//! grouped queries with `HAVING`.

use sea_orm::sea_query::{Condition, Expr, Func, IntoCondition, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    IntoSimpleExpr, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Value,
};

use crate::shared::{PageRequest, PaginatedResult};

/// `SUM` of present rows over a LEFT JOIN on attendance; 0 without rows
pub const PRESENT_SUM: &str =
    "COALESCE(SUM(CASE WHEN attendance.status = 'Present' THEN 1 ELSE 0 END), 0)";

/// `SUM` of absent rows over a LEFT JOIN on attendance; 0 without rows
pub const ABSENT_SUM: &str =
    "COALESCE(SUM(CASE WHEN attendance.status = 'Absent' THEN 1 ELSE 0 END), 0)";

/// Builder around a sea-orm [`Select`].
pub struct ListQuery<E: EntityTrait> {
    select: Select<E>,
    order: Vec<(SimpleExpr, Order)>,
}

impl<E> ListQuery<E>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    pub fn new(select: Select<E>) -> Self {
        Self {
            select,
            order: Vec::new(),
        }
    }

    /// Case-insensitive substring match on one column.
    pub fn contains<C: ColumnTrait>(self, column: C, needle: Option<&str>) -> Self {
        self.contains_any(&[column], needle)
    }

    /// Case-insensitive substring match on any of `columns`.
    /// A missing or blank needle adds no constraint.
    pub fn contains_any<C: ColumnTrait>(mut self, columns: &[C], needle: Option<&str>) -> Self {
        let Some(needle) = needle.map(str::trim).filter(|n| !n.is_empty()) else {
            return self;
        };
        let pattern = format!("%{}%", needle.to_lowercase());
        let condition = columns.iter().fold(Condition::any(), |cond, column| {
            cond.add(Expr::expr(Func::lower(Expr::col(column.as_column_ref()))).like(&pattern))
        });
        self.select = self.select.filter(condition);
        self
    }

    /// Exact match when a value is present.
    pub fn eq<C, V>(mut self, column: C, value: Option<V>) -> Self
    where
        C: ColumnTrait,
        V: Into<Value>,
    {
        if let Some(value) = value {
            self.select = self.select.filter(column.eq(value));
        }
        self
    }

    /// Unconditional `WHERE` predicate
    pub fn filter<F: IntoCondition>(mut self, condition: F) -> Self {
        self.select = self.select.filter(condition);
        self
    }

    /// `HAVING <aggregate> = value` when a value is present.
    pub fn having_eq(mut self, aggregate: &str, value: Option<i64>) -> Self {
        if let Some(value) = value {
            self.select = self
                .select
                .having(Expr::expr(Expr::cust(aggregate)).eq(value));
        }
        self
    }

    /// Append a sort key. Call order is sort priority; callers finish with
    /// the primary key so that pages never overlap.
    pub fn order_by<X: IntoSimpleExpr>(mut self, expr: X, order: Order) -> Self {
        self.order.push((expr.into_simple_expr(), order));
        self
    }

    fn ordered(self) -> Select<E> {
        self.order
            .into_iter()
            .fold(self.select, |select, (expr, order)| select.order_by(expr, order))
    }

    /// Count the filtered rows, then load the requested window.
    pub async fn fetch_page<M>(
        self,
        db: &DatabaseConnection,
        page: PageRequest,
    ) -> Result<PaginatedResult<M>, DbErr>
    where
        M: FromQueryResult,
    {
        let total = self.select.clone().count(db).await?;
        let rows = self
            .ordered()
            .offset(page.offset())
            .limit(page.per_page)
            .into_model::<M>()
            .all(db)
            .await?;
        Ok(PaginatedResult::new(rows, total, page))
    }

    /// Every filtered row in order, for exports.
    pub async fn fetch_all<M>(self, db: &DatabaseConnection) -> Result<Vec<M>, DbErr>
    where
        M: FromQueryResult,
    {
        self.ordered().into_model::<M>().all(db).await
    }
}

/// Calendar year of a date column as an integer expression
pub fn year_of(backend: DatabaseBackend, column: &str) -> String {
    match backend {
        DatabaseBackend::Sqlite => format!("CAST(strftime('%Y', {}) AS INTEGER)", column),
        DatabaseBackend::Postgres => format!("CAST(EXTRACT(YEAR FROM {}) AS INTEGER)", column),
        DatabaseBackend::MySql => format!("YEAR({})", column),
    }
}

/// Month (1-12) of a date column as an integer expression
pub fn month_of(backend: DatabaseBackend, column: &str) -> String {
    match backend {
        DatabaseBackend::Sqlite => format!("CAST(strftime('%m', {}) AS INTEGER)", column),
        DatabaseBackend::Postgres => format!("EXTRACT(MONTH FROM {})", column),
        DatabaseBackend::MySql => format!("MONTH({})", column),
    }
}

/// Day of month (1-31) of a date column as an integer expression
pub fn day_of(backend: DatabaseBackend, column: &str) -> String {
    match backend {
        DatabaseBackend::Sqlite => format!("CAST(strftime('%d', {}) AS INTEGER)", column),
        DatabaseBackend::Postgres => format!("EXTRACT(DAY FROM {})", column),
        DatabaseBackend::MySql => format!("DAYOFMONTH({})", column),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, Set};

    use super::*;
    use crate::infrastructure::database::entities::student;
    use crate::test_support::test_db;

    #[derive(Debug, FromQueryResult)]
    struct Row {
        id: i32,
        name: String,
    }

    async fn seed(db: &DatabaseConnection, count: usize) {
        for i in 1..=count {
            student::ActiveModel {
                name: Set(format!("Student {:02}", i)),
                phone: Set(format!("0700{:04}", i)),
                gender: Set(Some(if i % 2 == 0 { "F" } else { "M" }.to_string())),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await
            .unwrap();
        }
    }

    fn by_name() -> ListQuery<student::Entity> {
        ListQuery::new(student::Entity::find())
            .order_by(student::Column::Name, Order::Asc)
            .order_by(student::Column::Id, Order::Asc)
    }

    #[tokio::test]
    async fn empty_filters_match_everything() {
        let db = test_db().await;
        seed(&db, 7).await;

        let page = ListQuery::new(student::Entity::find())
            .contains(student::Column::Name, None)
            .contains(student::Column::Phone, Some("   "))
            .eq(student::Column::Gender, None::<String>)
            .fetch_page::<Row>(&db, PageRequest::new(1, 100))
            .await
            .unwrap();

        assert_eq!(page.total, 7);
        assert_eq!(page.rows.len(), 7);
    }

    #[tokio::test]
    async fn last_page_holds_the_remainder() {
        let db = test_db().await;
        seed(&db, 25).await;

        let page = by_name()
            .fetch_page::<Row>(&db, PageRequest::new(3, 10))
            .await
            .unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.rows[0].name, "Student 21");
    }

    #[tokio::test]
    async fn pages_partition_the_full_result() {
        let db = test_db().await;
        seed(&db, 23).await;

        let mut seen = Vec::new();
        for n in 1..=3 {
            let page = by_name()
                .fetch_page::<Row>(&db, PageRequest::new(n, 10))
                .await
                .unwrap();
            seen.extend(page.rows.into_iter().map(|r| r.id));
        }
        let all: Vec<i32> = by_name()
            .fetch_all::<Row>(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();

        assert_eq!(seen, all);
        assert_eq!(seen.len(), 23);
    }

    #[tokio::test]
    async fn contains_is_case_insensitive_and_counts_match_rows() {
        let db = test_db().await;
        seed(&db, 12).await;

        let page = by_name()
            .contains_any(&[student::Column::Name, student::Column::Phone], Some("STUDENT 1"))
            .fetch_page::<Row>(&db, PageRequest::new(1, 2))
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.rows.len(), 2);
    }

    #[tokio::test]
    async fn exact_filter_narrows_rows() {
        let db = test_db().await;
        seed(&db, 10).await;

        let page = by_name()
            .eq(student::Column::Gender, Some("F"))
            .fetch_page::<Row>(&db, PageRequest::new(1, 10))
            .await
            .unwrap();

        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn empty_result_still_has_one_page() {
        let db = test_db().await;

        let page = by_name()
            .contains(student::Column::Name, Some("nobody"))
            .fetch_page::<Row>(&db, PageRequest::new(4, 10))
            .await
            .unwrap();

        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 1);
        assert!(page.rows.is_empty());
    }

    #[test]
    fn date_part_expressions_follow_backend() {
        assert_eq!(
            month_of(DatabaseBackend::Sqlite, "students.birthdate"),
            "CAST(strftime('%m', students.birthdate) AS INTEGER)"
        );
        assert_eq!(
            day_of(DatabaseBackend::Postgres, "students.birthdate"),
            "EXTRACT(DAY FROM students.birthdate)"
        );
        assert_eq!(
            year_of(DatabaseBackend::Sqlite, "students.birthdate"),
            "CAST(strftime('%Y', students.birthdate) AS INTEGER)"
        );
        assert_eq!(
            year_of(DatabaseBackend::MySql, "students.birthdate"),
            "YEAR(students.birthdate)"
        );
    }
}
