//! SeaORM implementation of SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    Order, PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, Select, Set,
};
use tracing::debug;

use super::db_err;
use crate::domain::session::{
    Session, SessionFilter, SessionInput, SessionRepository, SessionSort, SessionWithCounts,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{attendance, session};
use crate::infrastructure::database::list_query::{ListQuery, ABSENT_SUM, PRESENT_SUM};
use crate::shared::{PageRequest, PaginatedResult};

pub struct SeaOrmSessionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct SessionCountsRow {
    id: i32,
    title: String,
    session_date: NaiveDate,
    created_at: DateTime<Utc>,
    present_count: i64,
    absent_count: i64,
}

fn row_to_domain(r: SessionCountsRow) -> SessionWithCounts {
    SessionWithCounts {
        session: Session {
            id: r.id,
            title: r.title,
            session_date: r.session_date,
            created_at: r.created_at,
        },
        present_count: r.present_count,
        absent_count: r.absent_count,
    }
}

fn sessions_with_counts() -> Select<session::Entity> {
    session::Entity::find()
        .select_only()
        .columns([
            session::Column::Id,
            session::Column::Title,
            session::Column::SessionDate,
            session::Column::CreatedAt,
        ])
        .column_as(Expr::cust(PRESENT_SUM), "present_count")
        .column_as(Expr::cust(ABSENT_SUM), "absent_count")
        .join(JoinType::LeftJoin, session::Relation::Attendance.def())
        .group_by(session::Column::Id)
}

fn apply_sort(query: ListQuery<session::Entity>, sort: SessionSort) -> ListQuery<session::Entity> {
    let (column, order) = match sort {
        SessionSort::DateDesc => (session::Column::SessionDate, Order::Desc),
        SessionSort::DateAsc => (session::Column::SessionDate, Order::Asc),
        SessionSort::TitleAsc => (session::Column::Title, Order::Asc),
        SessionSort::TitleDesc => (session::Column::Title, Order::Desc),
    };
    query
        .order_by(column, order.clone())
        .order_by(session::Column::Id, order)
}

#[async_trait]
impl SessionRepository for SeaOrmSessionRepository {
    async fn list(
        &self,
        filter: SessionFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<SessionWithCounts>> {
        let query = ListQuery::new(sessions_with_counts())
            .contains(session::Column::Title, filter.title.as_deref());

        let result = apply_sort(query, filter.sort)
            .fetch_page::<SessionCountsRow>(&self.db, page)
            .await
            .map_err(db_err)?;
        Ok(result.map(row_to_domain))
    }

    async fn find_with_counts(&self, id: i32) -> DomainResult<Option<SessionWithCounts>> {
        let row = sessions_with_counts()
            .filter(session::Column::Id.eq(id))
            .into_model::<SessionCountsRow>()
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(row.map(row_to_domain))
    }

    async fn exists(&self, id: i32) -> DomainResult<bool> {
        let count = session::Entity::find_by_id(id)
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn create(&self, input: SessionInput) -> DomainResult<SessionWithCounts> {
        debug!("Creating session '{}' on {}", input.title, input.session_date);

        let saved = session::ActiveModel {
            title: Set(input.title),
            session_date: Set(input.session_date),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(SessionWithCounts {
            session: Session {
                id: saved.id,
                title: saved.title,
                session_date: saved.session_date,
                created_at: saved.created_at,
            },
            present_count: 0,
            absent_count: 0,
        })
    }

    async fn update(&self, id: i32, input: SessionInput) -> DomainResult<()> {
        let result = session::Entity::update_many()
            .col_expr(session::Column::Title, Expr::value(input.title))
            .col_expr(session::Column::SessionDate, Expr::value(input.session_date))
            .filter(session::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Session", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        debug!("Deleting session {}", id);

        attendance::Entity::delete_many()
            .filter(attendance::Column::SessionId.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        let result = session::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Session", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn input(title: &str, day: u32) -> SessionInput {
        SessionInput {
            title: title.to_string(),
            session_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        }
    }

    #[tokio::test]
    async fn create_returns_zero_counts() {
        let repo = SeaOrmSessionRepository::new(test_db().await);
        let created = repo.create(input("Intro", 1)).await.unwrap();

        assert_eq!(created.present_count, 0);
        assert_eq!(created.absent_count, 0);
        assert!(repo.exists(created.session.id).await.unwrap());
        assert!(!repo.exists(created.session.id + 1).await.unwrap());
    }

    #[tokio::test]
    async fn default_sort_is_newest_first() {
        let repo = SeaOrmSessionRepository::new(test_db().await);
        repo.create(input("Week 1", 1)).await.unwrap();
        repo.create(input("Week 3", 15)).await.unwrap();
        repo.create(input("Week 2", 8)).await.unwrap();

        let page = repo
            .list(SessionFilter::default(), PageRequest::default())
            .await
            .unwrap();
        let titles: Vec<_> = page.rows.iter().map(|r| r.session.title.as_str()).collect();
        assert_eq!(titles, ["Week 3", "Week 2", "Week 1"]);

        let filter = SessionFilter {
            title: Some("WEEK 2".into()),
            sort: SessionSort::TitleAsc,
        };
        let page = repo.list(filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_sessions() {
        let repo = SeaOrmSessionRepository::new(test_db().await);
        let id = repo.create(input("Draft", 2)).await.unwrap().session.id;

        repo.update(id, input("Final", 3)).await.unwrap();
        let found = repo.find_with_counts(id).await.unwrap().unwrap();
        assert_eq!(found.session.title, "Final");

        repo.delete(id).await.unwrap();
        assert!(matches!(repo.delete(id).await, Err(DomainError::NotFound { .. })));
        assert!(matches!(
            repo.update(id, input("Again", 4)).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
