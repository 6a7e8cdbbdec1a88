//! Book instances table

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::FromRow;
use uuid::Uuid;

use super::PgStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        BookInstance, BookInstanceExpand, BookInstanceFilter, BookInstanceSort, BookStatus, Ref,
    },
    repository::{Collection, FindQuery},
};

const COLUMNS: &str = "id, book_id, imprint, status, due_back";

#[derive(FromRow)]
struct BookInstanceRow {
    id: Uuid,
    book_id: Uuid,
    imprint: String,
    status: String,
    due_back: Option<NaiveDate>,
}

impl TryFrom<BookInstanceRow> for BookInstance {
    type Error = AppError;

    fn try_from(row: BookInstanceRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BookStatus>()
            .map_err(|e| AppError::Internal(format!("book instance {}: {}", row.id, e)))?;
        Ok(BookInstance {
            id: row.id,
            book: Ref::Id(row.book_id),
            imprint: row.imprint,
            status,
            due_back: row.due_back,
        })
    }
}

/// WHERE clause for `filter`; parameters are bound book first, then status
fn where_clause(filter: &BookInstanceFilter) -> String {
    let mut conditions = Vec::new();
    let mut idx = 1;

    if filter.book.is_some() {
        conditions.push(format!("book_id = ${}", idx));
        idx += 1;
    }
    if filter.status.is_some() {
        conditions.push(format!("status = ${}", idx));
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

impl PgStore {
    async fn load_instances(
        &self,
        rows: Vec<BookInstanceRow>,
        expand: &[BookInstanceExpand],
    ) -> AppResult<Vec<BookInstance>> {
        let mut copies = rows
            .into_iter()
            .map(BookInstance::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        if expand.contains(&BookInstanceExpand::Book) && !copies.is_empty() {
            let book_ids: Vec<Uuid> = copies.iter().map(|c| c.book.id()).collect();
            let rows = self.book_rows(&book_ids).await?;
            let books: HashMap<_, _> = self
                .load_books(rows, &[])
                .await?
                .into_iter()
                .map(|b| (b.id, b))
                .collect();

            for copy in &mut copies {
                let book = books.get(&copy.book.id());
                copy.book.resolve(book);
            }
        }
        Ok(copies)
    }
}

#[async_trait]
impl Collection<BookInstance> for PgStore {
    async fn find(&self, query: &FindQuery<BookInstance>) -> AppResult<Vec<BookInstance>> {
        let order = match query.sort {
            Some(BookInstanceSort::Imprint) => r#"ORDER BY imprint COLLATE "C""#,
            None => "",
        };
        let sql = format!(
            "SELECT {} FROM book_instances {} {}",
            COLUMNS,
            where_clause(&query.filter),
            order
        );

        let mut builder = sqlx::query_as::<_, BookInstanceRow>(&sql);
        if let Some(book) = query.filter.book {
            builder = builder.bind(book);
        }
        if let Some(status) = query.filter.status {
            builder = builder.bind(status.as_str());
        }
        let rows = builder.fetch_all(&self.pool).await?;
        self.load_instances(rows, &query.expand).await
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        expand: &[BookInstanceExpand],
    ) -> AppResult<Option<BookInstance>> {
        let sql = format!("SELECT {} FROM book_instances WHERE id = $1", COLUMNS);
        let rows = sqlx::query_as::<_, BookInstanceRow>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(self.load_instances(rows, expand).await?.into_iter().next())
    }

    async fn count(&self, filter: &BookInstanceFilter) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM book_instances {}", where_clause(filter));

        let mut builder = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(book) = filter.book {
            builder = builder.bind(book);
        }
        if let Some(status) = filter.status {
            builder = builder.bind(status.as_str());
        }
        let count = builder.fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn create(&self, copy: &BookInstance) -> AppResult<BookInstance> {
        let sql = format!(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, status, due_back)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            COLUMNS
        );
        let row = sqlx::query_as::<_, BookInstanceRow>(&sql)
            .bind(copy.id)
            .bind(copy.book.id())
            .bind(&copy.imprint)
            .bind(copy.status.as_str())
            .bind(copy.due_back)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn update(&self, id: Uuid, copy: &BookInstance) -> AppResult<Option<BookInstance>> {
        if copy.id != id {
            return Err(AppError::Internal(format!(
                "book instance update for {} carries identifier {}",
                id, copy.id
            )));
        }
        let sql = format!(
            r#"
            UPDATE book_instances SET
                book_id = $1,
                imprint = $2,
                status = $3,
                due_back = $4
            WHERE id = $5
            RETURNING {}
            "#,
            COLUMNS
        );
        let row = sqlx::query_as::<_, BookInstanceRow>(&sql)
            .bind(copy.book.id())
            .bind(&copy.imprint)
            .bind(copy.status.as_str())
            .bind(copy.due_back)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(BookInstance::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        let sql = format!("DELETE FROM book_instances WHERE id = $1 RETURNING {}", COLUMNS);
        let row = sqlx::query_as::<_, BookInstanceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(BookInstance::try_from).transpose()
    }
}
