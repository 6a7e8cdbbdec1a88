//! Genres table

use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::{
    error::{AppError, AppResult},
    models::{Genre, GenreFilter, GenreSort, NoExpand},
    repository::{Collection, FindQuery},
};

fn where_clause(filter: &GenreFilter) -> &'static str {
    if filter.name.is_some() {
        "WHERE name = $1"
    } else {
        ""
    }
}

#[async_trait]
impl Collection<Genre> for PgStore {
    async fn find(&self, query: &FindQuery<Genre>) -> AppResult<Vec<Genre>> {
        let order = match query.sort {
            Some(GenreSort::Name) => r#"ORDER BY name COLLATE "C""#,
            None => "",
        };
        let sql = format!("SELECT id, name FROM genres {} {}", where_clause(&query.filter), order);

        let mut builder = sqlx::query_as::<_, Genre>(&sql);
        if let Some(ref name) = query.filter.name {
            builder = builder.bind(name);
        }
        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid, _expand: &[NoExpand]) -> AppResult<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(genre)
    }

    async fn count(&self, filter: &GenreFilter) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM genres {}", where_clause(filter));

        let mut builder = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(ref name) = filter.name {
            builder = builder.bind(name);
        }
        let count = builder.fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn create(&self, genre: &Genre) -> AppResult<Genre> {
        let row = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(genre.id)
        .bind(&genre.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, genre: &Genre) -> AppResult<Option<Genre>> {
        if genre.id != id {
            return Err(AppError::Internal(format!(
                "genre update for {} carries identifier {}",
                id, genre.id
            )));
        }
        let row = sqlx::query_as::<_, Genre>(
            "UPDATE genres SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&genre.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Genre>> {
        let row = sqlx::query_as::<_, Genre>("DELETE FROM genres WHERE id = $1 RETURNING id, name")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
