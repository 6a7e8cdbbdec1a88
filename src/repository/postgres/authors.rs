//! Authors table

use async_trait::async_trait;
use uuid::Uuid;

use super::PgStore;
use crate::{
    error::{AppError, AppResult},
    models::{Author, AuthorSort, NoExpand},
    repository::{Collection, FindQuery},
};

const COLUMNS: &str = "id, first_name, family_name, date_of_birth, date_of_death";

#[async_trait]
impl Collection<Author> for PgStore {
    async fn find(&self, query: &FindQuery<Author>) -> AppResult<Vec<Author>> {
        let order = match query.sort {
            Some(AuthorSort::FamilyName) => r#" ORDER BY family_name COLLATE "C""#,
            None => "",
        };
        let sql = format!("SELECT {} FROM authors{}", COLUMNS, order);

        let rows = sqlx::query_as::<_, Author>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid, _expand: &[NoExpand]) -> AppResult<Option<Author>> {
        let sql = format!("SELECT {} FROM authors WHERE id = $1", COLUMNS);
        let author = sqlx::query_as::<_, Author>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(author)
    }

    async fn count(&self, _filter: &()) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, author: &Author) -> AppResult<Author> {
        let sql = format!(
            r#"
            INSERT INTO authors (id, first_name, family_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            COLUMNS
        );
        let row = sqlx::query_as::<_, Author>(&sql)
            .bind(author.id)
            .bind(&author.first_name)
            .bind(&author.family_name)
            .bind(author.date_of_birth)
            .bind(author.date_of_death)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, author: &Author) -> AppResult<Option<Author>> {
        if author.id != id {
            return Err(AppError::Internal(format!(
                "author update for {} carries identifier {}",
                id, author.id
            )));
        }
        let sql = format!(
            r#"
            UPDATE authors SET
                first_name = $1,
                family_name = $2,
                date_of_birth = $3,
                date_of_death = $4
            WHERE id = $5
            RETURNING {}
            "#,
            COLUMNS
        );
        let row = sqlx::query_as::<_, Author>(&sql)
            .bind(&author.first_name)
            .bind(&author.family_name)
            .bind(author.date_of_birth)
            .bind(author.date_of_death)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Author>> {
        let sql = format!("DELETE FROM authors WHERE id = $1 RETURNING {}", COLUMNS);
        let row = sqlx::query_as::<_, Author>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
