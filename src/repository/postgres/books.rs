//! Books table and the book_genres link table

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, Postgres, Transaction};
use uuid::Uuid;

use super::PgStore;
use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, BookExpand, BookFilter, BookSort, Entity, Genre, Ref},
    repository::{Collection, FindQuery},
};

const COLUMNS: &str = "id, title, author_id, summary, isbn";

#[derive(Debug, FromRow)]
pub(super) struct BookRow {
    id: Uuid,
    title: String,
    author_id: Uuid,
    summary: String,
    isbn: String,
}

#[derive(FromRow)]
struct GenreLink {
    book_id: Uuid,
    genre_id: Uuid,
}

/// WHERE clause for `filter`; parameters are bound author first, then genre
fn where_clause(filter: &BookFilter) -> String {
    let mut conditions = Vec::new();
    let mut idx = 1;

    if filter.author.is_some() {
        conditions.push(format!("author_id = ${}", idx));
        idx += 1;
    }
    if filter.genre.is_some() {
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM book_genres bg WHERE bg.book_id = books.id AND bg.genre_id = ${})",
            idx
        ));
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

impl PgStore {
    /// Fetch raw rows for the given identifiers, in no particular order
    pub(super) async fn book_rows(&self, ids: &[Uuid]) -> AppResult<Vec<BookRow>> {
        let sql = format!("SELECT {} FROM books WHERE id = ANY($1)", COLUMNS);
        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Turn rows into books: attach genre links in stored order, then expand
    /// the requested references. Dangling references stay bare.
    pub(super) async fn load_books(
        &self,
        rows: Vec<BookRow>,
        expand: &[BookExpand],
    ) -> AppResult<Vec<Book>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let links = sqlx::query_as::<_, GenreLink>(
            "SELECT book_id, genre_id FROM book_genres WHERE book_id = ANY($1) ORDER BY book_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut genres_by_book: HashMap<Uuid, Vec<Ref<Genre>>> = HashMap::new();
        for link in links {
            genres_by_book
                .entry(link.book_id)
                .or_default()
                .push(Ref::Id(link.genre_id));
        }

        let mut books: Vec<Book> = rows
            .into_iter()
            .map(|row| Book {
                genre: genres_by_book.remove(&row.id).unwrap_or_default(),
                id: row.id,
                title: row.title,
                author: Ref::Id(row.author_id),
                summary: row.summary,
                isbn: row.isbn,
            })
            .collect();

        if expand.contains(&BookExpand::Author) {
            let author_ids: Vec<Uuid> = books.iter().map(|b| b.author.id()).collect();
            let authors: HashMap<Uuid, Author> = sqlx::query_as::<_, Author>(
                "SELECT id, first_name, family_name, date_of_birth, date_of_death FROM authors WHERE id = ANY($1)",
            )
            .bind(&author_ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

            for book in &mut books {
                let author = authors.get(&book.author.id());
                book.author.resolve(author);
            }
        }

        if expand.contains(&BookExpand::Genre) {
            let genre_ids: Vec<Uuid> = books.iter().flat_map(Book::genre_ids).collect();
            let genres: HashMap<Uuid, Genre> =
                sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ANY($1)")
                    .bind(&genre_ids)
                    .fetch_all(&self.pool)
                    .await?
                    .into_iter()
                    .map(|g| (g.id, g))
                    .collect();

            for book in &mut books {
                for genre in &mut book.genre {
                    let resolved = genres.get(&genre.id());
                    genre.resolve(resolved);
                }
            }
        }

        Ok(books)
    }

    async fn write_genre_links(
        tx: &mut Transaction<'_, Postgres>,
        book: &Book,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book.id)
            .execute(&mut **tx)
            .await?;

        for (position, genre_id) in book.genre_ids().into_iter().enumerate() {
            sqlx::query(
                "INSERT INTO book_genres (book_id, genre_id, position) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            )
            .bind(book.id)
            .bind(genre_id)
            .bind(position as i32)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Collection<Book> for PgStore {
    async fn find(&self, query: &FindQuery<Book>) -> AppResult<Vec<Book>> {
        let order = match query.sort {
            Some(BookSort::Title) => r#"ORDER BY title COLLATE "C""#,
            None => "",
        };
        let sql = format!(
            "SELECT {} FROM books {} {}",
            COLUMNS,
            where_clause(&query.filter),
            order
        );

        let mut builder = sqlx::query_as::<_, BookRow>(&sql);
        if let Some(author) = query.filter.author {
            builder = builder.bind(author);
        }
        if let Some(genre) = query.filter.genre {
            builder = builder.bind(genre);
        }
        let rows = builder.fetch_all(&self.pool).await?;
        self.load_books(rows, &query.expand).await
    }

    async fn find_by_id(&self, id: Uuid, expand: &[BookExpand]) -> AppResult<Option<Book>> {
        let rows = self.book_rows(&[id]).await?;
        Ok(self.load_books(rows, expand).await?.into_iter().next())
    }

    async fn count(&self, filter: &BookFilter) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM books {}", where_clause(filter));

        let mut builder = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(author) = filter.author {
            builder = builder.bind(author);
        }
        if let Some(genre) = filter.genre {
            builder = builder.bind(genre);
        }
        let count = builder.fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn create(&self, book: &Book) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO books (id, title, author_id, summary, isbn)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(book.author.id())
        .bind(&book.summary)
        .bind(&book.isbn)
        .execute(&mut *tx)
        .await?;

        Self::write_genre_links(&mut tx, book).await?;
        tx.commit().await?;

        Ok(book.detached())
    }

    async fn update(&self, id: Uuid, book: &Book) -> AppResult<Option<Book>> {
        if book.id != id {
            return Err(AppError::Internal(format!(
                "book update for {} carries identifier {}",
                id, book.id
            )));
        }
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = $1,
                author_id = $2,
                summary = $3,
                isbn = $4
            WHERE id = $5
            "#,
        )
        .bind(&book.title)
        .bind(book.author.id())
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        Self::write_genre_links(&mut tx, book).await?;
        tx.commit().await?;

        Ok(Some(book.detached()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Book>> {
        let Some(book) = Collection::<Book>::find_by_id(self, id, &[]).await? else {
            return Ok(None);
        };

        // book_genres rows go with the book (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok((result.rows_affected() > 0).then_some(book))
    }
}
