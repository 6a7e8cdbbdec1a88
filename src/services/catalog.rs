//! Catalog-wide summary

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{BookFilter, BookInstanceFilter, BookStatus, GenreFilter},
    repository::Repository,
};

/// Record counts shown on the catalog home page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogSummary {
    pub book_count: i64,
    pub book_instance_count: i64,
    pub book_instance_available_count: i64,
    pub author_count: i64,
    pub genre_count: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Count every kind of record; the five counts run concurrently
    pub async fn summary(&self) -> AppResult<CatalogSummary> {
        let available = BookInstanceFilter {
            status: Some(BookStatus::Available),
            ..Default::default()
        };
        let all_instances = BookInstanceFilter::default();
        let all_books = BookFilter::default();
        let all_genres = GenreFilter::default();

        let (book_count, book_instance_count, book_instance_available_count, author_count, genre_count) =
            tokio::try_join!(
                self.repository.books.count(&all_books),
                self.repository.book_instances.count(&all_instances),
                self.repository.book_instances.count(&available),
                self.repository.authors.count(&()),
                self.repository.genres.count(&all_genres),
            )?;

        Ok(CatalogSummary {
            book_count,
            book_instance_count,
            book_instance_available_count,
            author_count,
            genre_count,
        })
    }
}
