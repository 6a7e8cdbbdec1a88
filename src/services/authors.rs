//! Authors service

use serde::Serialize;
use uuid::Uuid;

use super::{integrity::IntegrityGuard, CreateOutcome, DeleteOutcome, UpdateOutcome};
use crate::{
    error::AppResult,
    models::{Author, AuthorSort, Book, BookFilter, BookSummary},
    repository::{FindQuery, Repository},
    validation::{author_form, FormInput},
};

/// An author with the books written by them
#[derive(Debug, Clone, Serialize)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<BookSummary>,
}

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
    guard: IntegrityGuard,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self {
            guard: IntegrityGuard::new(repository.clone()),
            repository,
        }
    }

    /// List authors by family name
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        self.repository
            .authors
            .find(&FindQuery::all().sort_by(AuthorSort::FamilyName))
            .await
    }

    /// Get author by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Author>> {
        tracing::debug!(%id, "Fetching author");
        self.repository.authors.find_by_id(id, &[]).await
    }

    /// Get an author and their books
    pub async fn get_with_books(&self, id: Uuid) -> AppResult<Option<AuthorDetail>> {
        let books_query = FindQuery::filtered(BookFilter {
            author: Some(id),
            ..Default::default()
        });
        let (author, books) = tokio::try_join!(
            self.repository.authors.find_by_id(id, &[]),
            self.repository.books.find(&books_query),
        )?;

        Ok(author.map(|author| AuthorDetail {
            author,
            books: books.into_iter().map(BookSummary::from).collect(),
        }))
    }

    /// Validate the form and store a new author
    pub async fn create(&self, form: &FormInput) -> AppResult<CreateOutcome<Author>> {
        let author = match author_form(form, None).into_result() {
            Ok(author) => author,
            Err(rejected) => return Ok(CreateOutcome::Rejected(rejected)),
        };

        let author = self.repository.authors.create(&author).await?;
        tracing::info!(id = %author.id, name = %author.name(), "Author created");
        Ok(CreateOutcome::Created(author))
    }

    /// Validate the form and replace author `id`
    pub async fn update(&self, id: Uuid, form: &FormInput) -> AppResult<UpdateOutcome<Author>> {
        let author = match author_form(form, Some(id)).into_result() {
            Ok(author) => author,
            Err(rejected) => return Ok(UpdateOutcome::Rejected(rejected)),
        };

        match self.repository.authors.update(id, &author).await? {
            Some(author) => {
                tracing::info!(%id, "Author updated");
                Ok(UpdateOutcome::Updated(author))
            }
            None => Ok(UpdateOutcome::NotFound),
        }
    }

    /// Delete an author that no book references
    pub async fn delete(&self, id: Uuid) -> AppResult<DeleteOutcome<Author, Book>> {
        self.guard.delete::<Author>(id).await
    }
}
