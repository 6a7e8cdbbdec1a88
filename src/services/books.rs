//! Books service

use serde::Serialize;
use uuid::Uuid;

use super::{integrity::IntegrityGuard, CreateOutcome, DeleteOutcome, UpdateOutcome};
use crate::{
    error::AppResult,
    models::{
        Author, AuthorSort, Book, BookExpand, BookInstance, BookInstanceFilter, BookSort, Genre,
        GenreSort,
    },
    repository::{FindQuery, Repository},
    validation::{book_form, FormInput},
};

/// A book, its author and genres expanded, with every copy of it
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    pub book: Book,
    pub instances: Vec<BookInstance>,
}

/// Choices offered by the book form
#[derive(Debug, Clone, Serialize)]
pub struct BookFormOptions {
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    guard: IntegrityGuard,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self {
            guard: IntegrityGuard::new(repository.clone()),
            repository,
        }
    }

    /// List books by title with their author expanded
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let query = FindQuery::all()
            .sort_by(BookSort::Title)
            .expand(BookExpand::Author);
        self.repository.books.find(&query).await
    }

    /// Get book by ID with author and genres expanded
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Book>> {
        tracing::debug!(%id, "Fetching book");
        self.repository
            .books
            .find_by_id(id, &[BookExpand::Author, BookExpand::Genre])
            .await
    }

    /// Get a book and its copies
    pub async fn get_with_instances(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        let instances_query = FindQuery::filtered(BookInstanceFilter {
            book: Some(id),
            ..Default::default()
        });
        let (book, instances) = tokio::try_join!(
            self.get(id),
            self.repository.book_instances.find(&instances_query),
        )?;

        Ok(book.map(|book| BookDetail { book, instances }))
    }

    /// Authors and genres for the book form
    pub async fn form_options(&self) -> AppResult<BookFormOptions> {
        let authors_query = FindQuery::all().sort_by(AuthorSort::FamilyName);
        let genres_query = FindQuery::all().sort_by(GenreSort::Name);
        let (authors, genres) = tokio::try_join!(
            self.repository.authors.find(&authors_query),
            self.repository.genres.find(&genres_query),
        )?;

        Ok(BookFormOptions { authors, genres })
    }

    /// Validate the form and store a new book.
    ///
    /// The author and genre references are only checked to be identifiers;
    /// whether they point at stored records is not verified.
    pub async fn create(&self, form: &FormInput) -> AppResult<CreateOutcome<Book>> {
        let book = match book_form(form, None).into_result() {
            Ok(book) => book,
            Err(rejected) => return Ok(CreateOutcome::Rejected(rejected)),
        };

        let book = self.repository.books.create(&book).await?;
        tracing::info!(id = %book.id, title = %book.title, "Book created");
        Ok(CreateOutcome::Created(book))
    }

    pub async fn update(&self, id: Uuid, form: &FormInput) -> AppResult<UpdateOutcome<Book>> {
        let book = match book_form(form, Some(id)).into_result() {
            Ok(book) => book,
            Err(rejected) => return Ok(UpdateOutcome::Rejected(rejected)),
        };

        match self.repository.books.update(id, &book).await? {
            Some(book) => {
                tracing::info!(%id, "Book updated");
                Ok(UpdateOutcome::Updated(book))
            }
            None => Ok(UpdateOutcome::NotFound),
        }
    }

    /// Delete a book that has no copies
    pub async fn delete(&self, id: Uuid) -> AppResult<DeleteOutcome<Book, BookInstance>> {
        self.guard.delete::<Book>(id).await
    }
}
