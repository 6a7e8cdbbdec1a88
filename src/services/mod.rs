//! Business logic services

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod integrity;

use crate::{repository::Repository, validation::Rejected};

/// Result of submitting a create form
#[derive(Debug, Clone)]
pub enum CreateOutcome<T> {
    Created(T),
    /// An equivalent record already exists and was returned instead
    Existing(T),
    Rejected(Rejected<T>),
}

/// Result of submitting an update form
#[derive(Debug, Clone)]
pub enum UpdateOutcome<T> {
    Updated(T),
    Rejected(Rejected<T>),
    NotFound,
}

/// Result of a guarded delete
#[derive(Debug, Clone)]
pub enum DeleteOutcome<T, D> {
    Deleted(T),
    /// Other records still reference the target; nothing was removed
    Blocked { record: T, dependents: Vec<D> },
    NotFound,
}

impl<T, D> DeleteOutcome<T, D> {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted(_))
    }
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: authors::AuthorsService,
    pub genres: genres::GenresService,
    pub books: books::BooksService,
    pub book_instances: book_instances::BookInstancesService,
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            authors: authors::AuthorsService::new(repository.clone()),
            genres: genres::GenresService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            book_instances: book_instances::BookInstancesService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository),
        }
    }
}
