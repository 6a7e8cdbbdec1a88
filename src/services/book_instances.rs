//! Book instances (physical copies) service

use uuid::Uuid;

use super::{CreateOutcome, DeleteOutcome, UpdateOutcome};
use crate::{
    error::AppResult,
    models::{BookInstance, BookInstanceExpand, BookSort, BookTitle},
    repository::{FindQuery, Repository},
    validation::{book_instance_form, FormInput},
};

#[derive(Clone)]
pub struct BookInstancesService {
    repository: Repository,
}

impl BookInstancesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List every copy with its book expanded
    pub async fn list(&self) -> AppResult<Vec<BookInstance>> {
        let query = FindQuery::all().expand(BookInstanceExpand::Book);
        self.repository.book_instances.find(&query).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        tracing::debug!(%id, "Fetching book instance");
        self.repository
            .book_instances
            .find_by_id(id, &[BookInstanceExpand::Book])
            .await
    }

    /// Book titles for the copy form, sorted
    pub async fn form_options(&self) -> AppResult<Vec<BookTitle>> {
        let books = self
            .repository
            .books
            .find(&FindQuery::all().sort_by(BookSort::Title))
            .await?;
        Ok(books.into_iter().map(BookTitle::from).collect())
    }

    pub async fn create(&self, form: &FormInput) -> AppResult<CreateOutcome<BookInstance>> {
        let copy = match book_instance_form(form, None).into_result() {
            Ok(copy) => copy,
            Err(rejected) => return Ok(CreateOutcome::Rejected(rejected)),
        };

        let copy = self.repository.book_instances.create(&copy).await?;
        tracing::info!(id = %copy.id, book = %copy.book.id(), status = %copy.status, "Book instance created");
        Ok(CreateOutcome::Created(copy))
    }

    pub async fn update(
        &self,
        id: Uuid,
        form: &FormInput,
    ) -> AppResult<UpdateOutcome<BookInstance>> {
        let copy = match book_instance_form(form, Some(id)).into_result() {
            Ok(copy) => copy,
            Err(rejected) => return Ok(UpdateOutcome::Rejected(rejected)),
        };

        match self.repository.book_instances.update(id, &copy).await? {
            Some(copy) => {
                tracing::info!(%id, status = %copy.status, "Book instance updated");
                Ok(UpdateOutcome::Updated(copy))
            }
            None => Ok(UpdateOutcome::NotFound),
        }
    }

    /// Delete a copy. Nothing references copies, so this is never blocked.
    pub async fn delete(&self, id: Uuid) -> AppResult<DeleteOutcome<BookInstance, ()>> {
        match self.repository.book_instances.delete(id).await? {
            Some(copy) => {
                tracing::info!(%id, "Book instance deleted");
                Ok(DeleteOutcome::Deleted(copy))
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}
