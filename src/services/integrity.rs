//! Delete-time referential integrity
//!
//! Storage keeps references as plain identifiers, so nothing below this
//! layer stops an author, genre or book from being removed while other
//! records still point at it. Deletes of referenced kinds go through
//! [`IntegrityGuard::delete`], which refuses while dependents exist.
//!
//! The dependent lookup and the delete are separate storage calls: a
//! dependent created in between is not seen.

use uuid::Uuid;

use super::DeleteOutcome;
use crate::{
    error::AppResult,
    models::{Author, Book, BookFilter, BookInstance, BookInstanceFilter, Entity, Genre},
    repository::{FindQuery, Repository, Stored},
};

/// An entity kind that other records can reference
pub trait Guarded: Stored {
    type Dependent: Stored;

    /// Filter selecting the records that reference `id`
    fn dependents_of(id: Uuid) -> <Self::Dependent as Entity>::Filter;
}

impl Guarded for Author {
    type Dependent = Book;

    fn dependents_of(id: Uuid) -> BookFilter {
        BookFilter {
            author: Some(id),
            ..Default::default()
        }
    }
}

impl Guarded for Genre {
    type Dependent = Book;

    fn dependents_of(id: Uuid) -> BookFilter {
        BookFilter {
            genre: Some(id),
            ..Default::default()
        }
    }
}

impl Guarded for Book {
    type Dependent = BookInstance;

    fn dependents_of(id: Uuid) -> BookInstanceFilter {
        BookInstanceFilter {
            book: Some(id),
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub struct IntegrityGuard {
    repository: Repository,
}

impl IntegrityGuard {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Records that currently reference `id`
    pub async fn dependents<E: Guarded>(&self, id: Uuid) -> AppResult<Vec<E::Dependent>> {
        let query = FindQuery::filtered(E::dependents_of(id));
        self.repository.collection::<E::Dependent>().find(&query).await
    }

    /// Delete record `id` of kind `E` unless dependents still reference it
    pub async fn delete<E: Guarded>(&self, id: Uuid) -> AppResult<DeleteOutcome<E, E::Dependent>> {
        let (target, dependents) = tokio::try_join!(
            self.repository.collection::<E>().find_by_id(id, &[]),
            self.dependents::<E>(id),
        )?;

        let Some(record) = target else {
            tracing::debug!(kind = %E::KIND, %id, "Delete target not found");
            return Ok(DeleteOutcome::NotFound);
        };

        if !dependents.is_empty() {
            tracing::warn!(
                kind = %E::KIND,
                %id,
                dependents = dependents.len(),
                "Delete blocked by dependent records"
            );
            return Ok(DeleteOutcome::Blocked { record, dependents });
        }

        match self.repository.collection::<E>().delete(id).await? {
            Some(removed) => {
                tracing::info!(kind = %E::KIND, %id, "Record deleted");
                Ok(DeleteOutcome::Deleted(removed))
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}
