//! Genres service

use serde::Serialize;
use uuid::Uuid;

use super::{integrity::IntegrityGuard, CreateOutcome, DeleteOutcome, UpdateOutcome};
use crate::{
    error::AppResult,
    models::{Book, BookFilter, BookSummary, Genre, GenreFilter, GenreSort},
    repository::{FindQuery, Repository},
    validation::{genre_form, FormInput},
};

/// A genre with the books filed under it
#[derive(Debug, Clone, Serialize)]
pub struct GenreDetail {
    pub genre: Genre,
    pub books: Vec<BookSummary>,
}

#[derive(Clone)]
pub struct GenresService {
    repository: Repository,
    guard: IntegrityGuard,
}

impl GenresService {
    pub fn new(repository: Repository) -> Self {
        Self {
            guard: IntegrityGuard::new(repository.clone()),
            repository,
        }
    }

    /// List genres by name
    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        self.repository
            .genres
            .find(&FindQuery::all().sort_by(GenreSort::Name))
            .await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Option<Genre>> {
        tracing::debug!(%id, "Fetching genre");
        self.repository.genres.find_by_id(id, &[]).await
    }

    /// Get a genre and the books whose genre set contains it
    pub async fn get_with_books(&self, id: Uuid) -> AppResult<Option<GenreDetail>> {
        let books_query = FindQuery::filtered(BookFilter {
            genre: Some(id),
            ..Default::default()
        });
        let (genre, books) = tokio::try_join!(
            self.repository.genres.find_by_id(id, &[]),
            self.repository.books.find(&books_query),
        )?;

        Ok(genre.map(|genre| GenreDetail {
            genre,
            books: books.into_iter().map(BookSummary::from).collect(),
        }))
    }

    /// Validate the form and store a new genre.
    ///
    /// A genre whose sanitized name matches an existing one exactly is not
    /// stored again; the existing record comes back as `Existing`.
    pub async fn create(&self, form: &FormInput) -> AppResult<CreateOutcome<Genre>> {
        let genre = match genre_form(form, None).into_result() {
            Ok(genre) => genre,
            Err(rejected) => return Ok(CreateOutcome::Rejected(rejected)),
        };

        let same_name = FindQuery::filtered(GenreFilter {
            name: Some(genre.name.clone()),
        });
        if let Some(existing) = self.repository.genres.find(&same_name).await?.into_iter().next() {
            tracing::debug!(id = %existing.id, name = %existing.name, "Genre already exists");
            return Ok(CreateOutcome::Existing(existing));
        }

        let genre = self.repository.genres.create(&genre).await?;
        tracing::info!(id = %genre.id, name = %genre.name, "Genre created");
        Ok(CreateOutcome::Created(genre))
    }

    pub async fn update(&self, id: Uuid, form: &FormInput) -> AppResult<UpdateOutcome<Genre>> {
        let genre = match genre_form(form, Some(id)).into_result() {
            Ok(genre) => genre,
            Err(rejected) => return Ok(UpdateOutcome::Rejected(rejected)),
        };

        match self.repository.genres.update(id, &genre).await? {
            Some(genre) => {
                tracing::info!(%id, "Genre updated");
                Ok(UpdateOutcome::Updated(genre))
            }
            None => Ok(UpdateOutcome::NotFound),
        }
    }

    /// Delete a genre that no book lists
    pub async fn delete(&self, id: Uuid) -> AppResult<DeleteOutcome<Genre, Book>> {
        self.guard.delete::<Genre>(id).await
    }
}
