//! Repository layer for catalog persistence
//!
//! Every entity kind is reached through a [`Collection`], with one
//! implementation per backend (PostgreSQL or in-memory). References between
//! entities are plain identifiers in storage: nothing at this level stops a
//! referenced record from being deleted, that check belongs to the services.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use uuid::Uuid;

use crate::{
    config::{DatabaseConfig, StorageBackend},
    error::AppResult,
    models::{Author, Book, BookInstance, Entity, Genre},
};

use self::{memory::MemoryStore, postgres::PgStore};

/// Options of a find-all: filter, single ascending sort key, and the
/// reference fields to expand into full records.
///
/// Text sort keys compare by code point in every backend (PostgreSQL sorts
/// with the "C" collation), so "Zebra" comes before "apple". Queries always
/// load whole records; narrower projections such as [`BookSummary`] and
/// [`BookTitle`] are built from them by the services.
///
/// [`BookSummary`]: crate::models::BookSummary
/// [`BookTitle`]: crate::models::BookTitle
pub struct FindQuery<E: Entity> {
    pub filter: E::Filter,
    pub sort: Option<E::Sort>,
    pub expand: Vec<E::Expand>,
}

impl<E: Entity> FindQuery<E> {
    pub fn all() -> Self {
        Self::filtered(E::Filter::default())
    }

    pub fn filtered(filter: E::Filter) -> Self {
        Self {
            filter,
            sort: None,
            expand: Vec::new(),
        }
    }

    pub fn sort_by(mut self, sort: E::Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn expand(mut self, field: E::Expand) -> Self {
        if !self.expand.contains(&field) {
            self.expand.push(field);
        }
        self
    }
}

impl<E: Entity> Default for FindQuery<E> {
    fn default() -> Self {
        Self::all()
    }
}

/// Data access for one entity kind
#[async_trait]
pub trait Collection<E: Entity>: Send + Sync {
    async fn find(&self, query: &FindQuery<E>) -> AppResult<Vec<E>>;

    async fn find_by_id(&self, id: Uuid, expand: &[E::Expand]) -> AppResult<Option<E>>;

    async fn count(&self, filter: &E::Filter) -> AppResult<i64>;

    /// Store a new record; returns it with references collapsed
    async fn create(&self, record: &E) -> AppResult<E>;

    /// Replace every mutable field of record `id`; `None` when it does not exist
    async fn update(&self, id: Uuid, record: &E) -> AppResult<Option<E>>;

    /// Remove record `id`, returning it; `None` when it did not exist
    async fn delete(&self, id: Uuid) -> AppResult<Option<E>>;
}

#[derive(Clone)]
enum Backend {
    Postgres(Pool<Postgres>),
    Memory(Arc<MemoryStore>),
}

/// Persistence handle shared by the services.
///
/// Built once at startup with [`Repository::connect`] (or
/// [`Repository::in_memory`]) before any request is served, and released
/// with [`Repository::close`] on shutdown. Calls made after `close` fail with
/// a storage error.
#[derive(Clone)]
pub struct Repository {
    pub authors: Arc<dyn Collection<Author>>,
    pub genres: Arc<dyn Collection<Genre>>,
    pub books: Arc<dyn Collection<Book>>,
    pub book_instances: Arc<dyn Collection<BookInstance>>,
    backend: Backend,
}

impl Repository {
    /// Open the configured backend. PostgreSQL migrations run here.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory catalog store; records are lost on shutdown");
                Ok(Self::in_memory())
            }
            StorageBackend::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .min_connections(config.min_connections)
                    .connect(&config.url)
                    .await?;
                tracing::info!("Connected to database");

                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Database migrations completed");

                Ok(Self::postgres(pool))
            }
        }
    }

    /// Repository over an existing PostgreSQL pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        Self {
            authors: store.clone(),
            genres: store.clone(),
            books: store.clone(),
            book_instances: store,
            backend: Backend::Postgres(pool),
        }
    }

    /// Repository over a fresh, empty in-memory store
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            authors: store.clone(),
            genres: store.clone(),
            books: store.clone(),
            book_instances: store.clone(),
            backend: Backend::Memory(store),
        }
    }

    /// Release the backend. Later calls fail with a storage error.
    pub async fn close(&self) {
        match &self.backend {
            Backend::Postgres(pool) => pool.close().await,
            Backend::Memory(store) => store.close(),
        }
        tracing::info!("Catalog store closed");
    }

    /// Collection holding records of kind `E`
    pub fn collection<E: Stored>(&self) -> &dyn Collection<E> {
        E::collection(self)
    }
}

/// Entities reachable through the [`Repository`]
pub trait Stored: Entity {
    fn collection(repository: &Repository) -> &dyn Collection<Self>;
}

impl Stored for Author {
    fn collection(repository: &Repository) -> &dyn Collection<Self> {
        repository.authors.as_ref()
    }
}

impl Stored for Genre {
    fn collection(repository: &Repository) -> &dyn Collection<Self> {
        repository.genres.as_ref()
    }
}

impl Stored for Book {
    fn collection(repository: &Repository) -> &dyn Collection<Self> {
        repository.books.as_ref()
    }
}

impl Stored for BookInstance {
    fn collection(repository: &Repository) -> &dyn Collection<Self> {
        repository.book_instances.as_ref()
    }
}
