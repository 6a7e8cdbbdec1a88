//! In-memory catalog store
//!
//! Keeps each table in insertion order, so unsorted listings come back in
//! the order records were created. Used for tests and for running the server
//! without a database.

use std::{
    cmp::Ordering,
    sync::atomic::{AtomicBool, Ordering as AtomicOrdering},
};

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Collection, FindQuery};
use crate::{
    error::{AppError, AppResult},
    models::{
        Author, AuthorSort, Book, BookExpand, BookInstance, BookInstanceExpand, BookInstanceSort,
        BookSort, Entity, Genre, GenreSort,
    },
};

#[derive(Default)]
pub struct Tables {
    authors: IndexMap<Uuid, Author>,
    genres: IndexMap<Uuid, Genre>,
    books: IndexMap<Uuid, Book>,
    book_instances: IndexMap<Uuid, BookInstance>,
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
    closed: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn close(&self) {
        self.closed.store(true, AtomicOrdering::SeqCst);
    }

    fn ensure_open(&self) -> AppResult<()> {
        if self.closed.load(AtomicOrdering::SeqCst) {
            return Err(AppError::Unavailable("catalog store is closed".to_string()));
        }
        Ok(())
    }
}

/// How an entity lives in [`Tables`]
pub trait MemoryTable: Entity {
    fn table(tables: &Tables) -> &IndexMap<Uuid, Self>;

    fn table_mut(tables: &mut Tables) -> &mut IndexMap<Uuid, Self>;

    fn matches(&self, filter: &Self::Filter) -> bool;

    fn compare(&self, other: &Self, sort: Self::Sort) -> Ordering;

    fn expand(&mut self, _tables: &Tables, _fields: &[Self::Expand]) {}
}

#[async_trait]
impl<E: MemoryTable> Collection<E> for MemoryStore {
    async fn find(&self, query: &FindQuery<E>) -> AppResult<Vec<E>> {
        self.ensure_open()?;
        let tables = self.tables.read().await;

        let mut records: Vec<E> = E::table(&tables)
            .values()
            .filter(|record| record.matches(&query.filter))
            .cloned()
            .collect();
        if let Some(sort) = query.sort {
            records.sort_by(|a, b| a.compare(b, sort));
        }
        for record in &mut records {
            record.expand(&tables, &query.expand);
        }
        Ok(records)
    }

    async fn find_by_id(&self, id: Uuid, expand: &[E::Expand]) -> AppResult<Option<E>> {
        self.ensure_open()?;
        let tables = self.tables.read().await;

        Ok(E::table(&tables).get(&id).cloned().map(|mut record| {
            record.expand(&tables, expand);
            record
        }))
    }

    async fn count(&self, filter: &E::Filter) -> AppResult<i64> {
        self.ensure_open()?;
        let tables = self.tables.read().await;

        let count = E::table(&tables)
            .values()
            .filter(|record| record.matches(filter))
            .count();
        Ok(count as i64)
    }

    async fn create(&self, record: &E) -> AppResult<E> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;

        let stored = record.detached();
        E::table_mut(&mut tables).insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: Uuid, record: &E) -> AppResult<Option<E>> {
        self.ensure_open()?;
        if record.id() != id {
            return Err(AppError::Internal(format!(
                "{} update for {} carries identifier {}",
                E::KIND,
                id,
                record.id()
            )));
        }
        let mut tables = self.tables.write().await;

        Ok(E::table_mut(&mut tables).get_mut(&id).map(|slot| {
            *slot = record.detached();
            slot.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<E>> {
        self.ensure_open()?;
        let mut tables = self.tables.write().await;

        Ok(E::table_mut(&mut tables).shift_remove(&id))
    }
}

impl MemoryTable for Author {
    fn table(tables: &Tables) -> &IndexMap<Uuid, Self> {
        &tables.authors
    }

    fn table_mut(tables: &mut Tables) -> &mut IndexMap<Uuid, Self> {
        &mut tables.authors
    }

    fn matches(&self, _filter: &()) -> bool {
        true
    }

    fn compare(&self, other: &Self, sort: AuthorSort) -> Ordering {
        match sort {
            AuthorSort::FamilyName => self.family_name.cmp(&other.family_name),
        }
    }
}

impl MemoryTable for Genre {
    fn table(tables: &Tables) -> &IndexMap<Uuid, Self> {
        &tables.genres
    }

    fn table_mut(tables: &mut Tables) -> &mut IndexMap<Uuid, Self> {
        &mut tables.genres
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.name.as_ref().map_or(true, |name| &self.name == name)
    }

    fn compare(&self, other: &Self, sort: GenreSort) -> Ordering {
        match sort {
            GenreSort::Name => self.name.cmp(&other.name),
        }
    }
}

impl MemoryTable for Book {
    fn table(tables: &Tables) -> &IndexMap<Uuid, Self> {
        &tables.books
    }

    fn table_mut(tables: &mut Tables) -> &mut IndexMap<Uuid, Self> {
        &mut tables.books
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.author.map_or(true, |author| self.author.id() == author)
            && filter.genre.map_or(true, |genre| self.has_genre(genre))
    }

    fn compare(&self, other: &Self, sort: BookSort) -> Ordering {
        match sort {
            BookSort::Title => self.title.cmp(&other.title),
        }
    }

    fn expand(&mut self, tables: &Tables, fields: &[BookExpand]) {
        if fields.contains(&BookExpand::Author) {
            let author = tables.authors.get(&self.author.id());
            self.author.resolve(author);
        }
        if fields.contains(&BookExpand::Genre) {
            for genre in &mut self.genre {
                let resolved = tables.genres.get(&genre.id());
                genre.resolve(resolved);
            }
        }
    }
}

impl MemoryTable for BookInstance {
    fn table(tables: &Tables) -> &IndexMap<Uuid, Self> {
        &tables.book_instances
    }

    fn table_mut(tables: &mut Tables) -> &mut IndexMap<Uuid, Self> {
        &mut tables.book_instances
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.book.map_or(true, |book| self.book.id() == book)
            && filter.status.map_or(true, |status| self.status == status)
    }

    fn compare(&self, other: &Self, sort: BookInstanceSort) -> Ordering {
        match sort {
            BookInstanceSort::Imprint => self.imprint.cmp(&other.imprint),
        }
    }

    fn expand(&mut self, tables: &Tables, fields: &[BookInstanceExpand]) {
        if fields.contains(&BookInstanceExpand::Book) {
            let book = tables.books.get(&self.book.id());
            self.book.resolve(book);
        }
    }
}
