//! Catalog entities and the pieces they share

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export commonly used types
pub use author::{Author, AuthorSort};
pub use book::{Book, BookExpand, BookFilter, BookSort, BookSummary, BookTitle};
pub use book_instance::{BookInstance, BookInstanceExpand, BookInstanceFilter, BookInstanceSort, BookStatus};
pub use genre::{Genre, GenreFilter, GenreSort};

/// Kinds of catalog records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Author,
    Genre,
    Book,
    BookInstance,
}

impl EntityKind {
    /// Path segment used in canonical URLs
    pub fn slug(&self) -> &'static str {
        match self {
            EntityKind::Author => "author",
            EntityKind::Genre => "genre",
            EntityKind::Book => "book",
            EntityKind::BookInstance => "bookinstance",
        }
    }

    /// Canonical URL of the record `id` of this kind
    pub fn url(&self, id: Uuid) -> String {
        format!("/catalog/{}/{}", self.slug(), id)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// A persisted catalog record.
///
/// The associated types describe what the repository can do with the record:
/// how it can be filtered, which single key it can be sorted on, and which
/// reference fields can be expanded into full records.
pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    type Filter: Default + Clone + Send + Sync + 'static;
    type Sort: Copy + Send + Sync + 'static;
    type Expand: Copy + PartialEq + Send + Sync + 'static;

    fn id(&self) -> Uuid;

    /// Stable path built from the kind and identifier; never persisted.
    fn url(&self) -> String {
        Self::KIND.url(self.id())
    }

    /// Copy of the record with every reference collapsed to its identifier.
    fn detached(&self) -> Self {
        self.clone()
    }
}

/// Expansion marker for entities without reference fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoExpand {}

/// Reference from one entity to another.
///
/// Stored records always hold `Id`; reads that ask for expansion get
/// `Resolved` when the target exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(Uuid),
    Resolved(Box<T>),
}

impl<T: Entity> Ref<T> {
    pub fn id(&self) -> Uuid {
        match self {
            Ref::Id(id) => *id,
            Ref::Resolved(record) => record.id(),
        }
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Ref::Id(_) => None,
            Ref::Resolved(record) => Some(record),
        }
    }

    pub fn detached(&self) -> Self {
        Ref::Id(self.id())
    }

    /// Replace a bare identifier with `record` when it matches
    pub fn resolve(&mut self, record: Option<&T>) {
        if let Some(record) = record {
            if record.id() == self.id() {
                *self = Ref::Resolved(Box::new(record.detached()));
            }
        }
    }
}

impl<T> From<Uuid> for Ref<T> {
    fn from(id: Uuid) -> Self {
        Ref::Id(id)
    }
}
