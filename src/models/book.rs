//! Book model and its projections

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Author, Entity, EntityKind, Genre, Ref};

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    /// Author identifier, or the author record when expanded
    #[schema(value_type = Object)]
    pub author: Ref<Author>,
    pub summary: String,
    pub isbn: String,
    /// Genre references, without duplicates
    #[schema(value_type = Vec<Object>)]
    pub genre: Vec<Ref<Genre>>,
}

#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub author: Option<Uuid>,
    /// Books whose genre set contains this genre
    pub genre: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSort {
    Title,
}

/// Reference fields of a book that reads can expand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookExpand {
    Author,
    Genre,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<Ref<Author>>,
        summary: impl Into<String>,
        isbn: impl Into<String>,
        genre: Vec<Ref<Genre>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            summary: summary.into(),
            isbn: isbn.into(),
            genre,
        }
    }

    pub fn genre_ids(&self) -> Vec<Uuid> {
        self.genre.iter().map(Ref::id).collect()
    }

    pub fn has_genre(&self, genre: Uuid) -> bool {
        self.genre.iter().any(|g| g.id() == genre)
    }
}

impl Entity for Book {
    const KIND: EntityKind = EntityKind::Book;

    type Filter = BookFilter;
    type Sort = BookSort;
    type Expand = BookExpand;

    fn id(&self) -> Uuid {
        self.id
    }

    fn detached(&self) -> Self {
        Self {
            author: self.author.detached(),
            genre: self.genre.iter().map(Ref::detached).collect(),
            ..self.clone()
        }
    }
}

/// Title and summary of a book, as listed on author and genre pages
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub url: String,
}

impl From<Book> for BookSummary {
    fn from(book: Book) -> Self {
        Self {
            url: book.url(),
            id: book.id,
            title: book.title,
            summary: book.summary,
        }
    }
}

/// Title only, for the copy form's book selector
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BookTitle {
    pub id: Uuid,
    pub title: String,
}

impl From<Book> for BookTitle {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
        }
    }
}
