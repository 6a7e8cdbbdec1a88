//! Book instance (physical copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{author::DISPLAY_DATE_FORMAT, Book, Entity, EntityKind, Ref};

/// Circulation status of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum BookStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookStatus {
    pub const ALL: [BookStatus; 4] = [
        BookStatus::Available,
        BookStatus::Maintenance,
        BookStatus::Loaned,
        BookStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Maintenance => "Maintenance",
            BookStatus::Loaned => "Loaned",
            BookStatus::Reserved => "Reserved",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown book status: {}", s))
    }
}

/// Book instance record.
///
/// `due_back` only means something while the copy is `Loaned`, but the two
/// fields are set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    /// Book identifier, or the book record when expanded
    #[schema(value_type = Object)]
    pub book: Ref<Book>,
    pub imprint: String,
    #[serde(default)]
    pub status: BookStatus,
    pub due_back: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct BookInstanceFilter {
    pub book: Option<Uuid>,
    pub status: Option<BookStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookInstanceSort {
    Imprint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookInstanceExpand {
    Book,
}

impl BookInstance {
    pub fn new(
        book: impl Into<Ref<Book>>,
        imprint: impl Into<String>,
        status: BookStatus,
        due_back: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            book: book.into(),
            imprint: imprint.into(),
            status,
            due_back,
        }
    }

    pub fn due_back_formatted(&self) -> String {
        self.due_back
            .map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
            .unwrap_or_default()
    }
}

impl Entity for BookInstance {
    const KIND: EntityKind = EntityKind::BookInstance;

    type Filter = BookInstanceFilter;
    type Sort = BookInstanceSort;
    type Expand = BookInstanceExpand;

    fn id(&self) -> Uuid {
        self.id
    }

    fn detached(&self) -> Self {
        Self {
            book: self.book.detached(),
            ..self.clone()
        }
    }
}
