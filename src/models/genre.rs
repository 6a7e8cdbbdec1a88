//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Entity, EntityKind, NoExpand};

/// Genre record. `name` is a soft-unique business key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct GenreFilter {
    /// Exact name match
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreSort {
    Name,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

impl Entity for Genre {
    const KIND: EntityKind = EntityKind::Genre;

    type Filter = GenreFilter;
    type Sort = GenreSort;
    type Expand = NoExpand;

    fn id(&self) -> Uuid {
        self.id
    }
}
