//! Author model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Entity, EntityKind, NoExpand};

/// Display format for dates shown to librarians (e.g. "Jan 3, 1892")
pub const DISPLAY_DATE_FORMAT: &str = "%b %-d, %Y";

/// Author record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Sort keys for author listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorSort {
    FamilyName,
}

impl Author {
    pub fn new(
        first_name: impl Into<String>,
        family_name: impl Into<String>,
        date_of_birth: Option<NaiveDate>,
        date_of_death: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            family_name: family_name.into(),
            date_of_birth,
            date_of_death,
        }
    }

    /// "family_name, first_name"
    pub fn name(&self) -> String {
        format!("{}, {}", self.family_name, self.first_name)
    }

    /// Birth and death dates joined by an en dash, or "Unknown" when neither is known
    pub fn lifespan(&self) -> String {
        if self.date_of_birth.is_none() && self.date_of_death.is_none() {
            return "Unknown".to_string();
        }
        let format = |date: Option<NaiveDate>| {
            date.map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        format!("{} – {}", format(self.date_of_birth), format(self.date_of_death))
    }
}

impl Entity for Author {
    const KIND: EntityKind = EntityKind::Author;

    type Filter = ();
    type Sort = AuthorSort;
    type Expand = NoExpand;

    fn id(&self) -> Uuid {
        self.id
    }
}
