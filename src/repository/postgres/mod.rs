//! PostgreSQL catalog store

mod authors;
mod book_instances;
mod books;
mod genres;

use sqlx::{Pool, Postgres};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}
