//! Authors API endpoints

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{create_response, delete_response, found, update_response};
use crate::{
    error::{AppResult, ErrorResponse},
    models::{Author, BookSummary, Entity},
    validation::FormInput,
    AppState,
};

/// Author with its derived display fields
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorView {
    #[serde(flatten)]
    pub author: Author,
    pub name: String,
    pub lifespan: String,
    pub url: String,
}

impl From<Author> for AuthorView {
    fn from(author: Author) -> Self {
        Self {
            name: author.name(),
            lifespan: author.lifespan(),
            url: author.url(),
            author,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorDetailView {
    pub author: AuthorView,
    pub books: Vec<BookSummary>,
}

/// List authors by family name
#[utoipa::path(
    get,
    path = "/catalog/authors",
    tag = "authors",
    responses(
        (status = 200, description = "Authors by family name", body = Vec<AuthorView>),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_authors(State(state): State<AppState>) -> AppResult<Json<Vec<AuthorView>>> {
    let authors = state.services.authors.list().await?;
    Ok(Json(authors.into_iter().map(AuthorView::from).collect()))
}

/// Get an author with their books
#[utoipa::path(
    get,
    path = "/catalog/authors/{id}",
    tag = "authors",
    params(
        ("id" = Uuid, Path, description = "Author identifier")
    ),
    responses(
        (status = 200, description = "Author and their books", body = AuthorDetailView),
        (status = 404, description = "Author not found", body = ErrorResponse),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AuthorDetailView>> {
    let detail = state.services.authors.get_with_books(id).await?;
    found::<Author, _>(
        detail.map(|d| AuthorDetailView {
            author: d.author.into(),
            books: d.books,
        }),
        id,
    )
}

/// Create an author
#[utoipa::path(
    post,
    path = "/catalog/authors",
    tag = "authors",
    request_body(content = Object, description = "Form fields; values may be strings, numbers or lists"),
    responses(
        (status = 201, description = "Author created", body = AuthorView),
        (status = 422, description = "Form rejected; body holds the sanitized candidate and field errors"),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    Json(form): Json<FormInput>,
) -> AppResult<Response> {
    let outcome = state.services.authors.create(&form).await?;
    Ok(create_response(outcome, AuthorView::from))
}

/// Replace an author's fields
#[utoipa::path(
    put,
    path = "/catalog/authors/{id}",
    tag = "authors",
    params(
        ("id" = Uuid, Path, description = "Author identifier")
    ),
    request_body(content = Object, description = "Form fields; values may be strings, numbers or lists"),
    responses(
        (status = 200, description = "Author updated", body = AuthorView),
        (status = 404, description = "Author not found", body = ErrorResponse),
        (status = 422, description = "Form rejected; body holds the sanitized candidate and field errors"),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<FormInput>,
) -> AppResult<Response> {
    let outcome = state.services.authors.update(id, &form).await?;
    update_response(outcome, id, AuthorView::from)
}

/// Delete an author; refused with the list of their books while any remain
#[utoipa::path(
    delete,
    path = "/catalog/authors/{id}",
    tag = "authors",
    params(
        ("id" = Uuid, Path, description = "Author identifier")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 409, description = "Author still has books; body lists them"),
        (status = 404, description = "Author not found", body = ErrorResponse),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let outcome = state.services.authors.delete(id).await?;
    delete_response(outcome, id, AuthorView::from, BookSummary::from)
}
