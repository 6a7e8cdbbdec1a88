//! Books API endpoints

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    authors::AuthorView, book_instances::BookInstanceView, create_response, delete_response,
    found, genres::GenreView, update_response,
};
use crate::{
    error::{AppResult, ErrorResponse},
    models::{Book, Entity},
    validation::FormInput,
    AppState,
};

/// Book with its url; references are identifiers or records depending on
/// what the read expanded
#[derive(Debug, Serialize, ToSchema)]
pub struct BookView {
    #[serde(flatten)]
    pub book: Book,
    pub url: String,
}

impl From<Book> for BookView {
    fn from(book: Book) -> Self {
        Self {
            url: book.url(),
            book,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookDetailView {
    pub book: BookView,
    pub instances: Vec<BookInstanceView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookFormOptionsView {
    pub authors: Vec<AuthorView>,
    pub genres: Vec<GenreView>,
}

/// List books by title, author expanded
#[utoipa::path(
    get,
    path = "/catalog/books",
    tag = "books",
    responses(
        (status = 200, description = "Books by title", body = Vec<BookView>),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookView>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books.into_iter().map(BookView::from).collect()))
}

/// Get a book with author, genres and copies
#[utoipa::path(
    get,
    path = "/catalog/books/{id}",
    tag = "books",
    params(
        ("id" = Uuid, Path, description = "Book identifier")
    ),
    responses(
        (status = 200, description = "Book and its copies", body = BookDetailView),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookDetailView>> {
    let detail = state.services.books.get_with_instances(id).await?;
    found::<Book, _>(
        detail.map(|d| BookDetailView {
            book: d.book.into(),
            instances: d.instances.into_iter().map(BookInstanceView::from).collect(),
        }),
        id,
    )
}

/// Authors and genres to choose from on the book form
#[utoipa::path(
    get,
    path = "/catalog/books/form-options",
    tag = "books",
    responses(
        (status = 200, description = "Authors and genres", body = BookFormOptionsView),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn form_options(State(state): State<AppState>) -> AppResult<Json<BookFormOptionsView>> {
    let options = state.services.books.form_options().await?;
    Ok(Json(BookFormOptionsView {
        authors: options.authors.into_iter().map(AuthorView::from).collect(),
        genres: options.genres.into_iter().map(GenreView::from).collect(),
    }))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/catalog/books",
    tag = "books",
    request_body(content = Object, description = "Form fields; values may be strings, numbers or lists"),
    responses(
        (status = 201, description = "Book created", body = BookView),
        (status = 422, description = "Form rejected; body holds the sanitized candidate and field errors"),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(form): Json<FormInput>,
) -> AppResult<Response> {
    let outcome = state.services.books.create(&form).await?;
    Ok(create_response(outcome, BookView::from))
}

/// Replace a book's fields and genre set
#[utoipa::path(
    put,
    path = "/catalog/books/{id}",
    tag = "books",
    params(
        ("id" = Uuid, Path, description = "Book identifier")
    ),
    request_body(content = Object, description = "Form fields; values may be strings, numbers or lists"),
    responses(
        (status = 200, description = "Book updated", body = BookView),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 422, description = "Form rejected; body holds the sanitized candidate and field errors"),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<FormInput>,
) -> AppResult<Response> {
    let outcome = state.services.books.update(id, &form).await?;
    update_response(outcome, id, BookView::from)
}

/// Delete a book; refused with the list of its copies while any remain
#[utoipa::path(
    delete,
    path = "/catalog/books/{id}",
    tag = "books",
    params(
        ("id" = Uuid, Path, description = "Book identifier")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 409, description = "Book still has copies; body lists them"),
        (status = 404, description = "Book not found", body = ErrorResponse),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let outcome = state.services.books.delete(id).await?;
    delete_response(outcome, id, BookView::from, BookInstanceView::from)
}
