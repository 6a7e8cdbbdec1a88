//! Genres API endpoints

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
    models::{BookSummary, Entity, Genre},
    validation::FormInput,
    AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct GenreView {
    #[serde(flatten)]
    pub genre: Genre,
    pub url: String,
}

impl From<Genre> for GenreView {
    fn from(genre: Genre) -> Self {
        Self {
            url: genre.url(),
            genre,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenreDetailView {
    pub genre: GenreView,
    pub books: Vec<BookSummary>,
}

/// List genres by name
#[utoipa::path(
    get,
    path = "/catalog/genres",
    tag = "genres",
    responses(
        (status = 200, description = "Genres by name", body = Vec<GenreView>),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<GenreView>>> {
    let genres = state.services.genres.list().await?;
    Ok(Json(genres.into_iter().map(GenreView::from).collect()))
}

/// Get a genre with the books filed under it
#[utoipa::path(
    get,
    path = "/catalog/genres/{id}",
    tag = "genres",
    params(
        ("id" = Uuid, Path, description = "Genre identifier")
    ),
    responses(
        (status = 200, description = "Genre and its books", body = GenreDetailView),
        (status = 404, description = "Genre not found", body = ErrorResponse),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<GenreDetailView>> {
    let detail = state.services.genres.get_with_books(id).await?;
    found::<Genre, _>(
        detail.map(|d| GenreDetailView {
            genre: d.genre.into(),
            books: d.books,
        }),
        id,
    )
}

/// Create a genre; an existing genre with the same name is returned with 200
#[utoipa::path(
    post,
    path = "/catalog/genres",
    tag = "genres",
    request_body(content = Object, description = "Form fields; values may be strings, numbers or lists"),
    responses(
        (status = 201, description = "Genre created", body = GenreView),
        (status = 200, description = "Genre with this name already exists", body = GenreView),
        (status = 422, description = "Form rejected; body holds the sanitized candidate and field errors"),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    Json(form): Json<FormInput>,
) -> AppResult<Response> {
    let outcome = state.services.genres.create(&form).await?;
    Ok(create_response(outcome, GenreView::from))
}

#[utoipa::path(
    put,
    path = "/catalog/genres/{id}",
    tag = "genres",
    params(
        ("id" = Uuid, Path, description = "Genre identifier")
    ),
    request_body(content = Object, description = "Form fields; values may be strings, numbers or lists"),
    responses(
        (status = 200, description = "Genre updated", body = GenreView),
        (status = 404, description = "Genre not found", body = ErrorResponse),
        (status = 422, description = "Form rejected; body holds the sanitized candidate and field errors"),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<FormInput>,
) -> AppResult<Response> {
    let outcome = state.services.genres.update(id, &form).await?;
    update_response(outcome, id, GenreView::from)
}

/// Delete a genre; refused while any book is filed under it
#[utoipa::path(
    delete,
    path = "/catalog/genres/{id}",
    tag = "genres",
    params(
        ("id" = Uuid, Path, description = "Genre identifier")
    ),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 409, description = "Genre still has books; body lists them"),
        (status = 404, description = "Genre not found", body = ErrorResponse),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let outcome = state.services.genres.delete(id).await?;
    delete_response(outcome, id, GenreView::from, BookSummary::from)
}
