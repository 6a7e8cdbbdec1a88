//! Book instances API endpoints

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
    models::{BookInstance, BookTitle, Entity},
    validation::FormInput,
    AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct BookInstanceView {
    #[serde(flatten)]
    pub instance: BookInstance,
    pub due_back_formatted: String,
    pub url: String,
}

impl From<BookInstance> for BookInstanceView {
    fn from(instance: BookInstance) -> Self {
        Self {
            due_back_formatted: instance.due_back_formatted(),
            url: instance.url(),
            instance,
        }
    }
}

/// List every copy with its book expanded
#[utoipa::path(
    get,
    path = "/catalog/bookinstances",
    tag = "bookinstances",
    responses(
        (status = 200, description = "Every copy", body = Vec<BookInstanceView>),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_book_instances(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BookInstanceView>>> {
    let copies = state.services.book_instances.list().await?;
    Ok(Json(copies.into_iter().map(BookInstanceView::from).collect()))
}

#[utoipa::path(
    get,
    path = "/catalog/bookinstances/{id}",
    tag = "bookinstances",
    params(
        ("id" = Uuid, Path, description = "Book instance identifier")
    ),
    responses(
        (status = 200, description = "Copy with its book", body = BookInstanceView),
        (status = 404, description = "Book instance not found", body = ErrorResponse),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn get_book_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceView>> {
    let copy = state.services.book_instances.get(id).await?;
    found::<BookInstance, _>(copy.map(BookInstanceView::from), id)
}

/// Book titles to choose from on the copy form
#[utoipa::path(
    get,
    path = "/catalog/bookinstances/form-options",
    tag = "bookinstances",
    responses(
        (status = 200, description = "Book titles", body = Vec<BookTitle>),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn form_options(State(state): State<AppState>) -> AppResult<Json<Vec<BookTitle>>> {
    let titles = state.services.book_instances.form_options().await?;
    Ok(Json(titles))
}

/// Create a copy
#[utoipa::path(
    post,
    path = "/catalog/bookinstances",
    tag = "bookinstances",
    request_body(content = Object, description = "Form fields; values may be strings, numbers or lists"),
    responses(
        (status = 201, description = "Copy created", body = BookInstanceView),
        (status = 422, description = "Form rejected; body holds the sanitized candidate and field errors"),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn create_book_instance(
    State(state): State<AppState>,
    Json(form): Json<FormInput>,
) -> AppResult<Response> {
    let outcome = state.services.book_instances.create(&form).await?;
    Ok(create_response(outcome, BookInstanceView::from))
}

#[utoipa::path(
    put,
    path = "/catalog/bookinstances/{id}",
    tag = "bookinstances",
    params(
        ("id" = Uuid, Path, description = "Book instance identifier")
    ),
    request_body(content = Object, description = "Form fields; values may be strings, numbers or lists"),
    responses(
        (status = 200, description = "Copy updated", body = BookInstanceView),
        (status = 404, description = "Book instance not found", body = ErrorResponse),
        (status = 422, description = "Form rejected; body holds the sanitized candidate and field errors"),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn update_book_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<FormInput>,
) -> AppResult<Response> {
    let outcome = state.services.book_instances.update(id, &form).await?;
    update_response(outcome, id, BookInstanceView::from)
}

/// Delete a copy; nothing references copies
#[utoipa::path(
    delete,
    path = "/catalog/bookinstances/{id}",
    tag = "bookinstances",
    params(
        ("id" = Uuid, Path, description = "Book instance identifier")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Book instance not found", body = ErrorResponse),
        (status = 503, description = "Catalog store unavailable", body = ErrorResponse)
    )
)]
pub async fn delete_book_instance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let outcome = state.services.book_instances.delete(id).await?;
    delete_response(outcome, id, BookInstanceView::from, |_: ()| ())
}
