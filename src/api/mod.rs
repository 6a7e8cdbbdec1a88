//! API handlers for the catalog JSON endpoints

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod health;
pub mod openapi;

use axum::{
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Entity,
    services::{CreateOutcome, DeleteOutcome, UpdateOutcome},
    validation::FieldError,
    AppState,
};

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let catalog = Router::new()
        .route("/", get(catalog::summary))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Genres
        .route("/genres", get(genres::list_genres).post(genres::create_genre))
        .route(
            "/genres/:id",
            get(genres::get_genre)
                .put(genres::update_genre)
                .delete(genres::delete_genre),
        )
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/form-options", get(books::form_options))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Book instances
        .route(
            "/bookinstances",
            get(book_instances::list_book_instances).post(book_instances::create_book_instance),
        )
        .route("/bookinstances/form-options", get(book_instances::form_options))
        .route(
            "/bookinstances/:id",
            get(book_instances::get_book_instance)
                .put(book_instances::update_book_instance)
                .delete(book_instances::delete_book_instance),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/catalog", catalog)
        .with_state(state)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Body of a 422 response: the sanitized candidate and what is wrong with it
#[derive(Serialize)]
pub struct RejectedResponse<V> {
    pub candidate: V,
    pub errors: Vec<FieldError>,
}

/// Body of a 409 response: the record and what still references it
#[derive(Serialize)]
pub struct BlockedResponse<V, D> {
    pub record: V,
    pub dependents: Vec<D>,
}

fn not_found<E: Entity>(id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {} not found", E::KIND, id))
}

/// Look up result to response, 404 when absent
pub(crate) fn found<E: Entity, V>(record: Option<V>, id: Uuid) -> AppResult<Json<V>> {
    record.map(Json).ok_or_else(|| not_found::<E>(id))
}

/// 201 with a `Location` header for new records, 200 for an existing
/// equivalent, 422 for a rejected form
pub(crate) fn create_response<E, V>(outcome: CreateOutcome<E>, view: impl Fn(E) -> V) -> Response
where
    E: Entity,
    V: Serialize,
{
    match outcome {
        CreateOutcome::Created(record) => {
            let location = record.url();
            (StatusCode::CREATED, [(LOCATION, location)], Json(view(record))).into_response()
        }
        CreateOutcome::Existing(record) => {
            let location = record.url();
            (StatusCode::OK, [(LOCATION, location)], Json(view(record))).into_response()
        }
        CreateOutcome::Rejected(rejected) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(RejectedResponse {
                candidate: view(rejected.candidate),
                errors: rejected.errors,
            }),
        )
            .into_response(),
    }
}

pub(crate) fn update_response<E, V>(
    outcome: UpdateOutcome<E>,
    id: Uuid,
    view: impl Fn(E) -> V,
) -> AppResult<Response>
where
    E: Entity,
    V: Serialize,
{
    match outcome {
        UpdateOutcome::Updated(record) => Ok(Json(view(record)).into_response()),
        UpdateOutcome::Rejected(rejected) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(RejectedResponse {
                candidate: view(rejected.candidate),
                errors: rejected.errors,
            }),
        )
            .into_response()),
        UpdateOutcome::NotFound => Err(not_found::<E>(id)),
    }
}

/// 204 when removed, 409 listing the dependents when blocked
pub(crate) fn delete_response<E, D, V, W>(
    outcome: DeleteOutcome<E, D>,
    id: Uuid,
    view: impl Fn(E) -> V,
    dependent_view: impl Fn(D) -> W,
) -> AppResult<Response>
where
    E: Entity,
    V: Serialize,
    W: Serialize,
{
    match outcome {
        DeleteOutcome::Deleted(_) => Ok(StatusCode::NO_CONTENT.into_response()),
        DeleteOutcome::Blocked { record, dependents } => Ok((
            StatusCode::CONFLICT,
            Json(BlockedResponse {
                record: view(record),
                dependents: dependents.into_iter().map(dependent_view).collect(),
            }),
        )
            .into_response()),
        DeleteOutcome::NotFound => Err(not_found::<E>(id)),
    }
}
