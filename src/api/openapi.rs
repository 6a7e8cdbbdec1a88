//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, book_instances, books, catalog, genres, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library API",
        version = "0.1.0",
        description = "Catalog of authors, genres, books and book copies"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::summary,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre,
        // Books
        books::list_books,
        books::get_book,
        books::form_options,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Book instances
        book_instances::list_book_instances,
        book_instances::get_book_instance,
        book_instances::form_options,
        book_instances::create_book_instance,
        book_instances::update_book_instance,
        book_instances::delete_book_instance,
    ),
    components(
        schemas(
            // Records
            crate::models::Author,
            crate::models::Genre,
            crate::models::Book,
            crate::models::BookSummary,
            crate::models::BookTitle,
            crate::models::BookInstance,
            crate::models::BookStatus,
            // Views
            authors::AuthorView,
            authors::AuthorDetailView,
            genres::GenreView,
            genres::GenreDetailView,
            books::BookView,
            books::BookDetailView,
            books::BookFormOptionsView,
            book_instances::BookInstanceView,
            crate::services::catalog::CatalogSummary,
            // Validation
            crate::validation::FieldError,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Catalog summary"),
        (name = "authors", description = "Author records"),
        (name = "genres", description = "Genre records"),
        (name = "books", description = "Book records"),
        (name = "bookinstances", description = "Physical copies of books")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
