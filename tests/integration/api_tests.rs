//! API integration tests

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use local_library::{api, repository::Repository, services::Services, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> (Repository, Router) {
    let repository = Repository::in_memory();
    let state = AppState::new(Services::new(repository.clone()));
    (repository, api::router(state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Option<String>, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, location, value)
}

#[tokio::test]
async fn test_health_check() {
    let (_, app) = app();

    let (status, _, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_author_returns_location_and_derived_fields() {
    let (_, app) = app();

    let (status, location, body) = send(
        &app,
        Method::POST,
        "/catalog/authors",
        Some(json!({
            "first_name": "Italo",
            "family_name": "Calvino",
            "date_of_birth": "1923-10-15",
            "date_of_death": "1985-09-19"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap();
    assert_eq!(location.as_deref(), Some(format!("/catalog/author/{}", id).as_str()));
    assert_eq!(body["name"], "Calvino, Italo");
    assert_eq!(body["lifespan"], "Oct 15, 1923 – Sep 19, 1985");
    assert_eq!(body["url"], format!("/catalog/author/{}", id));
    assert_eq!(body["date_of_birth"], "1923-10-15");

    let (status, _, detail) = send(&app, Method::GET, &format!("/catalog/authors/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["author"]["family_name"], "Calvino");
    assert_eq!(detail["books"], json!([]));
}

#[tokio::test]
async fn test_rejected_form_returns_candidate_and_errors() {
    let (_, app) = app();

    let (status, location, body) = send(
        &app,
        Method::POST,
        "/catalog/authors",
        Some(json!({ "first_name": "Jean-Paul", "family_name": "", "date_of_birth": "soon" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(location.is_none());
    assert_eq!(body["candidate"]["first_name"], "Jean-Paul");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["first_name", "family_name", "family_name", "date_of_birth"]);

    let (_, _, list) = send(&app, Method::GET, "/catalog/authors", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_existing_genre_returns_ok() {
    let (_, app) = app();

    let (status, location, created) =
        send(&app, Method::POST, "/catalog/genres", Some(json!({ "name": "Fantasy" }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, again_location, again) =
        send(&app, Method::POST, "/catalog/genres", Some(json!({ "name": "Fantasy" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["id"], created["id"]);
    assert_eq!(again_location, location);
}

#[tokio::test]
async fn test_blocked_delete_returns_conflict() {
    let (_, app) = app();

    let (_, _, book) = send(
        &app,
        Method::POST,
        "/catalog/books",
        Some(json!({
            "title": "The Hobbit",
            "author": Uuid::new_v4().to_string(),
            "summary": "There and back again",
            "isbn": "9780261103344",
            "genre": null
        })),
    )
    .await;
    let book_id = book["id"].as_str().unwrap().to_string();
    assert_eq!(book["genre"], json!([]));

    let (status, _, copy) = send(
        &app,
        Method::POST,
        "/catalog/bookinstances",
        Some(json!({ "book": book_id, "imprint": "Allen & Unwin", "due_back": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["status"], "Maintenance");
    assert_eq!(copy["imprint"], "Allen &amp; Unwin");
    assert_eq!(copy["due_back"], Value::Null);

    let uri = format!("/catalog/books/{}", book_id);
    let (status, _, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["record"]["id"], book_id.as_str());
    assert_eq!(body["dependents"][0]["id"], copy["id"]);

    let copy_uri = format!("/catalog/bookinstances/{}", copy["id"].as_str().unwrap());
    let (status, _, _) = send(&app, Method::DELETE, &copy_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_update_and_get_book_instance() {
    let (_, app) = app();
    let book = Uuid::new_v4().to_string();

    let (_, _, copy) = send(
        &app,
        Method::POST,
        "/catalog/bookinstances",
        Some(json!({ "book": book, "imprint": "Vintage", "status": "Available" })),
    )
    .await;
    let uri = format!("/catalog/bookinstances/{}", copy["id"].as_str().unwrap());

    let (status, _, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "book": book, "imprint": "Vintage", "status": "Loaned", "due_back": "2024-10-05" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Loaned");
    assert_eq!(updated["due_back_formatted"], "Oct 5, 2024");

    let (status, _, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["due_back"], "2024-10-05");
    // Dangling book reference stays a bare identifier
    assert_eq!(fetched["book"], book.as_str());

    let (status, _, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "book": book, "imprint": "Vintage", "status": "Lost" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["message"], "Invalid status");
}

#[tokio::test]
async fn test_unknown_record_is_not_found() {
    let (_, app) = app();
    let id = Uuid::new_v4();

    for uri in [
        format!("/catalog/authors/{}", id),
        format!("/catalog/genres/{}", id),
        format!("/catalog/books/{}", id),
        format!("/catalog/bookinstances/{}", id),
    ] {
        let (status, _, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {}", uri);
        assert_eq!(body["error"], "NotFound");
    }

    let (status, _, _) = send(
        &app,
        Method::PUT,
        &format!("/catalog/genres/{}", id),
        Some(json!({ "name": "Mystery" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_summary() {
    let (_, app) = app();

    send(&app, Method::POST, "/catalog/genres", Some(json!({ "name": "History" }))).await;

    let (status, _, body) = send(&app, Method::GET, "/catalog", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "book_count": 0,
            "book_instance_count": 0,
            "book_instance_available_count": 0,
            "author_count": 0,
            "genre_count": 1
        })
    );
}

#[tokio::test]
async fn test_closed_store_returns_service_unavailable() {
    let (repository, app) = app();
    repository.close().await;

    let (status, _, body) = send(&app, Method::GET, "/catalog/books", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "StorageFailure");
}

#[tokio::test]
async fn test_numeric_form_values_are_validated_as_text() {
    let (_, app) = app();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/catalog/books",
        Some(json!({
            "title": "Dune",
            "author": 42,
            "summary": "Spice",
            "isbn": 9780441013593u64
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["candidate"]["isbn"], "9780441013593");
    assert_eq!(body["errors"][0]["field"], "author");

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/catalog/books",
        Some(json!({
            "title": "Dune",
            "author": Uuid::new_v4().to_string(),
            "summary": "Spice",
            "isbn": 9780441013593u64
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isbn"], "9780441013593");
}

#[tokio::test]
async fn test_openapi_document_lists_catalog_paths() {
    let (_, app) = app();

    let (status, _, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "Local Library API");
    for path in ["/catalog", "/catalog/authors/{id}", "/catalog/books/form-options", "/health"] {
        assert!(doc["paths"].get(path).is_some(), "missing {}", path);
    }
    assert!(doc["components"]["schemas"].get("AuthorView").is_some());
}
