//! Service-level catalog tests

use chrono::NaiveDate;
use local_library::{
    error::AppError,
    models::{BookStatus, Entity, Ref},
    services::{CreateOutcome, DeleteOutcome, UpdateOutcome},
    validation::FormInput,
};
use uuid::Uuid;

use super::{author_input, book_input, created, services};

#[tokio::test]
async fn test_create_author_gets_identity_and_display_fields() {
    let (_, services) = services();

    let author = created(
        services
            .authors
            .create(&author_input("Ursula", "LeGuin").with("date_of_birth", "1929-10-21"))
            .await
            .unwrap(),
    );

    assert_eq!(author.name(), "LeGuin, Ursula");
    assert_eq!(author.url(), format!("/catalog/author/{}", author.id));
    assert_eq!(author.date_of_birth, NaiveDate::from_ymd_opt(1929, 10, 21));

    let stored = services.authors.get(author.id).await.unwrap().unwrap();
    assert_eq!(stored, author);
}

#[tokio::test]
async fn test_short_genre_name_rejected() {
    let (_, services) = services();

    let outcome = services
        .genres
        .create(&FormInput::new().with("name", "  Sf "))
        .await
        .unwrap();

    match outcome {
        CreateOutcome::Rejected(rejected) => {
            assert_eq!(rejected.candidate.name, "Sf");
            assert_eq!(rejected.errors.len(), 1);
            assert_eq!(rejected.errors[0].field, "name");
            assert_eq!(
                rejected.errors[0].message,
                "Genre name must contain at least 3 characters"
            );
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert!(services.genres.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_genre_returns_existing_record() {
    let (_, services) = services();

    let fantasy = created(
        services
            .genres
            .create(&FormInput::new().with("name", "Fantasy"))
            .await
            .unwrap(),
    );

    match services
        .genres
        .create(&FormInput::new().with("name", " Fantasy "))
        .await
        .unwrap()
    {
        CreateOutcome::Existing(existing) => assert_eq!(existing.id, fantasy.id),
        other => panic!("expected the existing genre, got {:?}", other),
    }
    assert_eq!(services.genres.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_genre_delete_is_idempotent() {
    let (_, services) = services();

    let genre = created(
        services
            .genres
            .create(&FormInput::new().with("name", "Poetry"))
            .await
            .unwrap(),
    );

    assert!(services.genres.delete(genre.id).await.unwrap().is_deleted());
    assert!(matches!(
        services.genres.delete(genre.id).await.unwrap(),
        DeleteOutcome::NotFound
    ));
    assert!(matches!(
        services.genres.delete(genre.id).await.unwrap(),
        DeleteOutcome::NotFound
    ));
}

#[tokio::test]
async fn test_update_round_trips_sanitized_input() {
    let (_, services) = services();
    let author = Uuid::new_v4();

    let book = created(
        services
            .books
            .create(&book_input("Original", author, &[]))
            .await
            .unwrap(),
    );

    match services
        .books
        .update(book.id, &book_input("  A & B ", author, &[]))
        .await
        .unwrap()
    {
        UpdateOutcome::Updated(updated) => {
            assert_eq!(updated.id, book.id);
            assert_eq!(updated.title, "A &amp; B");
        }
        other => panic!("expected update, got {:?}", other),
    }

    let stored = services.books.get(book.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "A &amp; B");
    assert_eq!(services.books.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_missing_record_is_not_found() {
    let (_, services) = services();

    let outcome = services
        .authors
        .update(Uuid::new_v4(), &author_input("Jane", "Austen"))
        .await
        .unwrap();
    assert!(matches!(outcome, UpdateOutcome::NotFound));

    // Validation runs before the lookup
    let outcome = services
        .authors
        .update(Uuid::new_v4(), &author_input("", "Austen"))
        .await
        .unwrap();
    assert!(matches!(outcome, UpdateOutcome::Rejected(_)));
}

#[tokio::test]
async fn test_author_delete_blocked_until_books_removed() {
    let (_, services) = services();

    let author = created(services.authors.create(&author_input("Iain", "Banks")).await.unwrap());
    let first = created(
        services
            .books
            .create(&book_input("Consider Phlebas", author.id, &[]))
            .await
            .unwrap(),
    );
    let second = created(
        services
            .books
            .create(&book_input("Excession", author.id, &[]))
            .await
            .unwrap(),
    );
    created(
        services
            .books
            .create(&book_input("Other", Uuid::new_v4(), &[]))
            .await
            .unwrap(),
    );

    match services.authors.delete(author.id).await.unwrap() {
        DeleteOutcome::Blocked { record, dependents } => {
            assert_eq!(record.id, author.id);
            let mut ids: Vec<Uuid> = dependents.iter().map(|b| b.id).collect();
            let mut expected = vec![first.id, second.id];
            ids.sort();
            expected.sort();
            assert_eq!(ids, expected);
        }
        other => panic!("expected blocked delete, got {:?}", other),
    }
    assert!(services.authors.get(author.id).await.unwrap().is_some());

    assert!(services.books.delete(first.id).await.unwrap().is_deleted());
    assert!(services.books.delete(second.id).await.unwrap().is_deleted());
    assert!(services.authors.delete(author.id).await.unwrap().is_deleted());
    assert!(services.authors.get(author.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_absent_genre_gives_empty_set() {
    let (_, services) = services();

    let form = FormInput::new()
        .with("title", "Untagged")
        .with("author", Uuid::new_v4().to_string())
        .with("summary", "No genre at all")
        .with("isbn", "1");
    let book = created(services.books.create(&form).await.unwrap());
    assert!(book.genre.is_empty());

    let stored = services.books.get(book.id).await.unwrap().unwrap();
    assert!(stored.genre.is_empty());
}

#[tokio::test]
async fn test_book_get_expands_author_and_genres() {
    let (_, services) = services();

    let author = created(services.authors.create(&author_input("Mary", "Shelley")).await.unwrap());
    let horror = created(
        services
            .genres
            .create(&FormInput::new().with("name", "Horror"))
            .await
            .unwrap(),
    );
    let book = created(
        services
            .books
            .create(&book_input("Frankenstein", author.id, &[horror.id, horror.id]))
            .await
            .unwrap(),
    );
    assert_eq!(book.genre, vec![Ref::Id(horror.id)]);

    let detail = services.books.get_with_instances(book.id).await.unwrap().unwrap();
    assert_eq!(detail.book.author.resolved().map(|a| a.name()), Some(author.name()));
    assert_eq!(detail.book.genre[0].resolved(), Some(&horror));
    assert!(detail.instances.is_empty());

    let genre_detail = services.genres.get_with_books(horror.id).await.unwrap().unwrap();
    assert_eq!(genre_detail.books.len(), 1);
    assert_eq!(genre_detail.books[0].title, "Frankenstein");
}

#[tokio::test]
async fn test_available_instance_without_due_back() {
    let (_, services) = services();
    let book = Uuid::new_v4();

    let form = FormInput::new()
        .with("book", book.to_string())
        .with("imprint", "Penguin, 2003")
        .with("status", "Available");
    let copy = created(services.book_instances.create(&form).await.unwrap());
    assert_eq!(copy.status, BookStatus::Available);
    assert_eq!(copy.due_back, None);

    let stored = services.book_instances.get(copy.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookStatus::Available);
    assert_eq!(stored.due_back, None);
    assert_eq!(stored.book, Ref::Id(book));
}

#[tokio::test]
async fn test_summary_counts_every_kind() {
    let (_, services) = services();

    let author = created(services.authors.create(&author_input("Jules", "Verne")).await.unwrap());
    created(
        services
            .genres
            .create(&FormInput::new().with("name", "Adventure"))
            .await
            .unwrap(),
    );
    let book = created(
        services
            .books
            .create(&book_input("Nautilus", author.id, &[]))
            .await
            .unwrap(),
    );
    for status in ["Available", "Loaned", "Available"] {
        let form = FormInput::new()
            .with("book", book.id.to_string())
            .with("imprint", "Hetzel")
            .with("status", status);
        created(services.book_instances.create(&form).await.unwrap());
    }

    let summary = services.catalog.summary().await.unwrap();
    assert_eq!(summary.book_count, 1);
    assert_eq!(summary.book_instance_count, 3);
    assert_eq!(summary.book_instance_available_count, 2);
    assert_eq!(summary.author_count, 1);
    assert_eq!(summary.genre_count, 1);
}

#[tokio::test]
async fn test_form_options_are_sorted() {
    let (_, services) = services();

    for (first, family) in [("Zadie", "Smith"), ("Chinua", "Achebe")] {
        created(services.authors.create(&author_input(first, family)).await.unwrap());
    }
    for title in ["Zebra", "Apple"] {
        created(
            services
                .books
                .create(&book_input(title, Uuid::new_v4(), &[]))
                .await
                .unwrap(),
        );
    }

    let options = services.books.form_options().await.unwrap();
    let families: Vec<_> = options.authors.iter().map(|a| a.family_name.as_str()).collect();
    assert_eq!(families, vec!["Achebe", "Smith"]);

    let titles: Vec<_> = services
        .book_instances
        .form_options()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, vec!["Apple", "Zebra"]);
}

#[tokio::test]
async fn test_closed_store_fails_with_storage_error() {
    let (repository, services) = services();
    repository.close().await;

    let result = services.catalog.summary().await;
    assert!(matches!(result, Err(AppError::Unavailable(_))));

    let result = services.authors.create(&author_input("Late", "Comer")).await;
    assert!(matches!(result, Err(AppError::Unavailable(_))));
}

#[tokio::test]
async fn test_genre_delete_blocked_while_a_book_uses_it() {
    let (_, services) = services();

    let horror = created(
        services
            .genres
            .create(&FormInput::new().with("name", "Horror"))
            .await
            .unwrap(),
    );
    let gothic = created(
        services
            .genres
            .create(&FormInput::new().with("name", "Gothic"))
            .await
            .unwrap(),
    );
    let dracula = created(
        services
            .books
            .create(&book_input("Dracula", Uuid::new_v4(), &[gothic.id, horror.id]))
            .await
            .unwrap(),
    );

    match services.genres.delete(horror.id).await.unwrap() {
        DeleteOutcome::Blocked { record, dependents } => {
            assert_eq!(record.id, horror.id);
            let ids: Vec<Uuid> = dependents.iter().map(|b| b.id).collect();
            assert_eq!(ids, vec![dracula.id]);
        }
        other => panic!("expected blocked delete, got {:?}", other),
    }
    assert!(services.genres.get(horror.id).await.unwrap().is_some());

    assert!(services.books.delete(dracula.id).await.unwrap().is_deleted());
    assert!(services.genres.delete(horror.id).await.unwrap().is_deleted());
    assert!(services.genres.get(horror.id).await.unwrap().is_none());
}
