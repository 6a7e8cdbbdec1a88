//! PostgreSQL store tests
//!
//! These need a scratch database. Run with:
//! DATABASE_URL=postgres://... cargo test -- --ignored
//! Every test works on freshly generated records so they can share one
//! database and run in parallel.

use local_library::{
    config::{DatabaseConfig, StorageBackend},
    models::{
        Author, AuthorSort, Book, BookExpand, BookFilter, BookInstance, BookInstanceExpand,
        BookInstanceFilter, BookSort, BookStatus, Genre, GenreFilter, GenreSort, Ref,
    },
    repository::{FindQuery, Repository},
    services::{DeleteOutcome, Services},
    validation::FormInput,
};
use uuid::Uuid;

use super::{book_input, created};

async fn repository() -> Repository {
    let config = DatabaseConfig {
        backend: StorageBackend::Postgres,
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database"),
        max_connections: 2,
        min_connections: 0,
    };
    Repository::connect(&config).await.expect("Failed to open the catalog store")
}

/// Genre with a name no other test run uses
fn unique_genre(prefix: &str) -> Genre {
    Genre::new(format!("{} {}", prefix, Uuid::new_v4()))
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_genre_links_keep_submission_order() {
    let repository = repository().await;
    let author = Author::new("Mervyn", "Peake", None, None);
    repository.authors.create(&author).await.unwrap();

    let genres: Vec<Genre> = ["Gothic", "Fantasy", "Satire"].map(unique_genre).into();
    for genre in &genres {
        repository.genres.create(genre).await.unwrap();
    }

    let order = vec![genres[2].id, genres[0].id, genres[1].id];
    let book = Book::new(
        "Titus Groan",
        author.id,
        "Gormenghast",
        "9780099288282",
        order.iter().copied().map(Ref::Id).collect(),
    );
    let stored = repository.books.create(&book).await.unwrap();
    assert_eq!(stored.genre_ids(), order);

    let fetched = repository.books.find_by_id(book.id, &[]).await.unwrap().unwrap();
    assert_eq!(fetched.genre_ids(), order);

    let mut changed = fetched.clone();
    changed.title = "Gormenghast".to_string();
    changed.genre = vec![Ref::Id(genres[1].id), Ref::Id(genres[2].id)];
    let updated = repository.books.update(book.id, &changed).await.unwrap().unwrap();
    assert_eq!(updated.title, "Gormenghast");

    let fetched = repository.books.find_by_id(book.id, &[]).await.unwrap().unwrap();
    assert_eq!(fetched.genre_ids(), vec![genres[1].id, genres[2].id]);
}

#[tokio::test]
#[ignore]
async fn test_expansion_resolves_author_and_genres() {
    let repository = repository().await;
    let author = Author::new("Shirley", "Jackson", None, None);
    repository.authors.create(&author).await.unwrap();
    let genre = unique_genre("Horror");
    repository.genres.create(&genre).await.unwrap();
    let missing_genre = Uuid::new_v4();

    let book = Book::new(
        "The Haunting of Hill House",
        author.id,
        "Hill House",
        "9780143039983",
        vec![Ref::Id(genre.id), Ref::Id(missing_genre)],
    );
    repository.books.create(&book).await.unwrap();

    let expanded = repository
        .books
        .find_by_id(book.id, &[BookExpand::Author, BookExpand::Genre])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(expanded.author.resolved(), Some(&author));
    assert_eq!(expanded.genre[0].resolved(), Some(&genre));
    // Dangling reference stays bare
    assert_eq!(expanded.genre[1], Ref::Id(missing_genre));

    let copy = BookInstance::new(book.id, "Viking, 1959", BookStatus::Available, None);
    repository.book_instances.create(&copy).await.unwrap();
    let fetched = repository
        .book_instances
        .find_by_id(copy.id, &[BookInstanceExpand::Book])
        .await
        .unwrap()
        .unwrap();
    let resolved = fetched.book.resolved().unwrap();
    assert_eq!(resolved.title, "The Haunting of Hill House");
    assert_eq!(resolved.author, Ref::Id(author.id));
}

#[tokio::test]
#[ignore]
async fn test_filters_bind_in_order() {
    let repository = repository().await;
    let author = Author::new("Terry", "Pratchett", None, None);
    let other_author = Author::new("Neil", "Gaiman", None, None);
    repository.authors.create(&author).await.unwrap();
    repository.authors.create(&other_author).await.unwrap();
    let genre = unique_genre("Comic fantasy");
    repository.genres.create(&genre).await.unwrap();

    let tagged = Book::new("Mort", author.id, "Death", "1", vec![Ref::Id(genre.id)]);
    let untagged = Book::new("Eric", author.id, "Faust", "2", vec![]);
    let shared = Book::new("Good Omens", other_author.id, "Armageddon", "3", vec![Ref::Id(genre.id)]);
    for book in [&tagged, &untagged, &shared] {
        repository.books.create(book).await.unwrap();
    }

    let by_author = BookFilter {
        author: Some(author.id),
        ..Default::default()
    };
    let found = repository
        .books
        .find(&FindQuery::filtered(by_author.clone()).sort_by(BookSort::Title))
        .await
        .unwrap();
    let titles: Vec<_> = found.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Eric", "Mort"]);
    assert_eq!(repository.books.count(&by_author).await.unwrap(), 2);

    let by_genre = BookFilter {
        genre: Some(genre.id),
        ..Default::default()
    };
    assert_eq!(repository.books.count(&by_genre).await.unwrap(), 2);

    let both = BookFilter {
        author: Some(author.id),
        genre: Some(genre.id),
    };
    let found = repository.books.find(&FindQuery::filtered(both.clone())).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, tagged.id);
    assert_eq!(repository.books.count(&both).await.unwrap(), 1);

    let named = GenreFilter {
        name: Some(genre.name.clone()),
    };
    let found = repository.genres.find(&FindQuery::filtered(named.clone())).await.unwrap();
    assert_eq!(found, vec![genre.clone()]);
    assert_eq!(repository.genres.count(&named).await.unwrap(), 1);

    for status in [BookStatus::Available, BookStatus::Loaned, BookStatus::Available] {
        let copy = BookInstance::new(tagged.id, "Gollancz", status, None);
        repository.book_instances.create(&copy).await.unwrap();
    }
    let available = BookInstanceFilter {
        book: Some(tagged.id),
        status: Some(BookStatus::Available),
    };
    let copies = repository
        .book_instances
        .find(&FindQuery::filtered(available.clone()))
        .await
        .unwrap();
    assert_eq!(copies.len(), 2);
    assert!(copies.iter().all(|c| c.status == BookStatus::Available));
    assert_eq!(repository.book_instances.count(&available).await.unwrap(), 2);
}

#[tokio::test]
#[ignore]
async fn test_text_sort_is_by_code_point() {
    let repository = repository().await;
    let marker = Uuid::new_v4().to_string();
    let mut ids = Vec::new();
    for family_name in ["apple", "Zebra", "Banana"] {
        let author = Author::new(marker.clone(), family_name, None, None);
        repository.authors.create(&author).await.unwrap();
        ids.push(author.id);
    }

    let sorted = repository
        .authors
        .find(&FindQuery::all().sort_by(AuthorSort::FamilyName))
        .await
        .unwrap();
    let ours: Vec<_> = sorted
        .iter()
        .filter(|a| ids.contains(&a.id))
        .map(|a| a.family_name.as_str())
        .collect();
    assert_eq!(ours, vec!["Banana", "Zebra", "apple"]);

    let genres: Vec<Genre> = ["b", "A", "a"]
        .into_iter()
        .map(|prefix| Genre::new(format!("{}{}", prefix, marker)))
        .collect();
    for genre in &genres {
        repository.genres.create(genre).await.unwrap();
    }
    let sorted = repository
        .genres
        .find(&FindQuery::all().sort_by(GenreSort::Name))
        .await
        .unwrap();
    let ours: Vec<_> = sorted
        .iter()
        .filter(|g| g.name.ends_with(&marker))
        .map(|g| &g.name[..1])
        .collect();
    assert_eq!(ours, vec!["A", "a", "b"]);
}

#[tokio::test]
#[ignore]
async fn test_missing_records() {
    let repository = repository().await;
    let id = Uuid::new_v4();

    assert!(repository.authors.find_by_id(id, &[]).await.unwrap().is_none());
    assert!(repository.books.find_by_id(id, &[]).await.unwrap().is_none());

    let genre = Genre { id, name: "Nowhere".to_string() };
    assert!(repository.genres.update(id, &genre).await.unwrap().is_none());
    assert!(repository.genres.delete(id).await.unwrap().is_none());

    let book = Book { id, ..Book::new("Ghost", Uuid::new_v4(), "s", "i", vec![]) };
    assert!(repository.books.update(id, &book).await.unwrap().is_none());
    assert!(repository.books.delete(id).await.unwrap().is_none());

    let copy = BookInstance { id, ..BookInstance::new(Uuid::new_v4(), "x", BookStatus::Maintenance, None) };
    assert!(repository.book_instances.update(id, &copy).await.unwrap().is_none());
    assert!(repository.book_instances.delete(id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_deleting_a_book_drops_its_genre_links() {
    let repository = repository().await;
    let genre = unique_genre("Western");
    repository.genres.create(&genre).await.unwrap();
    let book = Book::new("True Grit", Uuid::new_v4(), "Revenge", "4", vec![Ref::Id(genre.id)]);
    repository.books.create(&book).await.unwrap();

    let deleted = repository.books.delete(book.id).await.unwrap().unwrap();
    assert_eq!(deleted.genre_ids(), vec![genre.id]);

    let by_genre = BookFilter {
        genre: Some(genre.id),
        ..Default::default()
    };
    assert_eq!(repository.books.count(&by_genre).await.unwrap(), 0);
}

#[tokio::test]
#[ignore]
async fn test_genre_delete_guard() {
    let repository = repository().await;
    let services = Services::new(repository.clone());

    let genre = created(
        services
            .genres
            .create(&FormInput::new().with("name", format!("Noir {}", Uuid::new_v4())))
            .await
            .unwrap(),
    );
    let book = created(
        services
            .books
            .create(&book_input("The Big Sleep", Uuid::new_v4(), &[genre.id]))
            .await
            .unwrap(),
    );

    match services.genres.delete(genre.id).await.unwrap() {
        DeleteOutcome::Blocked { dependents, .. } => {
            assert_eq!(dependents.iter().map(|b| b.id).collect::<Vec<_>>(), vec![book.id]);
        }
        other => panic!("expected blocked delete, got {:?}", other),
    }

    assert!(services.books.delete(book.id).await.unwrap().is_deleted());
    assert!(services.genres.delete(genre.id).await.unwrap().is_deleted());
}
