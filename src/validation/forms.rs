//! Field rules for each catalog form

use uuid::Uuid;

use super::{FormInput, FormValidator, Validated};
use crate::models::{Author, Book, BookInstance, BookStatus, Genre, Ref};

/// Keep the identifier of the record being updated
fn with_id(new_id: Uuid, id: Option<Uuid>) -> Uuid {
    id.unwrap_or(new_id)
}

/// Author form. Names are required, at most 100 characters and alphanumeric.
pub fn author_form(input: &FormInput, id: Option<Uuid>) -> Validated<Author> {
    let mut v = FormValidator::new(input);

    let first_name = v
        .field("first_name")
        .trim()
        .min_length(1, "First name must be specified.")
        .max_length(100, "First name must not exceed 100 characters.")
        .escape()
        .alphanumeric("First name has non-alphanumeric characters.")
        .value();
    let family_name = v
        .field("family_name")
        .trim()
        .min_length(1, "Family name must be specified.")
        .max_length(100, "Family name must not exceed 100 characters.")
        .escape()
        .alphanumeric("Family name has non-alphanumeric characters.")
        .value();
    let date_of_birth = v.field("date_of_birth").date("Invalid date of birth");
    let date_of_death = v.field("date_of_death").date("Invalid date of death");

    let mut author = Author::new(first_name, family_name, date_of_birth, date_of_death);
    author.id = with_id(author.id, id);
    v.finish(author)
}

pub fn genre_form(input: &FormInput, id: Option<Uuid>) -> Validated<Genre> {
    let mut v = FormValidator::new(input);

    let name = v
        .field("name")
        .trim()
        .min_length(3, "Genre name must contain at least 3 characters")
        .max_length(100, "Genre name must not exceed 100 characters")
        .escape()
        .value();

    let mut genre = Genre::new(name);
    genre.id = with_id(genre.id, id);
    v.finish(genre)
}

/// Book form. The author reference must be an identifier but is not looked up.
pub fn book_form(input: &FormInput, id: Option<Uuid>) -> Validated<Book> {
    let mut v = FormValidator::new(input);

    let title = v
        .field("title")
        .trim()
        .min_length(1, "Title must not be empty.")
        .escape()
        .value();
    let author = v
        .field("author")
        .trim()
        .min_length(1, "Author must not be empty.")
        .escape()
        .identifier("Author must be a valid identifier.");
    let summary = v
        .field("summary")
        .trim()
        .min_length(1, "Summary must not be empty.")
        .escape()
        .value();
    let isbn = v
        .field("isbn")
        .trim()
        .min_length(1, "ISBN must not be empty")
        .escape()
        .value();
    let genre = v
        .list("genre")
        .trim()
        .escape()
        .identifiers("Invalid genre reference.");

    let mut book = Book::new(
        title,
        author.unwrap_or_else(Uuid::nil),
        summary,
        isbn,
        genre.into_iter().map(Ref::Id).collect(),
    );
    book.id = with_id(book.id, id);
    v.finish(book)
}

pub fn book_instance_form(input: &FormInput, id: Option<Uuid>) -> Validated<BookInstance> {
    let mut v = FormValidator::new(input);

    let book = v
        .field("book")
        .trim()
        .min_length(1, "Book must be specified")
        .escape()
        .identifier("Book must be a valid identifier.");
    let imprint = v
        .field("imprint")
        .trim()
        .min_length(1, "Imprint must be specified")
        .escape()
        .value();
    let status: BookStatus = v
        .field("status")
        .trim()
        .escape()
        .parse_or_default("Invalid status");
    let due_back = v.field("due_back").date("Invalid date");

    let mut copy = BookInstance::new(book.unwrap_or_else(Uuid::nil), imprint, status, due_back);
    copy.id = with_id(copy.id, id);
    v.finish(copy)
}
