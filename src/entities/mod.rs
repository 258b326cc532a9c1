pub mod prelude;

pub mod author;
pub mod book;
pub mod book_genre;
pub mod book_instance;
pub mod genre;
pub mod language;
pub mod users;
