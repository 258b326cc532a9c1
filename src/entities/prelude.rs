pub use super::author::Entity as Author;
pub use super::book::Entity as Book;
pub use super::book_genre::Entity as BookGenre;
pub use super::book_instance::Entity as BookInstance;
pub use super::genre::Entity as Genre;
pub use super::language::Entity as Language;
pub use super::users::Entity as Users;
