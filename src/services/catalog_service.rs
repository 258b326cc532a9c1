//! Domain service for the catalog: list/detail views, index counts and the
//! staff-only write operations.
//!
//! Views dispatch on [`EntityKind`]; every record comes back as a
//! [`CatalogRecord`] so the HTTP and CLI layers can render any kind the same
//! way.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{EntityKind, FieldErrors, InstanceFilter};
use crate::entities::book_instance::LoanStatus;
use crate::entities::{author, book_instance, genre, language};
use crate::models::catalog::{AuthorInput, BookInput, BookInstanceInput, NameInput};

/// Domain errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{} not found: {id}", .kind.label())]
    NotFound { kind: EntityKind, id: String },

    /// A unique rule rejected the write. Nothing was stored.
    #[error("{field}: {message}")]
    ConstraintViolation { field: String, message: String },

    /// A delete was blocked by rows that still reference the record.
    #[error("{0}")]
    ReferentialIntegrity(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(String),
}

impl CatalogError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<FieldErrors> for CatalogError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Figures shown on the catalog home page.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct IndexCounts {
    pub num_books: u64,
    pub num_instances: u64,
    pub num_instances_available: u64,
    pub num_authors: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GenreDto {
    pub id: i32,
    pub name: String,
}

impl From<genre::Model> for GenreDto {
    fn from(model: genre::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LanguageDto {
    pub id: i32,
    pub name: String,
}

impl From<language::Model> for LanguageDto {
    fn from(model: language::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthorDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    /// `"Last, First"`.
    pub display_name: String,
}

impl From<author::Model> for AuthorDto {
    fn from(model: author::Model) -> Self {
        let display_name = model.display_name();
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            date_of_birth: model.date_of_birth,
            date_of_death: model.date_of_death,
            display_name,
        }
    }
}

/// Author page: the author plus the books they wrote.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorDetailDto {
    #[serde(flatten)]
    pub author: AuthorDto,
    pub books: Vec<BookSummaryDto>,
}

/// Row of the book listing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BookSummaryDto {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub author_id: Option<i32>,
    pub author_name: Option<String>,
    /// First few genre names joined with `","`.
    pub display_genre: String,
    pub cover: Option<String>,
}

/// Book page with its author, language, genres and copies.
#[derive(Debug, Clone, Serialize)]
pub struct BookDetailDto {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub cover: Option<String>,
    pub author: Option<AuthorDto>,
    pub language: Option<LanguageDto>,
    pub genres: Vec<GenreDto>,
    pub display_genre: String,
    pub instances: Vec<BookInstanceDto>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BookInstanceDto {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    /// `"{id} ({title})"`.
    pub display_name: String,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub status_label: &'static str,
    pub is_due: bool,
    pub borrower_id: Option<i32>,
}

impl BookInstanceDto {
    #[must_use]
    pub fn from_model(model: book_instance::Model, book_title: Option<String>, today: NaiveDate) -> Self {
        let is_due = model.is_due_on(today);
        let display_name = format!("{} ({})", model.id, book_title.as_deref().unwrap_or(""));
        Self {
            id: model.id,
            book_id: model.book_id,
            book_title,
            display_name,
            imprint: model.imprint,
            due_back: model.due_back,
            status: model.status,
            status_label: model.status.label(),
            is_due,
            borrower_id: model.borrower_id,
        }
    }
}

/// Any record the list and detail views can return.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CatalogRecord {
    Genre(GenreDto),
    Language(LanguageDto),
    Author(AuthorDto),
    AuthorDetail(AuthorDetailDto),
    Book(BookSummaryDto),
    BookDetail(BookDetailDto),
    BookInstance(BookInstanceDto),
}

/// Joins the first `limit` genre names with `","`.
#[must_use]
pub fn display_genre(genres: &[genre::Model], limit: usize) -> String {
    genres
        .iter()
        .take(limit)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Domain service trait for the catalog.
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Counts shown on the home page.
    async fn index_counts(&self) -> Result<IndexCounts, CatalogError>;

    async fn count_all(&self, kind: EntityKind) -> Result<u64, CatalogError>;

    /// Number of copies whose status is `Available`.
    async fn count_available_instances(&self) -> Result<u64, CatalogError>;

    /// Every record of `kind` in its default ordering.
    async fn list_all(&self, kind: EntityKind) -> Result<Vec<CatalogRecord>, CatalogError>;

    /// Detail record for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when no row matches or when `id`
    /// is not a valid key for `kind`.
    async fn get_by_id(&self, kind: EntityKind, id: &str) -> Result<CatalogRecord, CatalogError>;

    /// Copies filtered by status and due-date bucket.
    async fn list_instances(
        &self,
        filter: &InstanceFilter,
    ) -> Result<Vec<BookInstanceDto>, CatalogError>;

    async fn create_genre(&self, input: &NameInput) -> Result<GenreDto, CatalogError>;
    async fn rename_genre(&self, id: i32, input: &NameInput) -> Result<GenreDto, CatalogError>;
    async fn delete_genre(&self, id: i32) -> Result<(), CatalogError>;

    async fn create_language(&self, input: &NameInput) -> Result<LanguageDto, CatalogError>;
    async fn rename_language(&self, id: i32, input: &NameInput)
    -> Result<LanguageDto, CatalogError>;
    async fn delete_language(&self, id: i32) -> Result<(), CatalogError>;

    async fn create_author(&self, input: &AuthorInput) -> Result<AuthorDto, CatalogError>;
    async fn update_author(&self, id: i32, input: &AuthorInput)
    -> Result<AuthorDto, CatalogError>;
    /// # Errors
    ///
    /// Returns [`CatalogError::ReferentialIntegrity`] while books reference
    /// the author.
    async fn delete_author(&self, id: i32) -> Result<(), CatalogError>;

    async fn create_book(&self, input: &BookInput) -> Result<BookDetailDto, CatalogError>;
    async fn update_book(&self, id: i32, input: &BookInput)
    -> Result<BookDetailDto, CatalogError>;
    /// # Errors
    ///
    /// Returns [`CatalogError::ReferentialIntegrity`] while copies reference
    /// the book.
    async fn delete_book(&self, id: i32) -> Result<(), CatalogError>;

    async fn create_instance(
        &self,
        input: &BookInstanceInput,
    ) -> Result<BookInstanceDto, CatalogError>;
    async fn update_instance(
        &self,
        id: Uuid,
        input: &BookInstanceInput,
    ) -> Result<BookInstanceDto, CatalogError>;
    async fn delete_instance(&self, id: Uuid) -> Result<(), CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(id: i32, name: &str) -> genre::Model {
        genre::Model {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_display_genre_takes_first_three() {
        let genres = vec![
            genre(1, "Fantasy"),
            genre(2, "Horror"),
            genre(3, "Poetry"),
            genre(4, "Science Fiction"),
        ];
        assert_eq!(display_genre(&genres, 3), "Fantasy,Horror,Poetry");
        assert_eq!(display_genre(&genres[..1], 3), "Fantasy");
        assert_eq!(display_genre(&[], 3), "");
    }

    #[test]
    fn test_instance_display_name() {
        let id = Uuid::new_v4();
        let model = book_instance::Model {
            id,
            book_id: Some(1),
            imprint: "Penguin, 1999".to_string(),
            due_back: NaiveDate::from_ymd_opt(2024, 3, 1),
            status: LoanStatus::OnLoan,
            borrower_id: None,
        };
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let dto = BookInstanceDto::from_model(model, Some("Dune".to_string()), today);
        assert_eq!(dto.display_name, format!("{id} (Dune)"));
        assert_eq!(dto.status_label, "On loan");
        assert!(dto.is_due);
    }

    #[test]
    fn test_not_found_message() {
        let err = CatalogError::not_found(EntityKind::Author, 42);
        assert_eq!(err.to_string(), "Author not found: 42");
    }
}
