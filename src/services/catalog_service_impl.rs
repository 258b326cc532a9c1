//! `SeaORM` implementation of the `CatalogService` trait.
//!
//! Uniqueness and delete restrictions are left to the database; write errors
//! are classified with [`constraint_violation`] after the fact.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::db::{ConstraintKind, Store, constraint_violation};
use crate::domain::{EntityKind, FieldErrors, InstanceFilter, RecordId};
use crate::entities::{book, book_instance};
use crate::entities::book_instance::LoanStatus;
use crate::models::catalog::{AuthorInput, BookInput, BookInstanceInput, NameInput};
use crate::services::catalog_service::{
    AuthorDetailDto, AuthorDto, BookDetailDto, BookInstanceDto, BookSummaryDto, CatalogError,
    CatalogRecord, CatalogService, GenreDto, IndexCounts, LanguageDto, display_genre,
};

const NAME_MAX: usize = 200;
const PERSON_NAME_MAX: usize = 100;
const SUMMARY_MAX: usize = 1000;
const ISBN_MAX: usize = 13;

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

pub struct SeaOrmCatalogService {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }

    async fn genre_preview_count(&self) -> usize {
        self.config.read().await.catalog.genre_preview_count
    }

    async fn book_summaries(&self, books: Vec<book::Model>) -> Result<Vec<BookSummaryDto>, CatalogError> {
        let preview = self.genre_preview_count().await;

        let book_ids: Vec<i32> = books.iter().map(|b| b.id).collect();
        let author_ids: Vec<i32> = books
            .iter()
            .filter_map(|b| b.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let genres = self.store.books().genres_for_many(&book_ids).await?;
        let authors: HashMap<i32, String> = self
            .store
            .authors()
            .get_many(&author_ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a.display_name()))
            .collect();

        Ok(books
            .into_iter()
            .map(|b| BookSummaryDto {
                display_genre: genres
                    .get(&b.id)
                    .map(|g| display_genre(g, preview))
                    .unwrap_or_default(),
                author_name: b.author_id.and_then(|id| authors.get(&id).cloned()),
                id: b.id,
                title: b.title,
                isbn: b.isbn,
                author_id: b.author_id,
                cover: b.cover,
            })
            .collect())
    }

    async fn instance_dtos(
        &self,
        instances: Vec<book_instance::Model>,
    ) -> Result<Vec<BookInstanceDto>, CatalogError> {
        let today = chrono::Local::now().date_naive();
        let book_ids: Vec<i32> = instances
            .iter()
            .filter_map(|i| i.book_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let titles: HashMap<i32, String> = self
            .store
            .books()
            .get_many(&book_ids)
            .await?
            .into_iter()
            .map(|b| (b.id, b.title))
            .collect();

        Ok(instances
            .into_iter()
            .map(|i| {
                let title = i.book_id.and_then(|id| titles.get(&id).cloned());
                BookInstanceDto::from_model(i, title, today)
            })
            .collect())
    }

    async fn instance_dto(&self, model: book_instance::Model) -> Result<BookInstanceDto, CatalogError> {
        let mut dtos = self.instance_dtos(vec![model.clone()]).await?;
        Ok(dtos
            .pop()
            .unwrap_or_else(|| BookInstanceDto::from_model(model, None, chrono::Local::now().date_naive())))
    }

    async fn author_detail(&self, id: i32) -> Result<AuthorDetailDto, CatalogError> {
        let author = self
            .store
            .authors()
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(EntityKind::Author, id))?;

        let books = self.store.books().list_by_author(id).await?;
        let books = self.book_summaries(books).await?;

        Ok(AuthorDetailDto {
            author: AuthorDto::from(author),
            books,
        })
    }

    async fn book_detail(&self, id: i32) -> Result<BookDetailDto, CatalogError> {
        let book = self
            .store
            .books()
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(EntityKind::Book, id))?;

        let author = match book.author_id {
            Some(author_id) => self.store.authors().get(author_id).await?.map(AuthorDto::from),
            None => None,
        };
        let language = match book.language_id {
            Some(language_id) => self
                .store
                .languages()
                .get(language_id)
                .await?
                .map(LanguageDto::from),
            None => None,
        };

        let genres = self.store.books().genres_for(id).await?;
        let preview = self.genre_preview_count().await;
        let instances = self.store.book_instances().list_for_book(id).await?;
        let instances = self.instance_dtos(instances).await?;

        Ok(BookDetailDto {
            display_genre: display_genre(&genres, preview),
            genres: genres.into_iter().map(GenreDto::from).collect(),
            id: book.id,
            title: book.title,
            summary: book.summary,
            isbn: book.isbn,
            cover: book.cover,
            author,
            language,
            instances,
        })
    }

    /// Checks a book form and returns it with its text fields trimmed.
    async fn validate_book(&self, input: &BookInput) -> Result<BookInput, CatalogError> {
        let input = input.trimmed();
        let mut errors = FieldErrors::new();
        check_text("title", &input.title, NAME_MAX, true, &mut errors);
        check_text("summary", &input.summary, SUMMARY_MAX, true, &mut errors);
        check_text("isbn", &input.isbn, ISBN_MAX, true, &mut errors);
        if let Some(cover) = &input.cover {
            check_text("cover", cover, NAME_MAX, false, &mut errors);
        }

        if let Some(author_id) = input.author_id
            && self.store.authors().get(author_id).await?.is_none()
        {
            errors.add("author_id", INVALID_CHOICE);
        }

        if let Some(language_id) = input.language_id
            && self.store.languages().get(language_id).await?.is_none()
        {
            errors.add("language_id", INVALID_CHOICE);
        }

        let wanted: HashSet<i32> = input.genre_ids.iter().copied().collect();
        if !wanted.is_empty() {
            let ids: Vec<i32> = wanted.iter().copied().collect();
            let found: HashSet<i32> = self
                .store
                .genres()
                .get_many(&ids)
                .await?
                .into_iter()
                .map(|g| g.id)
                .collect();
            let mut missing: Vec<i32> = wanted.difference(&found).copied().collect();
            missing.sort_unstable();
            for id in missing {
                errors.add(
                    "genre_ids",
                    format!("Select a valid choice. {id} is not one of the available choices."),
                );
            }
        }

        errors.into_result()?;
        Ok(input)
    }

    async fn validate_instance(
        &self,
        input: &BookInstanceInput,
    ) -> Result<BookInstanceInput, CatalogError> {
        let input = input.trimmed();
        let mut errors = FieldErrors::new();
        check_text("imprint", &input.imprint, NAME_MAX, true, &mut errors);

        if let Some(book_id) = input.book_id
            && self.store.books().get(book_id).await?.is_none()
        {
            errors.add("book_id", INVALID_CHOICE);
        }

        if let Some(borrower_id) = input.borrower_id
            && self.store.get_user_by_id(borrower_id).await?.is_none()
        {
            errors.add("borrower_id", INVALID_CHOICE);
        }

        errors.into_result()?;
        Ok(input)
    }
}

/// Records length and presence problems for an already trimmed text field.
fn check_text(field: &str, value: &str, max: usize, required: bool, errors: &mut FieldErrors) {
    if required && value.is_empty() {
        errors.add(field, REQUIRED);
        return;
    }

    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

fn validate_name(input: &NameInput) -> Result<String, CatalogError> {
    let name = input.name.trim();
    let mut errors = FieldErrors::new();
    check_text("name", name, NAME_MAX, true, &mut errors);
    errors.into_result()?;
    Ok(name.to_string())
}

fn validate_author(input: &AuthorInput) -> Result<AuthorInput, CatalogError> {
    let input = input.trimmed();
    let mut errors = FieldErrors::new();
    check_text("first_name", &input.first_name, PERSON_NAME_MAX, true, &mut errors);
    check_text("last_name", &input.last_name, PERSON_NAME_MAX, true, &mut errors);

    if let (Some(born), Some(died)) = (input.date_of_birth, input.date_of_death)
        && died < born
    {
        errors.add("date_of_death", "Date of death cannot be before date of birth.");
    }

    errors.into_result()?;
    Ok(input)
}

/// Maps a failed insert or update. `unique` names the field and message to
/// report when a unique rule fired.
fn classify_write(err: anyhow::Error, unique: (&str, &str)) -> CatalogError {
    match constraint_violation(&err) {
        Some(ConstraintKind::Unique) => CatalogError::ConstraintViolation {
            field: unique.0.to_string(),
            message: unique.1.to_string(),
        },
        Some(ConstraintKind::ForeignKey) => {
            CatalogError::Validation(FieldErrors::single("__all__", INVALID_CHOICE))
        }
        None => CatalogError::Database(format!("{err:#}")),
    }
}

/// Maps a failed delete; a foreign key failure means dependents still exist.
fn classify_delete(err: anyhow::Error, kind: EntityKind, id: impl ToString, dependents: &str) -> CatalogError {
    match constraint_violation(&err) {
        Some(ConstraintKind::ForeignKey) => {
            let id = id.to_string();
            warn!(kind = %kind, %id, "Delete blocked by dependent rows");
            CatalogError::ReferentialIntegrity(format!(
                "Cannot delete {} {id} because {dependents} still reference it",
                kind.label().to_lowercase()
            ))
        }
        _ => CatalogError::Database(format!("{err:#}")),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn index_counts(&self) -> Result<IndexCounts, CatalogError> {
        Ok(IndexCounts {
            num_books: self.count_all(EntityKind::Book).await?,
            num_instances: self.count_all(EntityKind::BookInstance).await?,
            num_instances_available: self.count_available_instances().await?,
            num_authors: self.count_all(EntityKind::Author).await?,
        })
    }

    async fn count_all(&self, kind: EntityKind) -> Result<u64, CatalogError> {
        let count = match kind {
            EntityKind::Book => self.store.books().count().await?,
            EntityKind::Author => self.store.authors().count().await?,
            EntityKind::Genre => self.store.genres().count().await?,
            EntityKind::Language => self.store.languages().count().await?,
            EntityKind::BookInstance => self.store.book_instances().count().await?,
        };
        Ok(count)
    }

    async fn count_available_instances(&self) -> Result<u64, CatalogError> {
        Ok(self
            .store
            .book_instances()
            .count_with_status(LoanStatus::Available)
            .await?)
    }

    async fn list_all(&self, kind: EntityKind) -> Result<Vec<CatalogRecord>, CatalogError> {
        let records = match kind {
            EntityKind::Genre => self
                .store
                .genres()
                .list()
                .await?
                .into_iter()
                .map(|g| CatalogRecord::Genre(g.into()))
                .collect(),
            EntityKind::Language => self
                .store
                .languages()
                .list()
                .await?
                .into_iter()
                .map(|l| CatalogRecord::Language(l.into()))
                .collect(),
            EntityKind::Author => self
                .store
                .authors()
                .list()
                .await?
                .into_iter()
                .map(|a| CatalogRecord::Author(a.into()))
                .collect(),
            EntityKind::Book => {
                let books = self.store.books().list().await?;
                self.book_summaries(books)
                    .await?
                    .into_iter()
                    .map(CatalogRecord::Book)
                    .collect()
            }
            EntityKind::BookInstance => {
                let instances = self.store.book_instances().list().await?;
                self.instance_dtos(instances)
                    .await?
                    .into_iter()
                    .map(CatalogRecord::BookInstance)
                    .collect()
            }
        };
        Ok(records)
    }

    async fn get_by_id(&self, kind: EntityKind, id: &str) -> Result<CatalogRecord, CatalogError> {
        let not_found = || CatalogError::not_found(kind, id);
        let record_id = kind.parse_id(id).ok_or_else(not_found)?;

        match (kind, record_id) {
            (EntityKind::Genre, RecordId::Int(id)) => {
                let genre = self.store.genres().get(id).await?.ok_or_else(not_found)?;
                Ok(CatalogRecord::Genre(genre.into()))
            }
            (EntityKind::Language, RecordId::Int(id)) => {
                let language = self.store.languages().get(id).await?.ok_or_else(not_found)?;
                Ok(CatalogRecord::Language(language.into()))
            }
            (EntityKind::Author, RecordId::Int(id)) => {
                Ok(CatalogRecord::AuthorDetail(self.author_detail(id).await?))
            }
            (EntityKind::Book, RecordId::Int(id)) => {
                Ok(CatalogRecord::BookDetail(self.book_detail(id).await?))
            }
            (EntityKind::BookInstance, RecordId::Uuid(id)) => {
                let instance = self
                    .store
                    .book_instances()
                    .get(id)
                    .await?
                    .ok_or_else(not_found)?;
                Ok(CatalogRecord::BookInstance(self.instance_dto(instance).await?))
            }
            _ => Err(not_found()),
        }
    }

    async fn list_instances(
        &self,
        filter: &InstanceFilter,
    ) -> Result<Vec<BookInstanceDto>, CatalogError> {
        let instances = self
            .store
            .book_instances()
            .list_filtered(filter, today())
            .await?;
        self.instance_dtos(instances).await
    }

    async fn create_genre(&self, input: &NameInput) -> Result<GenreDto, CatalogError> {
        let name = validate_name(input)?;
        let genre = self
            .store
            .genres()
            .create(&name)
            .await
            .map_err(|e| classify_write(e, ("name", "Genre already exists (case insensitive match)")))?;

        info!(id = genre.id, name = %genre.name, "Created genre");
        Ok(genre.into())
    }

    async fn rename_genre(&self, id: i32, input: &NameInput) -> Result<GenreDto, CatalogError> {
        let name = validate_name(input)?;
        self.store
            .genres()
            .rename(id, &name)
            .await
            .map_err(|e| classify_write(e, ("name", "Genre already exists (case insensitive match)")))?
            .map(GenreDto::from)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Genre, id))
    }

    async fn delete_genre(&self, id: i32) -> Result<(), CatalogError> {
        let deleted = self
            .store
            .genres()
            .delete(id)
            .await
            .map_err(|e| classify_delete(e, EntityKind::Genre, id, "books"))?;

        if !deleted {
            return Err(CatalogError::not_found(EntityKind::Genre, id));
        }
        info!(id, "Deleted genre");
        Ok(())
    }

    async fn create_language(&self, input: &NameInput) -> Result<LanguageDto, CatalogError> {
        let name = validate_name(input)?;
        let language = self
            .store
            .languages()
            .create(&name)
            .await
            .map_err(|e| {
                classify_write(e, ("name", "Language already exists (case insensitive match)"))
            })?;

        info!(id = language.id, name = %language.name, "Created language");
        Ok(language.into())
    }

    async fn rename_language(
        &self,
        id: i32,
        input: &NameInput,
    ) -> Result<LanguageDto, CatalogError> {
        let name = validate_name(input)?;
        self.store
            .languages()
            .rename(id, &name)
            .await
            .map_err(|e| {
                classify_write(e, ("name", "Language already exists (case insensitive match)"))
            })?
            .map(LanguageDto::from)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Language, id))
    }

    async fn delete_language(&self, id: i32) -> Result<(), CatalogError> {
        let deleted = self
            .store
            .languages()
            .delete(id)
            .await
            .map_err(|e| classify_delete(e, EntityKind::Language, id, "books"))?;

        if !deleted {
            return Err(CatalogError::not_found(EntityKind::Language, id));
        }
        info!(id, "Deleted language");
        Ok(())
    }

    async fn create_author(&self, input: &AuthorInput) -> Result<AuthorDto, CatalogError> {
        let input = validate_author(input)?;
        let author = self
            .store
            .authors()
            .create(&input)
            .await
            .map_err(|e| classify_write(e, ("__all__", "Author already exists")))?;

        info!(id = author.id, "Created author");
        Ok(author.into())
    }

    async fn update_author(&self, id: i32, input: &AuthorInput) -> Result<AuthorDto, CatalogError> {
        let input = validate_author(input)?;
        self.store
            .authors()
            .update(id, &input)
            .await
            .map_err(|e| classify_write(e, ("__all__", "Author already exists")))?
            .map(AuthorDto::from)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Author, id))
    }

    async fn delete_author(&self, id: i32) -> Result<(), CatalogError> {
        let deleted = self
            .store
            .authors()
            .delete(id)
            .await
            .map_err(|e| classify_delete(e, EntityKind::Author, id, "books"))?;

        if !deleted {
            return Err(CatalogError::not_found(EntityKind::Author, id));
        }
        info!(id, "Deleted author");
        Ok(())
    }

    async fn create_book(&self, input: &BookInput) -> Result<BookDetailDto, CatalogError> {
        let input = self.validate_book(input).await?;
        let book = self
            .store
            .books()
            .create(&input)
            .await
            .map_err(|e| classify_write(e, ("isbn", "Book with this ISBN already exists.")))?;

        info!(id = book.id, isbn = %book.isbn, "Created book");
        self.book_detail(book.id).await
    }

    async fn update_book(&self, id: i32, input: &BookInput) -> Result<BookDetailDto, CatalogError> {
        let input = self.validate_book(input).await?;
        let updated = self
            .store
            .books()
            .update(id, &input)
            .await
            .map_err(|e| classify_write(e, ("isbn", "Book with this ISBN already exists.")))?;

        if updated.is_none() {
            return Err(CatalogError::not_found(EntityKind::Book, id));
        }
        self.book_detail(id).await
    }

    async fn delete_book(&self, id: i32) -> Result<(), CatalogError> {
        let deleted = self
            .store
            .books()
            .delete(id)
            .await
            .map_err(|e| classify_delete(e, EntityKind::Book, id, "book instances"))?;

        if !deleted {
            return Err(CatalogError::not_found(EntityKind::Book, id));
        }
        info!(id, "Deleted book");
        Ok(())
    }

    async fn create_instance(
        &self,
        input: &BookInstanceInput,
    ) -> Result<BookInstanceDto, CatalogError> {
        let input = self.validate_instance(input).await?;
        let instance = self
            .store
            .book_instances()
            .create(&input)
            .await
            .map_err(|e| classify_write(e, ("id", "Book instance with this Id already exists.")))?;

        info!(id = %instance.id, status = instance.status.code(), "Created book instance");
        self.instance_dto(instance).await
    }

    async fn update_instance(
        &self,
        id: Uuid,
        input: &BookInstanceInput,
    ) -> Result<BookInstanceDto, CatalogError> {
        let input = self.validate_instance(input).await?;
        let instance = self
            .store
            .book_instances()
            .update(id, &input)
            .await
            .map_err(|e| classify_write(e, ("id", "Book instance with this Id already exists.")))?
            .ok_or_else(|| CatalogError::not_found(EntityKind::BookInstance, id))?;

        self.instance_dto(instance).await
    }

    async fn delete_instance(&self, id: Uuid) -> Result<(), CatalogError> {
        let deleted = self
            .store
            .book_instances()
            .delete(id)
            .await
            .map_err(|e| classify_delete(e, EntityKind::BookInstance, id, "rows"))?;

        if !deleted {
            return Err(CatalogError::not_found(EntityKind::BookInstance, id));
        }
        info!(%id, "Deleted book instance");
        Ok(())
    }
}
