//! Write-side inputs for the catalog entities.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::book_instance::LoanStatus;

#[derive(Debug, Clone, Deserialize)]
pub struct NameInput {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub summary: String,
    pub isbn: String,
    #[serde(default)]
    pub author_id: Option<i32>,
    #[serde(default)]
    pub language_id: Option<i32>,
    /// Replaces the whole genre set of the book.
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookInstanceInput {
    /// Generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub book_id: Option<i32>,
    pub imprint: String,
    #[serde(default)]
    pub due_back: Option<NaiveDate>,
    #[serde(default)]
    pub status: LoanStatus,
    #[serde(default)]
    pub borrower_id: Option<i32>,
}

impl AuthorInput {
    /// Copy with surrounding whitespace stripped from the names.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            ..self.clone()
        }
    }
}

impl BookInput {
    /// Copy with every text field stripped; a blank cover becomes `None`.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            summary: self.summary.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            cover: self
                .cover
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            ..self.clone()
        }
    }
}

impl BookInstanceInput {
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            imprint: self.imprint.trim().to_string(),
            ..self.clone()
        }
    }
}
