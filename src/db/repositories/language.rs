use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{language, prelude::*};

pub struct LanguageRepository {
    conn: DatabaseConnection,
}

impl LanguageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<language::Model>> {
        Language::find()
            .order_by_asc(language::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list languages")
    }

    pub async fn get(&self, id: i32) -> Result<Option<language::Model>> {
        Language::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query language by ID")
    }

    pub async fn get_many(&self, ids: &[i32]) -> Result<Vec<language::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Language::find()
            .filter(language::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(language::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query languages by ID")
    }

    /// Inserts a language. A case-insensitive duplicate is rejected by the
    /// `lower(name)` unique index and surfaces as a `DbErr`.
    pub async fn create(&self, name: &str) -> Result<language::Model> {
        let active = language::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert language")
    }

    pub async fn rename(&self, id: i32, name: &str) -> Result<Option<language::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: language::ActiveModel = existing.into();
        active.name = Set(name.to_string());
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to rename language")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Language::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete language")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Language::find()
            .count(&self.conn)
            .await
            .context("Failed to count languages")
    }
}
