use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{genre, prelude::*};

pub struct GenreRepository {
    conn: DatabaseConnection,
}

impl GenreRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<genre::Model>> {
        Genre::find()
            .order_by_asc(genre::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list genres")
    }

    pub async fn get(&self, id: i32) -> Result<Option<genre::Model>> {
        Genre::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query genre by ID")
    }

    pub async fn get_many(&self, ids: &[i32]) -> Result<Vec<genre::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Genre::find()
            .filter(genre::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(genre::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query genres by ID")
    }

    /// Inserts a genre. A case-insensitive duplicate is rejected by the
    /// `lower(name)` unique index and surfaces as a `DbErr`.
    pub async fn create(&self, name: &str) -> Result<genre::Model> {
        let active = genre::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert genre")
    }

    pub async fn rename(&self, id: i32, name: &str) -> Result<Option<genre::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: genre::ActiveModel = existing.into();
        active.name = Set(name.to_string());
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to rename genre")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Genre::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete genre")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Genre::find()
            .count(&self.conn)
            .await
            .context("Failed to count genres")
    }
}
