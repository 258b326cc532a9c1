use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{author, prelude::*};
use crate::models::catalog::AuthorInput;

pub struct AuthorRepository {
    conn: DatabaseConnection,
}

impl AuthorRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All authors in the default ordering (last name, then first name).
    pub async fn list(&self) -> Result<Vec<author::Model>> {
        Author::find()
            .order_by_asc(author::Column::LastName)
            .order_by_asc(author::Column::FirstName)
            .all(&self.conn)
            .await
            .context("Failed to list authors")
    }

    pub async fn get(&self, id: i32) -> Result<Option<author::Model>> {
        Author::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query author by ID")
    }

    pub async fn get_many(&self, ids: &[i32]) -> Result<Vec<author::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Author::find()
            .filter(author::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query authors by ID")
    }

    pub async fn create(&self, input: &AuthorInput) -> Result<author::Model> {
        let active = author::ActiveModel {
            first_name: Set(input.first_name.clone()),
            last_name: Set(input.last_name.clone()),
            date_of_birth: Set(input.date_of_birth),
            date_of_death: Set(input.date_of_death),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert author")
    }

    pub async fn update(&self, id: i32, input: &AuthorInput) -> Result<Option<author::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: author::ActiveModel = existing.into();
        active.first_name = Set(input.first_name.clone());
        active.last_name = Set(input.last_name.clone());
        active.date_of_birth = Set(input.date_of_birth);
        active.date_of_death = Set(input.date_of_death);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update author")?;

        Ok(Some(updated))
    }

    /// Deletes an author. Blocked by the `book.author_id` restrict rule while
    /// any book still references the author.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Author::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete author")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Author::find()
            .count(&self.conn)
            .await
            .context("Failed to count authors")
    }
}
