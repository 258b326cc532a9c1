use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::domain::{DueBackFilter, InstanceFilter};
use crate::entities::book_instance::{self, LoanStatus};
use crate::entities::prelude::*;
use crate::models::catalog::BookInstanceInput;

pub struct BookInstanceRepository {
    conn: DatabaseConnection,
}

impl BookInstanceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All copies in the default ordering (due date, undated first).
    pub async fn list(&self) -> Result<Vec<book_instance::Model>> {
        let today = chrono::Local::now().date_naive();
        self.list_filtered(&InstanceFilter::default(), today).await
    }

    /// Copies matching `filter`; date buckets are resolved against `today`.
    pub async fn list_filtered(
        &self,
        filter: &InstanceFilter,
        today: NaiveDate,
    ) -> Result<Vec<book_instance::Model>> {
        let mut condition = Condition::all();

        if let Some(status) = filter.status {
            condition = condition.add(book_instance::Column::Status.eq(status));
        }

        match filter.due_back {
            Some(DueBackFilter::HasDate) => {
                condition = condition.add(book_instance::Column::DueBack.is_not_null());
            }
            Some(DueBackFilter::NoDate) => {
                condition = condition.add(book_instance::Column::DueBack.is_null());
            }
            Some(bucket) => {
                if let Some((start, end)) = bucket.window(today) {
                    condition = condition
                        .add(book_instance::Column::DueBack.gte(start))
                        .add(book_instance::Column::DueBack.lt(end));
                }
            }
            None => {}
        }

        BookInstance::find()
            .filter(condition)
            .order_by_asc(book_instance::Column::DueBack)
            .order_by_asc(book_instance::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list book instances")
    }

    pub async fn list_for_book(&self, book_id: i32) -> Result<Vec<book_instance::Model>> {
        BookInstance::find()
            .filter(book_instance::Column::BookId.eq(book_id))
            .order_by_asc(book_instance::Column::DueBack)
            .all(&self.conn)
            .await
            .context("Failed to list copies for book")
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<book_instance::Model>> {
        BookInstance::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query book instance by ID")
    }

    /// Inserts a copy, generating its UUID unless the input carries one.
    pub async fn create(&self, input: &BookInstanceInput) -> Result<book_instance::Model> {
        let mut active = book_instance::ActiveModel::new();
        if let Some(id) = input.id {
            active.id = Set(id);
        }
        active.book_id = Set(input.book_id);
        active.imprint = Set(input.imprint.clone());
        active.due_back = Set(input.due_back);
        active.status = Set(input.status);
        active.borrower_id = Set(input.borrower_id);

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert book instance")
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &BookInstanceInput,
    ) -> Result<Option<book_instance::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: book_instance::ActiveModel = existing.into();
        active.book_id = Set(input.book_id);
        active.imprint = Set(input.imprint.clone());
        active.due_back = Set(input.due_back);
        active.status = Set(input.status);
        active.borrower_id = Set(input.borrower_id);

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update book instance")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = BookInstance::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete book instance")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        BookInstance::find()
            .count(&self.conn)
            .await
            .context("Failed to count book instances")
    }

    pub async fn count_with_status(&self, status: LoanStatus) -> Result<u64> {
        BookInstance::find()
            .filter(book_instance::Column::Status.eq(status))
            .count(&self.conn)
            .await
            .context("Failed to count book instances by status")
    }
}
