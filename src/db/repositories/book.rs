use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{book, book_genre, genre, prelude::*};
use crate::models::catalog::BookInput;

pub struct BookRepository {
    conn: DatabaseConnection,
}

impl BookRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<book::Model>> {
        Book::find()
            .order_by_asc(book::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list books")
    }

    pub async fn get(&self, id: i32) -> Result<Option<book::Model>> {
        Book::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query book by ID")
    }

    pub async fn get_many(&self, ids: &[i32]) -> Result<Vec<book::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Book::find()
            .filter(book::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query books by ID")
    }

    pub async fn list_by_author(&self, author_id: i32) -> Result<Vec<book::Model>> {
        Book::find()
            .filter(book::Column::AuthorId.eq(author_id))
            .order_by_asc(book::Column::Title)
            .all(&self.conn)
            .await
            .context("Failed to list books for author")
    }

    /// Genres of one book, in insertion (id) order.
    pub async fn genres_for(&self, book_id: i32) -> Result<Vec<genre::Model>> {
        let mut by_book = self.genres_for_many(&[book_id]).await?;
        Ok(by_book.remove(&book_id).unwrap_or_default())
    }

    /// Genres for a batch of books in a single query.
    pub async fn genres_for_many(&self, book_ids: &[i32]) -> Result<HashMap<i32, Vec<genre::Model>>> {
        if book_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = BookGenre::find()
            .filter(book_genre::Column::BookId.is_in(book_ids.iter().copied()))
            .order_by_asc(book_genre::Column::GenreId)
            .find_also_related(Genre)
            .all(&self.conn)
            .await
            .context("Failed to query genres for books")?;

        let mut grouped: HashMap<i32, Vec<genre::Model>> = HashMap::new();
        for (link, genre) in rows {
            if let Some(genre) = genre {
                grouped.entry(link.book_id).or_default().push(genre);
            }
        }

        Ok(grouped)
    }

    /// Inserts the book and its genre links in one transaction.
    pub async fn create(&self, input: &BookInput) -> Result<book::Model> {
        let txn = self.conn.begin().await?;

        let active = book::ActiveModel {
            title: Set(input.title.clone()),
            summary: Set(input.summary.clone()),
            isbn: Set(input.isbn.clone()),
            author_id: Set(input.author_id),
            language_id: Set(input.language_id),
            cover: Set(input.cover.clone()),
            ..Default::default()
        };

        let created = active
            .insert(&txn)
            .await
            .context("Failed to insert book")?;

        replace_genres(&txn, created.id, &input.genre_ids).await?;
        txn.commit().await.context("Failed to commit book insert")?;

        Ok(created)
    }

    pub async fn update(&self, id: i32, input: &BookInput) -> Result<Option<book::Model>> {
        let txn = self.conn.begin().await?;

        let Some(existing) = Book::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query book for update")?
        else {
            return Ok(None);
        };

        let mut active: book::ActiveModel = existing.into();
        active.title = Set(input.title.clone());
        active.summary = Set(input.summary.clone());
        active.isbn = Set(input.isbn.clone());
        active.author_id = Set(input.author_id);
        active.language_id = Set(input.language_id);
        active.cover = Set(input.cover.clone());

        let updated = active
            .update(&txn)
            .await
            .context("Failed to update book")?;

        replace_genres(&txn, id, &input.genre_ids).await?;
        txn.commit().await.context("Failed to commit book update")?;

        Ok(Some(updated))
    }

    /// Deletes a book. Blocked by the `book_instance.book_id` restrict rule
    /// while copies reference it; genre links cascade.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Book::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete book")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Book::find()
            .count(&self.conn)
            .await
            .context("Failed to count books")
    }
}

async fn replace_genres(txn: &DatabaseTransaction, book_id: i32, genre_ids: &[i32]) -> Result<()> {
    BookGenre::delete_many()
        .filter(book_genre::Column::BookId.eq(book_id))
        .exec(txn)
        .await
        .context("Failed to clear book genres")?;

    let mut unique = genre_ids.to_vec();
    unique.sort_unstable();
    unique.dedup();

    if unique.is_empty() {
        return Ok(());
    }

    let links = unique.into_iter().map(|genre_id| book_genre::ActiveModel {
        book_id: Set(book_id),
        genre_id: Set(genre_id),
    });

    BookGenre::insert_many(links)
        .exec(txn)
        .await
        .context("Failed to link book genres")?;

    Ok(())
}
