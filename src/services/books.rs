//! Book catalog and availability service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookMutation, NewBook, UpdateBook},
    repository::BookStore,
};

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn BookStore>,
}

impl BooksService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.store.find_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Create a book with all copies available
    pub async fn create(&self, data: NewBook) -> AppResult<Book> {
        data.validate()?;
        let book = self.store.save(Book::from_new(data)).await?;
        tracing::info!(
            "Created book {:?} '{}' with {} copies",
            book.id,
            book.title,
            book.quantity
        );
        Ok(book)
    }

    /// Replace title, author, isbn and quantity; availability follows the
    /// quantity change and is clamped into `[0, quantity]`.
    pub async fn update(&self, id: i64, data: UpdateBook) -> AppResult<Book> {
        data.validate()?;
        self.store.modify(id, BookMutation::ReplaceFields(data)).await
    }

    /// Apply a loan or return delta to the available copies.
    ///
    /// Fails with `InvalidAdjustment` instead of clamping, so a loan caller
    /// can treat the failure as "no copy available".
    pub async fn adjust_available(&self, id: i64, change: i32) -> AppResult<Book> {
        let book = self
            .store
            .modify(id, BookMutation::AdjustAvailable(change))
            .await?;
        tracing::debug!(
            "Book {} availability {:+} -> {}/{}",
            id,
            change,
            book.available_quantity,
            book.quantity
        );
        Ok(book)
    }

    /// Delete a book. Deleting an unknown id succeeds.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.store.delete_by_id(id).await?;
        tracing::info!("Deleted book {}", id);
        Ok(())
    }
}
