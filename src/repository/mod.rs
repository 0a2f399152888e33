//! Book store layer

pub mod memory;
pub mod postgres;
pub mod serialized;

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookMutation},
};

pub use memory::MemoryBookStore;
pub use postgres::PgBookStore;
pub use serialized::SerializedBookStore;

/// Persistence boundary for books
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books, ordered by id
    async fn find_all(&self) -> AppResult<Vec<Book>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>>;

    /// Insert when `book.id` is `None`, otherwise overwrite the row with that id
    async fn save(&self, book: Book) -> AppResult<Book>;

    /// Removing an id that does not exist is not an error
    async fn delete_by_id(&self, id: i64) -> AppResult<()>;

    /// Read a book, apply `mutation`, write it back.
    ///
    /// The default body does no coordination: two concurrent calls on the
    /// same id may both read the same state and the later save wins.
    /// Stores that need atomic updates override this (see [`SerializedBookStore`]).
    async fn modify(&self, id: i64, mutation: BookMutation) -> AppResult<Book> {
        let mut book = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        mutation.apply(&mut book)?;
        self.save(book).await
    }
}
