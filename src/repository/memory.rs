//! In-process book store, used for local runs and tests

use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    RwLock,
};

use async_trait::async_trait;

use super::BookStore;
use crate::{
    error::{AppError, AppResult},
    models::book::Book,
};

#[derive(Default)]
pub struct MemoryBookStore {
    books: RwLock<BTreeMap<i64, Book>>,
    last_id: AtomicI64,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<T>(_: T) -> AppError {
        AppError::Internal("book store lock poisoned".to_string())
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let books = self.books.read().map_err(Self::poisoned)?;
        Ok(books.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let books = self.books.read().map_err(Self::poisoned)?;
        Ok(books.get(&id).cloned())
    }

    async fn save(&self, mut book: Book) -> AppResult<Book> {
        let id = match book.id {
            Some(id) => {
                self.last_id.fetch_max(id, Ordering::SeqCst);
                id
            }
            None => self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
        };
        book.id = Some(id);

        let mut books = self.books.write().map_err(Self::poisoned)?;
        books.insert(id, book.clone());
        Ok(book)
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let mut books = self.books.write().map_err(Self::poisoned)?;
        books.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::BookMutation;

    fn book(title: &str, quantity: i32) -> Book {
        Book {
            id: None,
            title: title.to_string(),
            author: "Anon".to_string(),
            isbn: "000".to_string(),
            quantity,
            available_quantity: quantity,
        }
    }

    #[tokio::test]
    async fn save_assigns_increasing_ids() {
        let store = MemoryBookStore::new();
        let first = store.save(book("a", 1)).await.unwrap();
        let second = store.save(book("b", 2)).await.unwrap();
        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));

        let all = store.find_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn save_with_id_overwrites() {
        let store = MemoryBookStore::new();
        let mut saved = store.save(book("a", 1)).await.unwrap();
        saved.title = "renamed".to_string();
        store.save(saved.clone()).await.unwrap();

        assert_eq!(store.find_by_id(1).await.unwrap(), Some(saved));
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn explicit_ids_are_not_reused() {
        let store = MemoryBookStore::new();
        let mut pinned = book("pinned", 1);
        pinned.id = Some(10);
        store.save(pinned).await.unwrap();

        let next = store.save(book("next", 1)).await.unwrap();
        assert_eq!(next.id, Some(11));
    }

    #[tokio::test]
    async fn delete_missing_is_ok() {
        let store = MemoryBookStore::new();
        tokio_test::assert_ok!(store.delete_by_id(42).await);
    }

    #[tokio::test]
    async fn default_modify_reports_missing_book() {
        let store = MemoryBookStore::new();
        let err = store
            .modify(7, BookMutation::AdjustAvailable(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
