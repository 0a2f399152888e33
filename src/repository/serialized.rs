//! Per-id serialization of read-modify-write updates

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use super::BookStore;
use crate::{
    error::AppResult,
    models::book::{Book, BookMutation},
};

/// Wraps a store so that `modify` calls on the same book id run one at a time.
///
/// Updates of different ids still proceed in parallel. Plain `save` and
/// `delete_by_id` calls bypass the lock.
pub struct SerializedBookStore<S> {
    inner: S,
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

/// A claim on one id's lock. Dropping it, even from a cancelled update,
/// removes the table entry once nobody else holds or waits on the lock.
struct Lease<'a> {
    locks: &'a DashMap<i64, Arc<Mutex<()>>>,
    id: i64,
    lock: Arc<Mutex<()>>,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        // the table and this lease are the only holders
        self.locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 2);
    }
}

impl<S: BookStore> SerializedBookStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            locks: DashMap::new(),
        }
    }

    fn lease(&self, id: i64) -> Lease<'_> {
        let lock = self.locks.entry(id).or_default().clone();
        Lease {
            locks: &self.locks,
            id,
            lock,
        }
    }
}

#[async_trait]
impl<S: BookStore> BookStore for SerializedBookStore<S> {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        self.inner.find_by_id(id).await
    }

    async fn save(&self, book: Book) -> AppResult<Book> {
        self.inner.save(book).await
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        self.inner.delete_by_id(id).await
    }

    async fn modify(&self, id: i64, mutation: BookMutation) -> AppResult<Book> {
        let lease = self.lease(id);
        let _guard = lease.lock.lock().await;
        self.inner.modify(id, mutation).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{error::AppError, repository::MemoryBookStore};

    async fn seeded(quantity: i32) -> Arc<SerializedBookStore<MemoryBookStore>> {
        let store = SerializedBookStore::new(MemoryBookStore::new());
        store
            .save(Book {
                id: None,
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                isbn: "978-0441172719".to_string(),
                quantity,
                available_quantity: quantity,
            })
            .await
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_loans_are_all_counted() {
        let store = seeded(50).await;

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.modify(1, BookMutation::AdjustAvailable(-1)).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let book = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(book.available_quantity, 0);

        let err = store
            .modify(1, BookMutation::AdjustAvailable(-1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidAdjustment(_)));
    }

    #[tokio::test]
    async fn lock_table_is_emptied_after_use() {
        let store = seeded(3).await;
        store.modify(1, BookMutation::AdjustAvailable(-1)).await.unwrap();
        assert!(store.locks.is_empty());

        // rejected updates release too
        store.modify(1, BookMutation::AdjustAvailable(5)).await.unwrap_err();
        assert!(store.locks.is_empty());
    }

    #[tokio::test]
    async fn cancelled_update_releases_its_entry() {
        let store = seeded(3).await;

        let holder = store.lease(1);
        let guard = holder.lock.lock().await;

        let waiting = tokio::time::timeout(
            Duration::from_millis(20),
            store.modify(1, BookMutation::AdjustAvailable(-1)),
        )
        .await;
        assert!(waiting.is_err());
        assert_eq!(store.locks.len(), 1);

        drop(guard);
        drop(holder);
        assert!(store.locks.is_empty());

        let book = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(book.available_quantity, 3);
    }
}
