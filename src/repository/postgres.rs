//! PostgreSQL book store

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::BookStore;
use crate::{error::AppResult, models::book::Book};

#[derive(Clone)]
pub struct PgBookStore {
    pool: Pool<Postgres>,
}

impl PgBookStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn save(&self, book: Book) -> AppResult<Book> {
        let row = match book.id {
            None => {
                sqlx::query_as::<_, Book>(
                    r#"
                    INSERT INTO books (title, author, isbn, quantity, available_quantity)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING *
                    "#,
                )
                .bind(&book.title)
                .bind(&book.author)
                .bind(&book.isbn)
                .bind(book.quantity)
                .bind(book.available_quantity)
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => {
                // A row deleted between read and write is recreated under the same id
                sqlx::query_as::<_, Book>(
                    r#"
                    INSERT INTO books (id, title, author, isbn, quantity, available_quantity)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT (id) DO UPDATE SET
                        title = EXCLUDED.title,
                        author = EXCLUDED.author,
                        isbn = EXCLUDED.isbn,
                        quantity = EXCLUDED.quantity,
                        available_quantity = EXCLUDED.available_quantity
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(&book.title)
                .bind(&book.author)
                .bind(&book.isbn)
                .bind(book.quantity)
                .bind(book.available_quantity)
                .fetch_one(&self.pool)
                .await?
            }
        };
        Ok(row)
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::debug!("Deleted {} row(s) for book {}", result.rows_affected(), id);
        Ok(())
    }
}
